//! Engine Configuration
//!
//! Unified configuration for an AegisGraph deployment:
//! - Detection budgets and scoring weights
//! - Runtime behaviour (concurrent detectors, timeouts)
//! - Logging
//!
//! # Example
//!
//! ```rust,ignore
//! use aegisgraph_core::config::EngineConfig;
//!
//! // Load from environment
//! let config = EngineConfig::from_env()?;
//!
//! // Or load from file
//! let config = EngineConfig::from_file("config/production.toml")?;
//! config.validate()?;
//! ```

mod detection;

pub use detection::{CycleLimits, DetectionConfig, ScoringWeights, ShellLimits, SmurfingLimits};

use crate::error::{KernelError, Result};
use crate::observability::{LogConfig, LogLevel};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Run the three detectors as concurrent blocking tasks.
    pub concurrent_detectors: bool,
    /// Wall-clock limit for the detection phase.
    pub detector_timeout: Option<Duration>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl RuntimeConfig {
    /// Development configuration - sequential detectors, no timeout
    pub fn development() -> Self {
        Self {
            concurrent_detectors: false,
            detector_timeout: None,
        }
    }

    /// Production configuration - concurrent detectors with a deadline
    pub fn production() -> Self {
        Self {
            concurrent_detectors: true,
            detector_timeout: Some(Duration::from_secs(30)),
        }
    }

    /// Testing configuration - deterministic sequential execution
    pub fn testing() -> Self {
        Self {
            concurrent_detectors: false,
            detector_timeout: None,
        }
    }

    /// Validate the runtime configuration
    pub fn validate(&self) -> Result<()> {
        if self.detector_timeout == Some(Duration::ZERO) {
            return Err(KernelError::config("runtime.detector_timeout must be positive"));
        }
        Ok(())
    }
}

/// Unified engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Environment name
    pub environment: String,
    /// Service name
    pub service_name: String,
    /// Logging configuration
    pub logging: LogConfig,
    /// Detector budgets and weights
    pub detection: DetectionConfig,
    /// Runtime configuration
    pub runtime: RuntimeConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            service_name: "aegisgraph".to_string(),
            logging: LogConfig::default(),
            detection: DetectionConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Create development configuration
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            runtime: RuntimeConfig::development(),
            environment: "development".to_string(),
            ..Default::default()
        }
    }

    /// Create production configuration
    pub fn production() -> Self {
        Self {
            logging: LogConfig::production(),
            runtime: RuntimeConfig::production(),
            environment: "production".to_string(),
            ..Default::default()
        }
    }

    /// Create testing configuration
    pub fn testing() -> Self {
        Self {
            logging: LogConfig::testing(),
            runtime: RuntimeConfig::testing(),
            environment: "testing".to_string(),
            ..Default::default()
        }
    }

    /// Select a preset by environment name.
    pub fn for_environment(env: &str) -> Self {
        match env {
            "production" | "prod" => Self::production(),
            "testing" | "test" => Self::testing(),
            _ => Self::development(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config =
            Self::for_environment(std::env::var("AEGIS_ENV").as_deref().unwrap_or("development"));

        if let Ok(name) = std::env::var("AEGIS_SERVICE_NAME") {
            config.service_name = name;
        }

        if let Ok(level) = std::env::var("AEGIS_LOG_LEVEL") {
            config.logging.level = level
                .parse::<LogLevel>()
                .map_err(KernelError::ConfigError)?;
        }

        if let Ok(val) = std::env::var("AEGIS_LOG_JSON") {
            config.logging.structured = val.parse().unwrap_or(config.logging.structured);
        }

        if let Ok(val) = std::env::var("AEGIS_CONCURRENT_DETECTORS") {
            config.runtime.concurrent_detectors =
                val.parse().unwrap_or(config.runtime.concurrent_detectors);
        }

        if let Ok(val) = std::env::var("AEGIS_DETECTOR_TIMEOUT_SECS") {
            let secs: u64 = val.parse().map_err(|e| {
                KernelError::config(format!("Invalid AEGIS_DETECTOR_TIMEOUT_SECS: {}", e))
            })?;
            config.runtime.detector_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| KernelError::ConfigError(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| KernelError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Render configuration as TOML text
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| KernelError::ConfigError(format!("Failed to serialize config: {}", e)))
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = self.to_toml()?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| KernelError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.detection.validate()?;
        self.runtime.validate()?;

        if self.environment == "production" && !self.runtime.concurrent_detectors {
            tracing::warn!("Production environment running detectors sequentially");
        }

        Ok(())
    }

    /// Set runtime configuration
    pub fn with_runtime(mut self, runtime: RuntimeConfig) -> Self {
        self.runtime = runtime;
        self
    }
}
