//! # AegisGraph Core
//!
//! Core abstractions, configuration and registry for the AegisGraph
//! money-laundering detection engine.
//!
//! This crate provides:
//! - Domain and kernel metadata definitions
//! - Trait definitions for batch kernels
//! - Kernel registry
//! - Engine configuration (detection limits, runtime, logging)
//! - The shared error type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod error;
pub mod kernel;
pub mod observability;
pub mod registry;
pub mod traits;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        CycleLimits, DetectionConfig, EngineConfig, RuntimeConfig, ScoringWeights, ShellLimits,
        SmurfingLimits,
    };
    pub use crate::domain::Domain;
    pub use crate::error::{KernelError, Result};
    pub use crate::kernel::KernelMetadata;
    pub use crate::observability::{LogConfig, LogLevel};
    pub use crate::registry::{KernelRegistry, RegistryStats};
    pub use crate::traits::{BatchKernel, Kernel};
}
