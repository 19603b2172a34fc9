//! Kernel metadata.
//!
//! Every pipeline stage (graph build, each detector, scoring) is described by
//! a [`KernelMetadata`] record used for registration and discovery.

use crate::domain::Domain;
use serde::{Deserialize, Serialize};

/// Kernel metadata.
///
/// Contains identification and performance expectations for a kernel.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KernelMetadata {
    /// Unique kernel identifier (e.g., "graph/cycle-detection").
    pub id: String,

    /// Analytical domain.
    pub domain: Domain,

    /// Human-readable description.
    pub description: String,

    /// Expected throughput in operations per second.
    pub expected_throughput: u64,

    /// Target latency in microseconds.
    pub target_latency_us: f64,

    /// Version of the kernel implementation.
    pub version: u32,
}

impl KernelMetadata {
    /// Create metadata for a batch kernel.
    #[must_use]
    pub fn batch(id: impl Into<String>, domain: Domain) -> Self {
        Self {
            id: id.into(),
            domain,
            description: String::new(),
            expected_throughput: 10_000,
            target_latency_us: 50.0,
            version: 1,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the expected throughput.
    #[must_use]
    pub fn with_throughput(mut self, ops_per_sec: u64) -> Self {
        self.expected_throughput = ops_per_sec;
        self
    }

    /// Set the target latency.
    #[must_use]
    pub fn with_latency_us(mut self, latency_us: f64) -> Self {
        self.target_latency_us = latency_us;
        self
    }

    /// Returns the kernel name without its domain prefix.
    ///
    /// `"graph/cycle-detection"` becomes `"cycle-detection"`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.id.rsplit('/').next().unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_metadata_batch() {
        let meta = KernelMetadata::batch("graph/cycle-detection", Domain::GraphAnalytics)
            .with_description("Bounded DFS cycle search")
            .with_throughput(100_000)
            .with_latency_us(10.0);

        assert_eq!(meta.id, "graph/cycle-detection");
        assert_eq!(meta.domain, Domain::GraphAnalytics);
        assert_eq!(meta.expected_throughput, 100_000);
        assert_eq!(meta.version, 1);
    }

    #[test]
    fn test_name() {
        let meta = KernelMetadata::batch("compliance/smurfing", Domain::Compliance);
        assert_eq!(meta.name(), "smurfing");

        let meta = KernelMetadata::batch("standalone", Domain::Compliance);
        assert_eq!(meta.name(), "standalone");
    }
}
