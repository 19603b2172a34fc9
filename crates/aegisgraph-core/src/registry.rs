//! Kernel registry.
//!
//! The registry keeps the metadata of every pipeline kernel so that the CLI
//! and embedding services can discover what the engine runs.

use crate::domain::Domain;
use crate::error::{KernelError, Result};
use crate::kernel::KernelMetadata;
use crate::traits::Kernel;
use hashbrown::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// Registry statistics.
#[derive(Debug, Clone, Default)]
pub struct RegistryStats {
    /// Total number of registered kernels.
    pub total: usize,
    /// Kernels by domain.
    pub by_domain: HashMap<Domain, usize>,
}

/// Central registry for kernel metadata.
#[derive(Debug, Default)]
pub struct KernelRegistry {
    kernels: RwLock<HashMap<String, KernelMetadata>>,
}

impl KernelRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register kernel metadata.
    pub fn register_metadata(&self, metadata: KernelMetadata) -> Result<()> {
        let mut kernels = self.kernels.write().unwrap_or_else(|e| e.into_inner());

        if kernels.contains_key(&metadata.id) {
            return Err(KernelError::KernelAlreadyRegistered(metadata.id));
        }

        debug!(kernel_id = %metadata.id, domain = %metadata.domain, "Registering kernel");
        kernels.insert(metadata.id.clone(), metadata);
        Ok(())
    }

    /// Register a kernel built by `factory`.
    pub fn register_from<K, F>(&self, factory: F) -> Result<()>
    where
        K: Kernel,
        F: FnOnce() -> K,
    {
        self.register_metadata(factory().metadata().clone())
    }

    /// Get kernel metadata by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<KernelMetadata> {
        let kernels = self.kernels.read().unwrap_or_else(|e| e.into_inner());
        kernels.get(id).cloned()
    }

    /// Get kernel metadata by ID, failing if it is unknown.
    pub fn require(&self, id: &str) -> Result<KernelMetadata> {
        self.get(id).ok_or_else(|| KernelError::not_found(id))
    }

    /// All registered kernels, sorted by ID.
    #[must_use]
    pub fn all(&self) -> Vec<KernelMetadata> {
        let kernels = self.kernels.read().unwrap_or_else(|e| e.into_inner());
        let mut all: Vec<KernelMetadata> = kernels.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Kernels belonging to a domain, sorted by ID.
    #[must_use]
    pub fn by_domain(&self, domain: Domain) -> Vec<KernelMetadata> {
        self.all()
            .into_iter()
            .filter(|m| m.domain == domain)
            .collect()
    }

    /// Total number of registered kernels.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.kernels.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Registry statistics.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        let kernels = self.kernels.read().unwrap_or_else(|e| e.into_inner());
        let mut stats = RegistryStats {
            total: kernels.len(),
            ..Default::default()
        };
        for meta in kernels.values() {
            *stats.by_domain.entry(meta.domain).or_insert(0) += 1;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let registry = KernelRegistry::new();
        registry
            .register_metadata(KernelMetadata::batch("graph/build", Domain::GraphAnalytics))
            .unwrap();
        registry
            .register_metadata(KernelMetadata::batch("compliance/smurfing", Domain::Compliance))
            .unwrap();

        assert_eq!(registry.total_count(), 2);
        assert!(registry.get("graph/build").is_some());
        assert!(registry.get("graph/missing").is_none());
        assert!(matches!(
            registry.require("graph/missing"),
            Err(KernelError::KernelNotFound(_))
        ));
        assert_eq!(registry.by_domain(Domain::Compliance).len(), 1);
    }

    #[test]
    fn test_duplicate_registration() {
        let registry = KernelRegistry::new();
        let meta = KernelMetadata::batch("graph/build", Domain::GraphAnalytics);
        registry.register_metadata(meta.clone()).unwrap();

        let err = registry.register_metadata(meta).unwrap_err();
        assert!(matches!(err, KernelError::KernelAlreadyRegistered(_)));
    }

    #[test]
    fn test_stats_and_ordering() {
        let registry = KernelRegistry::new();
        for id in ["graph/shell-chains", "graph/build", "compliance/scoring"] {
            let domain = if id.starts_with("graph") {
                Domain::GraphAnalytics
            } else {
                Domain::Compliance
            };
            registry
                .register_metadata(KernelMetadata::batch(id, domain))
                .unwrap();
        }

        let ids: Vec<String> = registry.all().into_iter().map(|m| m.id).collect();
        assert_eq!(
            ids,
            vec!["compliance/scoring", "graph/build", "graph/shell-chains"]
        );

        let stats = registry.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_domain.get(&Domain::GraphAnalytics), Some(&2));
    }
}
