//! # AegisGraph
//!
//! Flags accounts and groups of accounts in a transaction ledger that show
//! money-laundering patterns: circular fund routing, fan-in/fan-out
//! smurfing and layered shell chains.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use aegisgraph::prelude::*;
//!
//! let transactions = aegisgraph::ingest::read_csv_file("ledger.csv")?;
//! let analyzer = Analyzer::new(EngineConfig::default());
//! let report = analyzer.analyze(&transactions)?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```
//!
//! ## Crates
//!
//! - `core`: configuration, errors, kernel metadata and registry
//! - `graph`: graph construction, cycle and shell-chain detection
//! - `compliance`: smurfing detection, ring assembly and scoring

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use aegisgraph_compliance as compliance;
pub use aegisgraph_core as core;
pub use aegisgraph_graph as graph;

pub mod ingest;
pub mod pipeline;
pub mod report;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use aegisgraph::prelude::*;
/// ```
pub mod prelude {
    pub use aegisgraph_core::prelude::*;

    pub use aegisgraph_compliance::engine::{detect_fraud, detect_fraud_concurrent};
    pub use aegisgraph_compliance::types::{
        FraudDetection, FraudRing, PatternKind, RingId, SuspiciousAccount,
    };
    pub use aegisgraph_graph::builder::build_graph;
    pub use aegisgraph_graph::types::{Transaction, TransactionGraph};

    pub use crate::pipeline::Analyzer;
    pub use crate::report::{build_report, AnalysisEnvelope, AnalysisReport, Summary};
}

use aegisgraph_core::error::Result;
use aegisgraph_core::registry::KernelRegistry;

/// Register every kernel with a registry.
pub fn register_all(registry: &KernelRegistry) -> Result<()> {
    aegisgraph_graph::register_all(registry)?;
    aegisgraph_compliance::register_all(registry)?;
    Ok(())
}

/// A registry holding every kernel.
pub fn registry() -> Result<KernelRegistry> {
    let registry = KernelRegistry::new();
    register_all(&registry)?;
    Ok(registry)
}

/// Version information.
pub mod version {
    /// Crate version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}
