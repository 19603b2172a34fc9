//! # AegisGraph Graph
//!
//! Transaction graph construction and the structural detectors that run on
//! it.
//!
//! ## Kernels
//! - `GraphBuilder` - directed multigraph from ledger rows
//! - `CycleDetection` - bounded DFS for 3-5 account fund cycles
//! - `ShellChainDetection` - BFS for chains through low-activity accounts

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod cycles;
pub mod messages;
pub mod shell;
pub mod types;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::builder::*;
    pub use crate::cycles::*;
    pub use crate::messages::*;
    pub use crate::shell::*;
    pub use crate::types::*;
}

/// Register all graph kernels with a registry.
pub fn register_all(
    registry: &aegisgraph_core::registry::KernelRegistry,
) -> aegisgraph_core::error::Result<()> {
    tracing::info!("Registering graph kernels");

    registry.register_from(builder::GraphBuilder::new)?;
    registry.register_from(cycles::CycleDetection::new)?;
    registry.register_from(shell::ShellChainDetection::new)?;

    tracing::info!("Registered 3 graph kernels");
    Ok(())
}
