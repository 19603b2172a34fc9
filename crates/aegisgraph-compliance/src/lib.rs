//! # AegisGraph Compliance
//!
//! Money-laundering pattern detection on top of the transaction graph.
//!
//! ## Kernels
//! - `SmurfingDetection` - fan-in/fan-out aggregation in a rolling window
//! - `SuspicionScoring` - additive scoring with merchant suppression
//! - `FraudDetector` - full pipeline: detectors, ring assembly, scoring
//!
//! Ring ids are allocated by `RingAssembler` in a fixed order (cycles,
//! smurfing, shell chains).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod messages;
pub mod rings;
pub mod scoring;
pub mod smurfing;
pub mod types;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::engine::*;
    pub use crate::messages::*;
    pub use crate::rings::*;
    pub use crate::scoring::*;
    pub use crate::smurfing::*;
    pub use crate::types::*;
}

/// Register all compliance kernels with a registry.
pub fn register_all(
    registry: &aegisgraph_core::registry::KernelRegistry,
) -> aegisgraph_core::error::Result<()> {
    tracing::info!("Registering compliance kernels");

    registry.register_from(smurfing::SmurfingDetection::new)?;
    registry.register_from(scoring::SuspicionScoring::new)?;
    registry.register_from(engine::FraudDetector::new)?;

    tracing::info!("Registered 3 compliance kernels");
    Ok(())
}
