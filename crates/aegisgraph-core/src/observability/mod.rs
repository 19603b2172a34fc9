//! Observability
//!
//! Structured logging for the analysis pipeline. Every phase and detector
//! reports through `tracing`; this module configures where those events go.

pub mod logging;

pub use logging::{LogConfig, LogLevel};
