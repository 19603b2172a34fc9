//! Batch input and output messages for graph kernels.

use crate::cycles::CycleDetectionResult;
use crate::shell::ShellChainResult;
use crate::types::{Transaction, TransactionGraph};
use aegisgraph_core::config::{CycleLimits, ShellLimits};
use std::sync::Arc;

// ============================================================================
// Graph Construction Messages
// ============================================================================

/// Graph construction input.
#[derive(Debug, Clone)]
pub struct GraphBuildInput {
    /// Ledger rows in file order.
    pub transactions: Vec<Transaction>,
}

impl GraphBuildInput {
    /// Create a new graph construction input.
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }
}

/// Graph construction output.
#[derive(Debug, Clone)]
pub struct GraphBuildOutput {
    /// The constructed graph.
    pub graph: TransactionGraph,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}

// ============================================================================
// Cycle Detection Messages
// ============================================================================

/// Cycle detection input.
#[derive(Debug, Clone)]
pub struct CycleDetectionInput {
    /// Graph to search.
    pub graph: Arc<TransactionGraph>,
    /// Search bounds.
    pub limits: CycleLimits,
}

impl CycleDetectionInput {
    /// Create an input with default limits.
    pub fn new(graph: Arc<TransactionGraph>) -> Self {
        Self {
            graph,
            limits: CycleLimits::default(),
        }
    }

    /// Override the search bounds.
    pub fn with_limits(mut self, limits: CycleLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Cycle detection output.
#[derive(Debug, Clone)]
pub struct CycleDetectionOutput {
    /// Detected cycles.
    pub result: CycleDetectionResult,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}

// ============================================================================
// Shell Chain Messages
// ============================================================================

/// Shell chain detection input.
#[derive(Debug, Clone)]
pub struct ShellChainInput {
    /// Graph to search.
    pub graph: Arc<TransactionGraph>,
    /// Search bounds.
    pub limits: ShellLimits,
}

impl ShellChainInput {
    /// Create an input with default limits.
    pub fn new(graph: Arc<TransactionGraph>) -> Self {
        Self {
            graph,
            limits: ShellLimits::default(),
        }
    }

    /// Override the search bounds.
    pub fn with_limits(mut self, limits: ShellLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Shell chain detection output.
#[derive(Debug, Clone)]
pub struct ShellChainOutput {
    /// Detected chains.
    pub result: ShellChainResult,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}
