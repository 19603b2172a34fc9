//! Batch input and output messages for compliance kernels.

use crate::smurfing::SmurfingResult;
use crate::types::{AccountLedger, FraudDetection, SuspiciousAccount};
use aegisgraph_core::config::{DetectionConfig, ScoringWeights, SmurfingLimits};
use aegisgraph_graph::types::{Transaction, TransactionGraph};
use std::sync::Arc;

// ============================================================================
// Smurfing Messages
// ============================================================================

/// Smurfing detection input.
#[derive(Debug, Clone)]
pub struct SmurfingInput {
    /// Ledger rows in file order.
    pub transactions: Arc<[Transaction]>,
    /// Account count of the graph, used for the large-dataset cap.
    pub node_count: usize,
    /// Detector bounds.
    pub limits: SmurfingLimits,
}

impl SmurfingInput {
    /// Create an input with default limits.
    pub fn new(transactions: Arc<[Transaction]>, node_count: usize) -> Self {
        Self {
            transactions,
            node_count,
            limits: SmurfingLimits::default(),
        }
    }

    /// Override the detector bounds.
    pub fn with_limits(mut self, limits: SmurfingLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Smurfing detection output.
#[derive(Debug, Clone)]
pub struct SmurfingOutput {
    /// Detected rings.
    pub result: SmurfingResult,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}

// ============================================================================
// Scoring Messages
// ============================================================================

/// Suspicion scoring input.
#[derive(Debug, Clone)]
pub struct ScoringInput {
    /// Graph the ledger was built against.
    pub graph: Arc<TransactionGraph>,
    /// Pattern hits per account.
    pub ledger: AccountLedger,
    /// Weights and bonuses.
    pub weights: ScoringWeights,
}

impl ScoringInput {
    /// Create an input with default weights.
    pub fn new(graph: Arc<TransactionGraph>, ledger: AccountLedger) -> Self {
        Self {
            graph,
            ledger,
            weights: ScoringWeights::default(),
        }
    }
}

/// Suspicion scoring output.
#[derive(Debug, Clone)]
pub struct ScoringOutput {
    /// Flagged accounts, highest score first.
    pub accounts: Vec<SuspiciousAccount>,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}

// ============================================================================
// Fraud Detection Messages
// ============================================================================

/// Full fraud-detection input.
#[derive(Debug, Clone)]
pub struct FraudDetectionInput {
    /// Graph built from `transactions`.
    pub graph: Arc<TransactionGraph>,
    /// Ledger rows in file order.
    pub transactions: Arc<[Transaction]>,
    /// Detector budgets and weights.
    pub config: DetectionConfig,
}

impl FraudDetectionInput {
    /// Create an input with the default configuration.
    pub fn new(graph: Arc<TransactionGraph>, transactions: Arc<[Transaction]>) -> Self {
        Self {
            graph,
            transactions,
            config: DetectionConfig::default(),
        }
    }

    /// Override the configuration.
    pub fn with_config(mut self, config: DetectionConfig) -> Self {
        self.config = config;
        self
    }
}

/// Full fraud-detection output.
#[derive(Debug, Clone)]
pub struct FraudDetectionOutput {
    /// Flagged accounts and rings.
    pub result: FraudDetection,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}
