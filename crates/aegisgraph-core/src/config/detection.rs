//! Detection limits and scoring weights.
//!
//! The detectors are budgeted heuristics: each one samples a bounded number
//! of start points and edges and stops at a result cap. The defaults here are
//! the reference budgets; changing them changes which patterns are found.

use crate::error::{KernelError, Result};
use serde::{Deserialize, Serialize};

/// Bounds for the cycle detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleLimits {
    /// Shortest cycle reported.
    pub min_length: usize,
    /// Longest cycle reported.
    pub max_length: usize,
    /// DFS depth at which a branch stops expanding.
    pub max_depth: usize,
    /// Outgoing edges explored per node, in insertion order.
    pub edges_per_node: usize,
    /// Lower bound of the cycle cap.
    pub min_cycles: usize,
    /// Upper bound of the cycle cap.
    pub max_cycles: usize,
    /// Start-node budget as a multiple of the cycle cap.
    pub start_multiplier: usize,
}

impl Default for CycleLimits {
    fn default() -> Self {
        Self {
            min_length: 3,
            max_length: 5,
            max_depth: 5,
            edges_per_node: 20,
            min_cycles: 200,
            max_cycles: 2000,
            start_multiplier: 3,
        }
    }
}

impl CycleLimits {
    /// Cycle cap for a graph: `clamp(node_count, min_cycles, max_cycles)`.
    #[must_use]
    pub fn cap_for(&self, node_count: usize) -> usize {
        node_count.max(self.min_cycles).min(self.max_cycles)
    }

    /// Number of DFS start nodes tried: `min(node_count, cap * start_multiplier)`.
    #[must_use]
    pub fn start_budget(&self, node_count: usize, cap: usize) -> usize {
        node_count.min(cap.saturating_mul(self.start_multiplier))
    }

    /// Validate the limits.
    pub fn validate(&self) -> Result<()> {
        if self.min_length > self.max_length {
            return Err(KernelError::config(
                "cycles.min_length must not exceed cycles.max_length",
            ));
        }
        if self.min_cycles > self.max_cycles {
            return Err(KernelError::config(
                "cycles.min_cycles must not exceed cycles.max_cycles",
            ));
        }
        if self.edges_per_node == 0 {
            return Err(KernelError::config("cycles.edges_per_node must be positive"));
        }
        Ok(())
    }
}

/// Bounds for the fan-in / fan-out smurfing detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmurfingLimits {
    /// Width of the rolling window in hours.
    pub window_hours: u32,
    /// Unique counterparties needed to flag a group.
    pub threshold: usize,
    /// Window start positions examined per group.
    pub starts_per_group: usize,
    /// Node count above which a dataset counts as large.
    pub large_dataset_nodes: usize,
    /// Ring cap for normal datasets.
    pub max_rings: usize,
    /// Ring cap for large datasets.
    pub max_rings_large: usize,
}

impl Default for SmurfingLimits {
    fn default() -> Self {
        Self {
            window_hours: 72,
            threshold: 10,
            starts_per_group: 100,
            large_dataset_nodes: 5000,
            max_rings: 200,
            max_rings_large: 50,
        }
    }
}

impl SmurfingLimits {
    /// Whether a graph with `node_count` accounts is treated as large.
    #[must_use]
    pub fn is_large(&self, node_count: usize) -> bool {
        node_count > self.large_dataset_nodes
    }

    /// Ring cap for the dataset size.
    #[must_use]
    pub fn ring_cap(&self, large_dataset: bool) -> usize {
        if large_dataset {
            self.max_rings_large
        } else {
            self.max_rings
        }
    }

    /// Validate the limits.
    pub fn validate(&self) -> Result<()> {
        if self.window_hours == 0 {
            return Err(KernelError::config("smurfing.window_hours must be positive"));
        }
        if self.threshold == 0 {
            return Err(KernelError::config("smurfing.threshold must be positive"));
        }
        Ok(())
    }
}

/// Bounds for the shell-chain detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellLimits {
    /// Accounts with at most this many transactions count as low activity.
    pub low_activity_max_transactions: usize,
    /// BFS start nodes, taken in graph order.
    pub max_start_nodes: usize,
    /// BFS depth bound; paths reaching this many accounts are not extended.
    pub max_depth: usize,
    /// Outgoing edges explored per node, in insertion order.
    pub edges_per_node: usize,
    /// Shortest chain reported, in accounts.
    pub min_length: usize,
    /// Longest chain reported, in accounts.
    pub max_length: usize,
    /// Lower bound of the chain cap.
    pub min_chains: usize,
    /// Upper bound of the chain cap.
    pub max_chains: usize,
}

impl Default for ShellLimits {
    fn default() -> Self {
        Self {
            low_activity_max_transactions: 3,
            max_start_nodes: 500,
            max_depth: 4,
            edges_per_node: 10,
            min_length: 3,
            max_length: 5,
            min_chains: 100,
            max_chains: 1000,
        }
    }
}

impl ShellLimits {
    /// Chain cap for a graph: `clamp(ceil(node_count / 2), min_chains, max_chains)`.
    #[must_use]
    pub fn cap_for(&self, node_count: usize) -> usize {
        node_count.div_ceil(2).max(self.min_chains).min(self.max_chains)
    }

    /// Validate the limits.
    pub fn validate(&self) -> Result<()> {
        if self.min_length > self.max_length {
            return Err(KernelError::config(
                "shell.min_length must not exceed shell.max_length",
            ));
        }
        if self.min_chains > self.max_chains {
            return Err(KernelError::config(
                "shell.min_chains must not exceed shell.max_chains",
            ));
        }
        if self.edges_per_node == 0 {
            return Err(KernelError::config("shell.edges_per_node must be positive"));
        }
        Ok(())
    }
}

/// Per-pattern score contributions, ring risk scores and bonuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Contribution for each cycle an account belongs to.
    pub cycle_member: u32,
    /// Contribution for aggregating a smurfing ring.
    pub smurf_aggregator: u32,
    /// Contribution for participating in a smurfing ring.
    pub smurf_participant: u32,
    /// Contribution for relaying inside a shell chain.
    pub shell_intermediate: u32,
    /// Risk score of cycle rings.
    pub cycle_ring_risk: u32,
    /// Risk score of smurfing rings.
    pub smurfing_ring_risk: u32,
    /// Risk score of shell-network rings.
    pub shell_ring_risk: u32,
    /// Velocity bonus applies above this many transactions.
    pub velocity_transactions: usize,
    /// Velocity bonus.
    pub velocity_bonus: u32,
    /// Large-amount bonus applies above this mean outgoing amount.
    pub large_amount_threshold: f64,
    /// Large-amount bonus.
    pub large_amount_bonus: u32,
    /// Merchant suppression requires more than this many transactions.
    pub merchant_min_transactions: usize,
    /// Merchant suppression requires more than this many counterparties.
    pub merchant_min_counterparties: usize,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            cycle_member: 40,
            smurf_aggregator: 35,
            smurf_participant: 20,
            shell_intermediate: 30,
            cycle_ring_risk: 90,
            smurfing_ring_risk: 85,
            shell_ring_risk: 75,
            velocity_transactions: 20,
            velocity_bonus: 15,
            large_amount_threshold: 5000.0,
            large_amount_bonus: 10,
            merchant_min_transactions: 50,
            merchant_min_counterparties: 20,
        }
    }
}

/// All detector budgets and weights for one analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Cycle detector bounds.
    pub cycles: CycleLimits,
    /// Smurfing detector bounds.
    pub smurfing: SmurfingLimits,
    /// Shell-chain detector bounds.
    pub shell: ShellLimits,
    /// Scoring weights.
    pub scoring: ScoringWeights,
}

impl DetectionConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.cycles.validate()?;
        self.smurfing.validate()?;
        self.shell.validate()?;
        if !self.scoring.large_amount_threshold.is_finite() {
            return Err(KernelError::config(
                "scoring.large_amount_threshold must be finite",
            ));
        }
        Ok(())
    }
}
