//! Fan-in / fan-out smurfing detection.
//!
//! Transactions are grouped by receiver (fan-in) and by sender (fan-out).
//! Each qualifying group is sorted by time and scanned with a forward window
//! from each of its first `starts_per_group` transactions; a window
//! contributes its counterparties once it is both the widest seen so far and
//! at least `threshold` wide.

use crate::messages::{SmurfingInput, SmurfingOutput};
use crate::types::PatternKind;
use aegisgraph_core::{
    config::SmurfingLimits,
    domain::Domain,
    error::Result,
    kernel::KernelMetadata,
    traits::{BatchKernel, Kernel},
};
use aegisgraph_graph::types::Transaction;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

/// Which side of the group the aggregator sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanDirection {
    /// Many senders into one receiver.
    FanIn,
    /// One sender out to many receivers.
    FanOut,
}

impl FanDirection {
    /// Ring pattern for this direction.
    pub const fn pattern(&self) -> PatternKind {
        match self {
            FanDirection::FanIn => PatternKind::FanInSmurfing,
            FanDirection::FanOut => PatternKind::FanOutSmurfing,
        }
    }

    fn aggregator<'t>(&self, tx: &'t Transaction) -> &'t str {
        match self {
            FanDirection::FanIn => &tx.receiver_id,
            FanDirection::FanOut => &tx.sender_id,
        }
    }

    fn counterparty<'t>(&self, tx: &'t Transaction) -> &'t str {
        match self {
            FanDirection::FanIn => &tx.sender_id,
            FanDirection::FanOut => &tx.receiver_id,
        }
    }
}

/// One aggregator and the counterparties found in its window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmurfRing {
    /// Fan direction.
    pub direction: FanDirection,
    /// Receiver (fan-in) or sender (fan-out).
    pub aggregator: String,
    /// Counterparties in first-seen order.
    pub participants: Vec<String>,
}

impl SmurfRing {
    /// Aggregator followed by participants.
    pub fn members(&self) -> Vec<String> {
        std::iter::once(self.aggregator.clone())
            .chain(self.participants.iter().cloned())
            .collect()
    }
}

/// Smurfing rings found in one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmurfingResult {
    /// Fan-in rings followed by fan-out rings.
    pub rings: Vec<SmurfRing>,
    /// Number of fan-in rings.
    pub fan_in: usize,
    /// Number of fan-out rings.
    pub fan_out: usize,
    /// Ring cap applied.
    pub cap: usize,
    /// True when the cap stopped the scan with groups left.
    pub truncated: bool,
}

/// Smurfing detection kernel.
#[derive(Debug, Clone)]
pub struct SmurfingDetection {
    metadata: KernelMetadata,
}

impl Default for SmurfingDetection {
    fn default() -> Self {
        Self::new()
    }
}

impl SmurfingDetection {
    /// Create a new smurfing detection kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch("compliance/smurfing", Domain::Compliance)
                .with_description("Fan-in/fan-out detection over a rolling time window")
                .with_throughput(200_000)
                .with_latency_us(300.0),
        }
    }

    /// Detect smurfing rings.
    ///
    /// `node_count` selects the large-dataset ring cap. The cap is shared by
    /// both directions and checked before each group, so fan-out rings are
    /// only found once fan-in leaves room.
    pub fn compute(
        transactions: &[Transaction],
        node_count: usize,
        limits: &SmurfingLimits,
    ) -> SmurfingResult {
        let cap = limits.ring_cap(limits.is_large(node_count));
        let mut rings = Vec::new();

        let mut truncated = false;

        let fan_in = Self::scan(
            transactions,
            FanDirection::FanIn,
            limits,
            cap,
            &mut rings,
            &mut truncated,
        );
        let fan_out = Self::scan(
            transactions,
            FanDirection::FanOut,
            limits,
            cap,
            &mut rings,
            &mut truncated,
        );

        tracing::debug!(fan_in, fan_out, cap, "Smurfing scan complete");
        if truncated {
            tracing::warn!(cap, "Smurfing ring cap reached, results truncated");
        }

        SmurfingResult {
            rings,
            fan_in,
            fan_out,
            cap,
            truncated,
        }
    }

    /// Scan one direction, appending rings. Returns the number added.
    fn scan(
        transactions: &[Transaction],
        direction: FanDirection,
        limits: &SmurfingLimits,
        cap: usize,
        rings: &mut Vec<SmurfRing>,
        truncated: &mut bool,
    ) -> usize {
        let before = rings.len();

        for (aggregator, mut group) in group_by(transactions, direction) {
            if rings.len() >= cap {
                *truncated = true;
                break;
            }
            if group.len() < limits.threshold {
                continue;
            }
            let distinct: HashSet<&str> =
                group.iter().map(|tx| direction.counterparty(tx)).collect();
            if distinct.len() < limits.threshold {
                continue;
            }

            group.sort_by_key(|tx| tx.timestamp);
            let participants = window_counterparties(&group, direction, limits);
            if participants.len() >= limits.threshold {
                rings.push(SmurfRing {
                    direction,
                    aggregator: aggregator.to_string(),
                    participants,
                });
            }
        }

        rings.len() - before
    }
}

/// Group transactions by aggregator in first-seen order.
fn group_by(
    transactions: &[Transaction],
    direction: FanDirection,
) -> Vec<(&str, Vec<&Transaction>)> {
    let mut groups: Vec<(&str, Vec<&Transaction>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for tx in transactions {
        let key = direction.aggregator(tx);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(tx);
    }

    groups
}

/// Counterparties of the first qualifying window in a time-sorted group.
fn window_counterparties(
    sorted: &[&Transaction],
    direction: FanDirection,
    limits: &SmurfingLimits,
) -> Vec<String> {
    let window = chrono::Duration::hours(i64::from(limits.window_hours));
    let mut accumulated: Vec<&str> = Vec::new();
    let mut accumulated_set: HashSet<&str> = HashSet::new();
    let mut widest = 0;

    for (i, first) in sorted.iter().enumerate().take(limits.starts_per_group) {
        let end = first
            .timestamp
            .checked_add_signed(window)
            .unwrap_or(NaiveDateTime::MAX);
        let mut in_window: Vec<&str> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();

        for tx in &sorted[i..] {
            if tx.timestamp > end {
                break;
            }
            let party = direction.counterparty(tx);
            if seen.insert(party) {
                in_window.push(party);
            }
        }

        if in_window.len() > widest {
            widest = in_window.len();
            if in_window.len() >= limits.threshold {
                for party in in_window {
                    if accumulated_set.insert(party) {
                        accumulated.push(party);
                    }
                }
            }
        }

        if accumulated.len() >= limits.threshold {
            break;
        }
    }

    accumulated.into_iter().map(str::to_string).collect()
}

impl Kernel for SmurfingDetection {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

#[async_trait]
impl BatchKernel<SmurfingInput, SmurfingOutput> for SmurfingDetection {
    async fn execute(&self, input: SmurfingInput) -> Result<SmurfingOutput> {
        let start = Instant::now();
        let result = Self::compute(&input.transactions, input.node_count, &input.limits);
        Ok(SmurfingOutput {
            result,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }

    fn validate_input(&self, input: &SmurfingInput) -> Result<()> {
        input.limits.validate()
    }
}
