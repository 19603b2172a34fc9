//! Suspicion scoring and false-positive suppression.

use crate::messages::{ScoringInput, ScoringOutput};
use crate::types::{AccountHits, AccountLedger, PatternKind, SuspiciousAccount};
use aegisgraph_core::{
    config::ScoringWeights,
    domain::Domain,
    error::{KernelError, Result},
    kernel::KernelMetadata,
    traits::{BatchKernel, Kernel},
};
use aegisgraph_graph::types::{NodeId, TransactionGraph};
use async_trait::async_trait;
use std::time::Instant;

/// Upper bound of a suspicion score.
pub const MAX_SUSPICION_SCORE: u32 = 100;

/// Turns per-account pattern hits into the flagged-account list.
///
/// Accounts that look like high-volume merchants (many transactions, many
/// counterparties, no cycle membership) are dropped. Survivors are scored
/// additively and sorted by score, highest first; ties keep first-hit order.
#[derive(Debug, Clone)]
pub struct SuspicionScoring {
    metadata: KernelMetadata,
}

impl Default for SuspicionScoring {
    fn default() -> Self {
        Self::new()
    }
}

impl SuspicionScoring {
    /// Create a new scoring kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch("compliance/suspicion-scoring", Domain::Compliance)
                .with_description("Additive suspicion scoring with merchant suppression")
                .with_throughput(500_000)
                .with_latency_us(100.0),
        }
    }

    /// Score every account in the ledger.
    ///
    /// Fails with `InternalError` if a ledger account is missing from the
    /// graph, which means the ledger was built from a different graph.
    pub fn compute(
        graph: &TransactionGraph,
        ledger: &AccountLedger,
        weights: &ScoringWeights,
    ) -> Result<Vec<SuspiciousAccount>> {
        let mut accounts = Vec::with_capacity(ledger.len());
        let mut suppressed = 0usize;

        for (account_id, hits) in ledger.iter() {
            let node = graph.node_id(account_id).ok_or_else(|| {
                KernelError::internal(format!("Ring member {} is not in the graph", account_id))
            })?;

            if is_legitimate_merchant(graph, node, hits.has(PatternKind::Cycle), weights) {
                suppressed += 1;
                continue;
            }

            accounts.push(SuspiciousAccount {
                account_id: account_id.to_string(),
                suspicion_score: suspicion_score(graph, node, hits, weights),
                detected_patterns: hits.patterns(),
                ring_id: hits.first_ring(),
            });
        }

        accounts.sort_by(|a, b| b.suspicion_score.cmp(&a.suspicion_score));

        tracing::debug!(
            flagged = accounts.len(),
            suppressed,
            "Scored suspicious accounts"
        );
        Ok(accounts)
    }
}

/// High-volume account with many distinct counterparties and no cycle.
pub fn is_legitimate_merchant(
    graph: &TransactionGraph,
    node: NodeId,
    in_cycle: bool,
    weights: &ScoringWeights,
) -> bool {
    if in_cycle || graph.node(node).total_transactions <= weights.merchant_min_transactions {
        return false;
    }
    graph.counterparties(node).len() > weights.merchant_min_counterparties
}

/// Hit scores plus velocity and large-amount bonuses, capped at 100.
pub fn suspicion_score(
    graph: &TransactionGraph,
    node: NodeId,
    hits: &AccountHits,
    weights: &ScoringWeights,
) -> u32 {
    let mut score = hits.total_score();

    if graph.node(node).total_transactions > weights.velocity_transactions {
        score += u64::from(weights.velocity_bonus);
    }
    if graph.mean_outgoing_amount(node) > weights.large_amount_threshold {
        score += u64::from(weights.large_amount_bonus);
    }

    score.min(u64::from(MAX_SUSPICION_SCORE)) as u32
}

impl Kernel for SuspicionScoring {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

#[async_trait]
impl BatchKernel<ScoringInput, ScoringOutput> for SuspicionScoring {
    async fn execute(&self, input: ScoringInput) -> Result<ScoringOutput> {
        let start = Instant::now();
        let accounts = Self::compute(&input.graph, &input.ledger, &input.weights)?;
        Ok(ScoringOutput {
            accounts,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PatternHit, RingId};
    use aegisgraph_graph::builder::build_graph;
    use aegisgraph_graph::types::Transaction;

    fn tx(id: usize, from: &str, to: &str, amount: f64) -> Transaction {
        Transaction::parse(format!("T{}", id), from, to, amount, "2026-04-01 10:00:00").unwrap()
    }

    fn hit(kind: PatternKind, ring: u32, score: u32) -> PatternHit {
        PatternHit {
            kind,
            ring_id: RingId::new(ring),
            score,
        }
    }

    /// `account` trades with `partners` distinct counterparties, `total` rows overall.
    fn busy_ledger(account: &str, partners: usize, total: usize) -> Vec<Transaction> {
        (0..total)
            .map(|i| {
                let partner = format!("P{}", i % partners);
                if i % 2 == 0 {
                    tx(i, &partner, account, 100.0)
                } else {
                    tx(i, account, &partner, 100.0)
                }
            })
            .collect()
    }

    #[test]
    fn test_scoring_metadata() {
        let kernel = SuspicionScoring::new();
        assert_eq!(kernel.metadata().id, "compliance/suspicion-scoring");
    }

    #[test]
    fn test_merchant_suppressed() {
        // 51 transactions, 21 counterparties, no cycle.
        let graph = build_graph(&busy_ledger("M", 21, 51));
        let mut ledger = AccountLedger::new();
        ledger.record("M", hit(PatternKind::SmurfAggregator, 1, 35));

        let accounts =
            SuspicionScoring::compute(&graph, &ledger, &ScoringWeights::default()).unwrap();
        assert!(accounts.is_empty());
    }

    #[test]
    fn test_merchant_in_cycle_not_suppressed() {
        let graph = build_graph(&busy_ledger("M", 21, 51));
        let mut ledger = AccountLedger::new();
        ledger.record("M", hit(PatternKind::Cycle, 1, 40));

        let accounts =
            SuspicionScoring::compute(&graph, &ledger, &ScoringWeights::default()).unwrap();
        assert_eq!(accounts.len(), 1);
        // 40 + velocity bonus.
        assert_eq!(accounts[0].suspicion_score, 55);
    }

    #[test]
    fn test_few_counterparties_not_suppressed() {
        let graph = build_graph(&busy_ledger("M", 20, 51));
        let mut ledger = AccountLedger::new();
        ledger.record("M", hit(PatternKind::SmurfParticipant, 1, 20));

        let accounts =
            SuspicionScoring::compute(&graph, &ledger, &ScoringWeights::default()).unwrap();
        assert_eq!(accounts.len(), 1);
    }

    #[test]
    fn test_score_bonuses_and_clamp() {
        let graph = build_graph(&[tx(0, "A", "B", 9000.0), tx(1, "B", "C", 10.0)]);
        let weights = ScoringWeights::default();
        let mut ledger = AccountLedger::new();
        ledger.record("A", hit(PatternKind::Cycle, 1, 40));
        ledger.record("A", hit(PatternKind::Cycle, 2, 40));
        ledger.record("B", hit(PatternKind::Cycle, 1, 40));
        for ring in 1..=4 {
            ledger.record("C", hit(PatternKind::Cycle, ring, 40));
        }

        let accounts = SuspicionScoring::compute(&graph, &ledger, &weights).unwrap();
        let score = |id: &str| {
            accounts
                .iter()
                .find(|a| a.account_id == id)
                .map(|a| a.suspicion_score)
                .unwrap()
        };

        // 80 + large-amount bonus.
        assert_eq!(score("A"), 90);
        assert_eq!(score("B"), 40);
        // 160 raw, clamped.
        assert_eq!(score("C"), 100);
        assert!(accounts.iter().all(|a| a.suspicion_score <= MAX_SUSPICION_SCORE));
    }

    #[test]
    fn test_sorted_descending_stable() {
        let graph = build_graph(&[tx(0, "A", "B", 1.0), tx(1, "B", "C", 1.0)]);
        let mut ledger = AccountLedger::new();
        ledger.record("A", hit(PatternKind::ShellIntermediate, 1, 30));
        ledger.record("B", hit(PatternKind::Cycle, 2, 40));
        ledger.record("C", hit(PatternKind::ShellIntermediate, 3, 30));

        let accounts =
            SuspicionScoring::compute(&graph, &ledger, &ScoringWeights::default()).unwrap();
        let order: Vec<&str> = accounts.iter().map(|a| a.account_id.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_patterns_and_first_ring() {
        let graph = build_graph(&[tx(0, "A", "B", 1.0)]);
        let mut ledger = AccountLedger::new();
        ledger.record("A", hit(PatternKind::Cycle, 3, 40));
        ledger.record("A", hit(PatternKind::SmurfParticipant, 5, 20));
        ledger.record("A", hit(PatternKind::Cycle, 4, 40));

        let accounts =
            SuspicionScoring::compute(&graph, &ledger, &ScoringWeights::default()).unwrap();
        assert_eq!(
            accounts[0].detected_patterns,
            vec![PatternKind::Cycle, PatternKind::SmurfParticipant]
        );
        assert_eq!(accounts[0].ring_id, Some(RingId::new(3)));
    }

    #[test]
    fn test_missing_member_is_internal_error() {
        let graph = build_graph(&[tx(0, "A", "B", 1.0)]);
        let mut ledger = AccountLedger::new();
        ledger.record("GHOST", hit(PatternKind::Cycle, 1, 40));

        let err = SuspicionScoring::compute(&graph, &ledger, &ScoringWeights::default())
            .unwrap_err();
        assert!(matches!(err, KernelError::InternalError(_)));
    }
}
