//! Ring assembly and ring-id allocation.
//!
//! Detector outputs are buffered and merged here in a fixed order (cycles,
//! then smurfing rings, then shell chains) so ring ids do not depend on which
//! detector finished first.

use crate::smurfing::SmurfRing;
use crate::types::{AccountLedger, FraudRing, PatternHit, PatternKind, RingId};
use aegisgraph_core::config::ScoringWeights;
use aegisgraph_graph::shell::ShellChain;

/// Owns the ring-id counter, the rings and the per-account hit ledger for
/// one analysis.
#[derive(Debug, Clone)]
pub struct RingAssembler {
    weights: ScoringWeights,
    next_id: u32,
    rings: Vec<FraudRing>,
    ledger: AccountLedger,
}

impl RingAssembler {
    /// Create an assembler; the first ring is `RING-001`.
    pub fn new(weights: &ScoringWeights) -> Self {
        Self {
            weights: weights.clone(),
            next_id: 1,
            rings: Vec::new(),
            ledger: AccountLedger::new(),
        }
    }

    fn open_ring(&mut self, members: Vec<String>, pattern: PatternKind, risk: u32) -> RingId {
        let ring_id = RingId::new(self.next_id);
        self.next_id += 1;
        self.rings.push(FraudRing {
            ring_id,
            member_accounts: members,
            pattern_type: pattern,
            risk_score: risk,
        });
        ring_id
    }

    fn hit(&mut self, account_id: &str, kind: PatternKind, ring_id: RingId, score: u32) {
        self.ledger.record(
            account_id,
            PatternHit {
                kind,
                ring_id,
                score,
            },
        );
    }

    /// One ring per cycle; every member is tagged `cycle`.
    pub fn add_cycles(&mut self, cycles: &[Vec<String>]) {
        for cycle in cycles {
            if cycle.is_empty() {
                continue;
            }
            let risk = self.weights.cycle_ring_risk;
            let ring_id = self.open_ring(cycle.clone(), PatternKind::Cycle, risk);
            let score = self.weights.cycle_member;
            for account in cycle {
                self.hit(account, PatternKind::Cycle, ring_id, score);
            }
        }
    }

    /// One ring per smurfing group; aggregator and participants get their roles.
    pub fn add_smurf_rings(&mut self, rings: &[SmurfRing]) {
        for ring in rings {
            let ring_id = self.open_ring(
                ring.members(),
                ring.direction.pattern(),
                self.weights.smurfing_ring_risk,
            );
            self.hit(
                &ring.aggregator,
                PatternKind::SmurfAggregator,
                ring_id,
                self.weights.smurf_aggregator,
            );
            for participant in &ring.participants {
                self.hit(
                    participant,
                    PatternKind::SmurfParticipant,
                    ring_id,
                    self.weights.smurf_participant,
                );
            }
        }
    }

    /// One ring per chain; only interior accounts are tagged.
    pub fn add_shell_chains(&mut self, chains: &[ShellChain]) {
        for chain in chains {
            if chain.members.is_empty() {
                continue;
            }
            let ring_id = self.open_ring(
                chain.members.clone(),
                PatternKind::ShellNetwork,
                self.weights.shell_ring_risk,
            );
            for account in &chain.intermediates {
                self.hit(
                    account,
                    PatternKind::ShellIntermediate,
                    ring_id,
                    self.weights.shell_intermediate,
                );
            }
        }
    }

    /// Rings assembled so far.
    pub fn rings(&self) -> &[FraudRing] {
        &self.rings
    }

    /// Consume the assembler, returning rings and the hit ledger.
    pub fn finish(self) -> (Vec<FraudRing>, AccountLedger) {
        (self.rings, self.ledger)
    }
}
