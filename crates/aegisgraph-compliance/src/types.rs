//! Compliance types and data structures.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Pattern Kinds
// ============================================================================

/// Every pattern tag the engine can emit.
///
/// The first four name a ring's `pattern_type`; the last three are the
/// per-account roles recorded in `detected_patterns`. `Cycle` is both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Circular fund routing.
    Cycle,
    /// Many senders into one aggregator.
    FanInSmurfing,
    /// One aggregator out to many receivers.
    FanOutSmurfing,
    /// Layered chain through shell accounts.
    ShellNetwork,
    /// Aggregator of a smurfing ring.
    SmurfAggregator,
    /// Counterparty of a smurfing ring.
    SmurfParticipant,
    /// Interior account of a shell chain.
    ShellIntermediate,
}

impl PatternKind {
    /// Wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Cycle => "cycle",
            PatternKind::FanInSmurfing => "fan_in_smurfing",
            PatternKind::FanOutSmurfing => "fan_out_smurfing",
            PatternKind::ShellNetwork => "shell_network",
            PatternKind::SmurfAggregator => "smurf_aggregator",
            PatternKind::SmurfParticipant => "smurf_participant",
            PatternKind::ShellIntermediate => "shell_intermediate",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Rings
// ============================================================================

/// Sequential ring identifier, rendered as `RING-001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RingId(u32);

impl RingId {
    /// Create a ring id from its sequence number (1-based).
    pub const fn new(sequence: u32) -> Self {
        Self(sequence)
    }
}

impl fmt::Display for RingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RING-{:03}", self.0)
    }
}

impl From<RingId> for String {
    fn from(id: RingId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for RingId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .strip_prefix("RING-")
            .and_then(|n| n.parse::<u32>().ok())
            .map(RingId)
            .ok_or_else(|| format!("invalid ring id: {}", value))
    }
}

/// A detected group of accounts sharing one pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudRing {
    /// Ring identifier.
    pub ring_id: RingId,
    /// Member accounts; never empty.
    pub member_accounts: Vec<String>,
    /// Ring pattern.
    pub pattern_type: PatternKind,
    /// Fixed risk score per pattern.
    pub risk_score: u32,
}

// ============================================================================
// Pattern Hits
// ============================================================================

/// One detector's contribution to one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternHit {
    /// Role tag.
    pub kind: PatternKind,
    /// Ring that produced the hit.
    pub ring_id: RingId,
    /// Score contribution.
    pub score: u32,
}

/// Hits recorded against one account, in detection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountHits {
    hits: Vec<PatternHit>,
}

impl AccountHits {
    /// All hits.
    pub fn hits(&self) -> &[PatternHit] {
        &self.hits
    }

    /// Distinct tags in first-seen order.
    pub fn patterns(&self) -> Vec<PatternKind> {
        let mut kinds = Vec::new();
        for hit in &self.hits {
            if !kinds.contains(&hit.kind) {
                kinds.push(hit.kind);
            }
        }
        kinds
    }

    /// First ring the account was attached to.
    pub fn first_ring(&self) -> Option<RingId> {
        self.hits.first().map(|h| h.ring_id)
    }

    /// Sum of score contributions.
    pub fn total_score(&self) -> u64 {
        self.hits.iter().map(|h| u64::from(h.score)).sum()
    }

    /// True if any hit carries `kind`.
    pub fn has(&self, kind: PatternKind) -> bool {
        self.hits.iter().any(|h| h.kind == kind)
    }
}

/// Per-account hits, iterated in first-hit order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountLedger {
    entries: Vec<(String, AccountHits)>,
    index: HashMap<String, usize>,
}

impl AccountLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a hit against an account.
    pub fn record(&mut self, account_id: &str, hit: PatternHit) {
        let slot = match self.index.get(account_id) {
            Some(&slot) => slot,
            None => {
                let slot = self.entries.len();
                self.entries
                    .push((account_id.to_string(), AccountHits::default()));
                self.index.insert(account_id.to_string(), slot);
                slot
            }
        };
        self.entries[slot].1.hits.push(hit);
    }

    /// Hits for one account.
    pub fn get(&self, account_id: &str) -> Option<&AccountHits> {
        self.index.get(account_id).map(|&slot| &self.entries[slot].1)
    }

    /// Accounts and their hits in first-hit order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AccountHits)> {
        self.entries.iter().map(|(id, hits)| (id.as_str(), hits))
    }

    /// Number of accounts with at least one hit.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no hits were recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Results
// ============================================================================

/// A flagged account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousAccount {
    /// Account identifier.
    pub account_id: String,
    /// Additive score clamped to 0..=100.
    pub suspicion_score: u32,
    /// Distinct pattern tags.
    pub detected_patterns: Vec<PatternKind>,
    /// First ring the account was attached to.
    pub ring_id: Option<RingId>,
}

/// Output of one fraud-detection pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FraudDetection {
    /// Flagged accounts, highest score first.
    pub suspicious_accounts: Vec<SuspiciousAccount>,
    /// Rings in id order.
    pub fraud_rings: Vec<FraudRing>,
}
