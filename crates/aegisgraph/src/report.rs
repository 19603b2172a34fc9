//! Result assembly.

use aegisgraph_compliance::types::{FraudDetection, FraudRing, SuspiciousAccount};
use aegisgraph_core::error::Result;
use aegisgraph_graph::types::TransactionGraph;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Run totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Accounts in the graph.
    pub total_accounts_analyzed: usize,
    /// Accounts in `suspicious_accounts`.
    pub suspicious_accounts_flagged: usize,
    /// Rings in `fraud_rings`.
    pub fraud_rings_detected: usize,
    /// Wall time in seconds, three decimals.
    pub processing_time_seconds: f64,
}

/// The analysis result document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Flagged accounts, highest score first.
    pub suspicious_accounts: Vec<SuspiciousAccount>,
    /// Detected rings in id order.
    pub fraud_rings: Vec<FraudRing>,
    /// Totals.
    pub summary: Summary,
}

/// Round a duration to milliseconds, in seconds.
pub fn round_seconds(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0).round() / 1000.0
}

/// Assemble the report for one analysis.
pub fn build_report(
    detection: FraudDetection,
    graph: &TransactionGraph,
    processing_time: Duration,
) -> AnalysisReport {
    let FraudDetection {
        mut suspicious_accounts,
        fraud_rings,
    } = detection;
    suspicious_accounts.sort_by(|a, b| b.suspicion_score.cmp(&a.suspicion_score));

    let summary = Summary {
        total_accounts_analyzed: graph.node_count(),
        suspicious_accounts_flagged: suspicious_accounts.len(),
        fraud_rings_detected: fraud_rings.len(),
        processing_time_seconds: round_seconds(processing_time),
    };

    AnalysisReport {
        suspicious_accounts,
        fraud_rings,
        summary,
    }
}

/// Response wrapper for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisEnvelope {
    /// Random run identifier.
    pub analysis_id: Uuid,
    /// Accounts in the graph.
    pub total_accounts: usize,
    /// Parsed ledger rows.
    pub total_transactions: usize,
    /// Flagged accounts.
    pub suspicious_accounts_flagged: usize,
    /// Detected rings.
    pub fraud_rings_detected: usize,
    /// End-to-end wall time in seconds, three decimals.
    pub processing_time_seconds: f64,
    /// The report.
    pub data: AnalysisReport,
}

impl AnalysisEnvelope {
    /// Wrap a report with a fresh analysis id.
    pub fn new(data: AnalysisReport, total_transactions: usize, elapsed: Duration) -> Self {
        Self {
            analysis_id: Uuid::new_v4(),
            total_accounts: data.summary.total_accounts_analyzed,
            total_transactions,
            suspicious_accounts_flagged: data.summary.suspicious_accounts_flagged,
            fraud_rings_detected: data.summary.fraud_rings_detected,
            processing_time_seconds: round_seconds(elapsed),
            data,
        }
    }

    /// Render as JSON, indented when `pretty` is set.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}
