//! Fraud-detection engine.
//!
//! Runs the three structural detectors over one graph, merges their output
//! through a [`RingAssembler`] and scores the touched accounts. The detectors
//! only read the graph and ledger, so [`detect_fraud_concurrent`] can run them
//! on the blocking pool; the merge is the same in both paths, which keeps ring
//! ids and ordering identical.

use crate::messages::{FraudDetectionInput, FraudDetectionOutput};
use crate::rings::RingAssembler;
use crate::scoring::SuspicionScoring;
use crate::smurfing::{SmurfingDetection, SmurfingResult};
use crate::types::FraudDetection;
use aegisgraph_core::{
    config::DetectionConfig,
    domain::Domain,
    error::{KernelError, Result},
    kernel::KernelMetadata,
    traits::{BatchKernel, Kernel},
};
use aegisgraph_graph::cycles::{CycleDetection, CycleDetectionResult};
use aegisgraph_graph::shell::{ShellChainDetection, ShellChainResult};
use aegisgraph_graph::types::{Transaction, TransactionGraph};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Full fraud-detection kernel: detectors, ring assembly and scoring.
#[derive(Debug, Clone)]
pub struct FraudDetector {
    metadata: KernelMetadata,
}

impl Default for FraudDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FraudDetector {
    /// Create a new fraud-detection kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch("compliance/fraud-detection", Domain::Compliance)
                .with_description("Cycle, smurfing and shell-chain detection with scoring")
                .with_throughput(20_000)
                .with_latency_us(5_000.0),
        }
    }

    /// Run detection sequentially.
    pub fn compute(
        graph: &TransactionGraph,
        transactions: &[Transaction],
        config: &DetectionConfig,
    ) -> Result<FraudDetection> {
        detect_fraud(graph, transactions, config)
    }
}

/// Run every detector in order and score the result.
pub fn detect_fraud(
    graph: &TransactionGraph,
    transactions: &[Transaction],
    config: &DetectionConfig,
) -> Result<FraudDetection> {
    config.validate()?;
    log_start(graph);

    let cycles = run_cycles(graph, config);
    let smurfing = run_smurfing(transactions, graph.node_count(), config);
    let shells = run_shells(graph, config);

    assemble(graph, &cycles, &smurfing, &shells, config)
}

/// Run the detectors as blocking tasks and merge them in fixed order.
///
/// With `timeout` set, the detectors must all finish within it or the call
/// fails with [`KernelError::Timeout`]. Tasks already started are not
/// interrupted; their results are discarded.
pub async fn detect_fraud_concurrent(
    graph: Arc<TransactionGraph>,
    transactions: Arc<[Transaction]>,
    config: DetectionConfig,
    timeout: Option<Duration>,
) -> Result<FraudDetection> {
    config.validate()?;
    log_start(&graph);

    let config = Arc::new(config);
    let node_count = graph.node_count();

    let cycle_task = {
        let (graph, config) = (Arc::clone(&graph), Arc::clone(&config));
        tokio::task::spawn_blocking(move || run_cycles(&graph, &config))
    };
    let smurf_task = {
        let config = Arc::clone(&config);
        tokio::task::spawn_blocking(move || run_smurfing(&transactions, node_count, &config))
    };
    let shell_task = {
        let (graph, config) = (Arc::clone(&graph), Arc::clone(&config));
        tokio::task::spawn_blocking(move || run_shells(&graph, &config))
    };

    let joined = async { tokio::try_join!(cycle_task, smurf_task, shell_task) };
    let outcome = match timeout {
        Some(limit) => tokio::time::timeout(limit, joined).await.map_err(|_| {
            tracing::warn!(timeout_ms = limit.as_millis() as u64, "Detectors timed out");
            KernelError::Timeout(limit)
        })?,
        None => joined.await,
    };
    let (cycles, smurfing, shells) =
        outcome.map_err(|e| KernelError::internal(format!("Detector task failed: {}", e)))?;

    assemble(&graph, &cycles, &smurfing, &shells, &config)
}

fn log_start(graph: &TransactionGraph) {
    tracing::info!(
        accounts = graph.node_count(),
        transactions = graph.edge_count(),
        "Analyzing transaction graph for fraud patterns"
    );
}

fn run_cycles(graph: &TransactionGraph, config: &DetectionConfig) -> CycleDetectionResult {
    let start = Instant::now();
    let result = CycleDetection::compute(graph, &config.cycles);
    tracing::info!(
        cycles = result.cycles.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Cycle detection finished"
    );
    result
}

fn run_smurfing(
    transactions: &[Transaction],
    node_count: usize,
    config: &DetectionConfig,
) -> SmurfingResult {
    let start = Instant::now();
    let result = SmurfingDetection::compute(transactions, node_count, &config.smurfing);
    tracing::info!(
        rings = result.rings.len(),
        fan_in = result.fan_in,
        fan_out = result.fan_out,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Smurfing detection finished"
    );
    result
}

fn run_shells(graph: &TransactionGraph, config: &DetectionConfig) -> ShellChainResult {
    let start = Instant::now();
    let result = ShellChainDetection::compute(graph, &config.shell);
    tracing::info!(
        chains = result.chains.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Shell chain detection finished"
    );
    result
}

fn assemble(
    graph: &TransactionGraph,
    cycles: &CycleDetectionResult,
    smurfing: &SmurfingResult,
    shells: &ShellChainResult,
    config: &DetectionConfig,
) -> Result<FraudDetection> {
    let start = Instant::now();

    let mut assembler = RingAssembler::new(&config.scoring);
    assembler.add_cycles(&cycles.cycles);
    assembler.add_smurf_rings(&smurfing.rings);
    assembler.add_shell_chains(&shells.chains);
    let (fraud_rings, ledger) = assembler.finish();

    let suspicious_accounts = SuspicionScoring::compute(graph, &ledger, &config.scoring)?;

    tracing::info!(
        rings = fraud_rings.len(),
        flagged = suspicious_accounts.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Scoring finished"
    );

    Ok(FraudDetection {
        suspicious_accounts,
        fraud_rings,
    })
}

impl Kernel for FraudDetector {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

#[async_trait]
impl BatchKernel<FraudDetectionInput, FraudDetectionOutput> for FraudDetector {
    async fn execute(&self, input: FraudDetectionInput) -> Result<FraudDetectionOutput> {
        let start = Instant::now();
        let result = Self::compute(&input.graph, &input.transactions, &input.config)?;
        Ok(FraudDetectionOutput {
            result,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }

    fn validate_input(&self, input: &FraudDetectionInput) -> Result<()> {
        input.config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PatternKind, RingId};
    use aegisgraph_graph::builder::build_graph;
    use chrono::{Duration as ChronoDuration, NaiveDate};

    fn ledger() -> Vec<Transaction> {
        let base = NaiveDate::from_ymd_opt(2026, 5, 4)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut rows = vec![
            ("A", "B", 1200.0),
            ("B", "C", 1100.0),
            ("C", "A", 1000.0),
            ("S", "M1", 700.0),
            ("M1", "M2", 690.0),
            ("M2", "D", 680.0),
        ];
        let senders: Vec<String> = (0..10).map(|i| format!("F{}", i)).collect();
        rows.extend(senders.iter().map(|s| (s.as_str(), "HUB", 90.0)));

        rows.iter()
            .enumerate()
            .map(|(i, (from, to, amount))| {
                Transaction::new(
                    format!("T{}", i),
                    *from,
                    *to,
                    *amount,
                    base + ChronoDuration::hours(i as i64),
                )
            })
            .collect()
    }

    #[test]
    fn test_fraud_detector_metadata() {
        let kernel = FraudDetector::new();
        assert_eq!(kernel.metadata().id, "compliance/fraud-detection");
        assert_eq!(kernel.metadata().domain, Domain::Compliance);
    }

    #[test]
    fn test_all_patterns_detected() {
        let txs = ledger();
        let graph = build_graph(&txs);
        let result = detect_fraud(&graph, &txs, &DetectionConfig::default()).unwrap();

        let kinds: Vec<PatternKind> = result.fraud_rings.iter().map(|r| r.pattern_type).collect();
        assert_eq!(kinds[0], PatternKind::Cycle);
        assert!(kinds.contains(&PatternKind::FanInSmurfing));
        assert!(kinds.contains(&PatternKind::ShellNetwork));
        assert_eq!(result.fraud_rings[0].ring_id, RingId::new(1));

        for (i, ring) in result.fraud_rings.iter().enumerate() {
            assert_eq!(ring.ring_id, RingId::new(i as u32 + 1));
            assert!(!ring.member_accounts.is_empty());
        }

        let hub = result
            .suspicious_accounts
            .iter()
            .find(|a| a.account_id == "HUB")
            .unwrap();
        assert_eq!(hub.detected_patterns, vec![PatternKind::SmurfAggregator]);
    }

    #[test]
    fn test_empty_input() {
        let graph = build_graph(&[]);
        let result = detect_fraud(&graph, &[], &DetectionConfig::default()).unwrap();
        assert!(result.fraud_rings.is_empty());
        assert!(result.suspicious_accounts.is_empty());
    }

    #[test]
    fn test_extreme_timestamps_do_not_panic() {
        let txs: Vec<Transaction> = (0..10)
            .map(|i| {
                Transaction::new(
                    format!("T{}", i),
                    format!("S{}", i),
                    "X",
                    100.0,
                    chrono::NaiveDateTime::MAX,
                )
            })
            .collect();
        let graph = build_graph(&txs);
        let result = detect_fraud(&graph, &txs, &DetectionConfig::default()).unwrap();
        assert_eq!(result.fraud_rings.len(), 1);
        assert_eq!(result.fraud_rings[0].pattern_type, PatternKind::FanInSmurfing);
    }

    #[test]
    fn test_deterministic() {
        let txs = ledger();
        let graph = build_graph(&txs);
        let config = DetectionConfig::default();
        let first = detect_fraud(&graph, &txs, &config).unwrap();
        let second = detect_fraud(&build_graph(&txs), &txs, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = DetectionConfig::default();
        config.smurfing.threshold = 0;
        let txs = ledger();
        let err = detect_fraud(&build_graph(&txs), &txs, &config).unwrap_err();
        assert!(matches!(err, KernelError::ConfigError(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_matches_sequential() {
        let txs = ledger();
        let graph = Arc::new(build_graph(&txs));
        let config = DetectionConfig::default();

        let sequential = detect_fraud(&graph, &txs, &config).unwrap();
        let concurrent = detect_fraud_concurrent(
            Arc::clone(&graph),
            txs.into(),
            config,
            Some(Duration::from_secs(30)),
        )
        .await
        .unwrap();

        assert_eq!(sequential, concurrent);
    }

    #[tokio::test]
    async fn test_batch_execute() {
        let txs = ledger();
        let graph = Arc::new(build_graph(&txs));
        let output = FraudDetector::new()
            .execute(FraudDetectionInput::new(graph, txs.into()))
            .await
            .unwrap();
        assert!(!output.result.fraud_rings.is_empty());
    }
}
