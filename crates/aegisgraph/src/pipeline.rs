//! End-to-end analysis pipeline: graph build, fraud detection, report.

use crate::report::{build_report, AnalysisReport};
use aegisgraph_compliance::engine::{detect_fraud, detect_fraud_concurrent};
use aegisgraph_compliance::types::FraudDetection;
use aegisgraph_core::config::EngineConfig;
use aegisgraph_core::error::{KernelError, Result};
use aegisgraph_graph::builder::build_graph;
use aegisgraph_graph::types::{Transaction, TransactionGraph};
use std::sync::Arc;
use std::time::Instant;

/// Runs one analysis per call. Holds no state between calls.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: EngineConfig,
}

impl Analyzer {
    /// Create an analyzer.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze a ledger on the calling thread.
    pub fn analyze(&self, transactions: &[Transaction]) -> Result<AnalysisReport> {
        let started = Instant::now();

        let phase = Instant::now();
        let graph = build_graph(transactions);
        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            elapsed_ms = phase.elapsed().as_millis() as u64,
            "Graph build complete"
        );

        let phase = Instant::now();
        let detection = detect_fraud(&graph, transactions, &self.config.detection)?;
        tracing::info!(
            suspicious = detection.suspicious_accounts.len(),
            rings = detection.fraud_rings.len(),
            elapsed_ms = phase.elapsed().as_millis() as u64,
            "Fraud detection complete"
        );

        Ok(self.finish(detection, &graph, started))
    }

    /// Analyze a ledger from async code.
    ///
    /// With `runtime.concurrent_detectors` set, the detectors run in parallel
    /// on the blocking pool under `runtime.detector_timeout`. Otherwise the
    /// sequential pipeline runs on one blocking task under the same timeout.
    /// Output is identical either way.
    pub async fn analyze_async(&self, transactions: Vec<Transaction>) -> Result<AnalysisReport> {
        self.config.runtime.validate()?;
        let runtime = &self.config.runtime;

        if !runtime.concurrent_detectors {
            let analyzer = self.clone();
            let task = tokio::task::spawn_blocking(move || analyzer.analyze(&transactions));
            return match runtime.detector_timeout {
                Some(limit) => tokio::time::timeout(limit, task)
                    .await
                    .map_err(|_| KernelError::Timeout(limit))?,
                None => task.await,
            }
            .map_err(|e| KernelError::internal(format!("Analysis task failed: {}", e)))?;
        }

        let started = Instant::now();
        let transactions: Arc<[Transaction]> = transactions.into();

        let phase = Instant::now();
        let graph = Arc::new(build_graph(&transactions));
        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            elapsed_ms = phase.elapsed().as_millis() as u64,
            "Graph build complete"
        );

        let phase = Instant::now();
        let detection = detect_fraud_concurrent(
            Arc::clone(&graph),
            transactions,
            self.config.detection.clone(),
            runtime.detector_timeout,
        )
        .await?;
        tracing::info!(
            suspicious = detection.suspicious_accounts.len(),
            rings = detection.fraud_rings.len(),
            elapsed_ms = phase.elapsed().as_millis() as u64,
            "Fraud detection complete"
        );

        Ok(self.finish(detection, &graph, started))
    }

    fn finish(
        &self,
        detection: FraudDetection,
        graph: &TransactionGraph,
        started: Instant,
    ) -> AnalysisReport {
        let report = build_report(detection, graph, started.elapsed());
        tracing::info!(
            accounts = report.summary.total_accounts_analyzed,
            flagged = report.summary.suspicious_accounts_flagged,
            rings = report.summary.fraud_rings_detected,
            seconds = report.summary.processing_time_seconds,
            "Analysis complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegisgraph_core::config::RuntimeConfig;
    use std::time::Duration;

    fn ledger() -> Vec<Transaction> {
        [("A", "B"), ("B", "C"), ("C", "A"), ("C", "D")]
            .iter()
            .enumerate()
            .map(|(i, (from, to))| {
                Transaction::parse(format!("T{}", i), *from, *to, 500.0, "2026-06-01 12:00")
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_analyze() {
        let report = Analyzer::new(EngineConfig::testing()).analyze(&ledger()).unwrap();
        assert_eq!(report.summary.total_accounts_analyzed, 4);
        assert!(report.summary.fraud_rings_detected >= 1);
        assert_eq!(report.fraud_rings[0].ring_id.to_string(), "RING-001");
    }

    #[test]
    fn test_analyze_empty() {
        let report = Analyzer::default().analyze(&[]).unwrap();
        assert_eq!(report.summary.total_accounts_analyzed, 0);
        assert!(report.suspicious_accounts.is_empty());
        assert!(report.fraud_rings.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_async_paths_agree() {
        let sequential = Analyzer::new(EngineConfig::testing())
            .analyze_async(ledger())
            .await
            .unwrap();

        let concurrent_config = EngineConfig::testing().with_runtime(RuntimeConfig {
            concurrent_detectors: true,
            detector_timeout: Some(Duration::from_secs(30)),
        });
        let concurrent = Analyzer::new(concurrent_config)
            .analyze_async(ledger())
            .await
            .unwrap();

        assert_eq!(sequential.suspicious_accounts, concurrent.suspicious_accounts);
        assert_eq!(sequential.fraud_rings, concurrent.fraud_rings);
    }
}
