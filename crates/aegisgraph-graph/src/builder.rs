//! Transaction graph construction.

use crate::messages::{GraphBuildInput, GraphBuildOutput};
use crate::types::{Transaction, TransactionGraph};
use aegisgraph_core::{
    domain::Domain,
    error::Result,
    kernel::KernelMetadata,
    traits::{BatchKernel, Kernel},
};
use async_trait::async_trait;
use std::time::Instant;

/// Builds the directed multigraph from a ledger.
///
/// One edge per row, in row order. Nodes are created on first reference,
/// sender before receiver. Self-transfers become self-loops.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    metadata: KernelMetadata,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Create a new graph builder kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch("graph/build", Domain::GraphAnalytics)
                .with_description("Directed transaction multigraph construction")
                .with_throughput(1_000_000)
                .with_latency_us(50.0),
        }
    }

    /// Build the graph.
    pub fn compute(transactions: &[Transaction]) -> TransactionGraph {
        let mut graph = TransactionGraph::with_capacity(transactions.len());
        for tx in transactions {
            graph.push_transaction(tx);
        }

        tracing::debug!(
            accounts = graph.node_count(),
            transactions = graph.edge_count(),
            "Built transaction graph"
        );
        graph
    }
}

/// Build a transaction graph from ledger rows.
pub fn build_graph(transactions: &[Transaction]) -> TransactionGraph {
    GraphBuilder::compute(transactions)
}

impl Kernel for GraphBuilder {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

#[async_trait]
impl BatchKernel<GraphBuildInput, GraphBuildOutput> for GraphBuilder {
    async fn execute(&self, input: GraphBuildInput) -> Result<GraphBuildOutput> {
        let start = Instant::now();
        let graph = Self::compute(&input.transactions);
        Ok(GraphBuildOutput {
            graph,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str, from: &str, to: &str, amount: f64) -> Transaction {
        Transaction::parse(id, from, to, amount, "2026-01-01 12:00:00").unwrap()
    }

    #[test]
    fn test_graph_builder_metadata() {
        let kernel = GraphBuilder::new();
        assert_eq!(kernel.metadata().id, "graph/build");
        assert_eq!(kernel.metadata().domain, Domain::GraphAnalytics);
    }

    #[test]
    fn test_degrees_sum_to_total() {
        let txs = vec![
            tx("T1", "A", "B", 100.0),
            tx("T2", "B", "C", 50.0),
            tx("T3", "A", "B", 10.0),
            tx("T4", "C", "A", 75.0),
        ];
        let graph = build_graph(&txs);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 4);

        let in_sum: usize = graph.nodes().map(|(_, n)| n.in_degree).sum();
        let out_sum: usize = graph.nodes().map(|(_, n)| n.out_degree).sum();
        assert_eq!(in_sum, txs.len());
        assert_eq!(out_sum, txs.len());

        for (_, node) in graph.nodes() {
            assert_eq!(node.total_transactions, node.in_degree + node.out_degree);
        }

        let a = graph.get("A").unwrap();
        assert_eq!(a.out_degree, 2);
        assert_eq!(a.in_degree, 1);
    }

    #[test]
    fn test_node_order_is_first_reference() {
        let txs = vec![tx("T1", "X", "Y", 1.0), tx("T2", "Z", "X", 1.0)];
        let graph = build_graph(&txs);
        let order: Vec<&str> = graph.nodes().map(|(_, n)| n.account_id.as_str()).collect();
        assert_eq!(order, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_self_loop_counts_twice() {
        let graph = build_graph(&[tx("T1", "A", "A", 5.0)]);
        let a = graph.get("A").unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(a.in_degree, 1);
        assert_eq!(a.out_degree, 1);
        assert_eq!(a.total_transactions, 2);
    }

    #[test]
    fn test_empty_ledger() {
        let graph = build_graph(&[]);
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[tokio::test]
    async fn test_batch_execute() {
        let kernel = GraphBuilder::new();
        let output = kernel
            .execute(GraphBuildInput::new(vec![tx("T1", "A", "B", 1.0)]))
            .await
            .unwrap();
        assert_eq!(output.graph.node_count(), 2);
    }
}
