//! Circular fund routing detection.
//!
//! A bounded depth-first search reports simple directed cycles of 3 to 5
//! accounts. The search is a sampled heuristic rather than an enumeration:
//! - only the first `cap * start_multiplier` nodes are used as roots
//! - a node that has served as a root is never entered again
//! - each node expands at most `edges_per_node` outgoing edges
//! - cycles are deduplicated by their member set
//!
//! Results therefore depend on node insertion order and edge order.

use crate::messages::{CycleDetectionInput, CycleDetectionOutput};
use crate::types::{NodeId, TransactionGraph};
use aegisgraph_core::{
    config::CycleLimits,
    domain::Domain,
    error::Result,
    kernel::KernelMetadata,
    traits::{BatchKernel, Kernel},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

// ============================================================================
// Result
// ============================================================================

/// Cycles found in one search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleDetectionResult {
    /// Cycles as account ids in traversal order; the last member pays the first.
    pub cycles: Vec<Vec<String>>,
    /// Cycle cap applied to this graph.
    pub cap: usize,
    /// Root nodes searched.
    pub starts_examined: usize,
    /// True when the cap stopped the search.
    pub truncated: bool,
}

// ============================================================================
// Cycle Detection Kernel
// ============================================================================

/// Bounded cycle detection kernel.
#[derive(Debug, Clone)]
pub struct CycleDetection {
    metadata: KernelMetadata,
}

impl Default for CycleDetection {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleDetection {
    /// Create a new cycle detection kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch("graph/cycle-detection", Domain::GraphAnalytics)
                .with_description("Bounded DFS for 3-5 account fund cycles")
                .with_throughput(50_000)
                .with_latency_us(500.0),
        }
    }

    /// Find cycles of `min_length..=max_length` accounts.
    pub fn compute(graph: &TransactionGraph, limits: &CycleLimits) -> CycleDetectionResult {
        let node_count = graph.node_count();
        let cap = limits.cap_for(node_count);
        let budget = limits.start_budget(node_count, cap);

        let mut search = CycleSearch::new(graph, limits, cap);
        let mut starts_examined = 0;

        for root in 0..budget {
            if search.stopped {
                break;
            }
            if search.was_root[root] {
                continue;
            }
            search.was_root[root] = true;
            starts_examined += 1;
            search.visit(root, 0);
        }

        let truncated = search.stopped;
        if truncated {
            tracing::warn!(cap, starts_examined, "Cycle cap reached, results truncated");
        }

        CycleDetectionResult {
            cycles: search
                .cycles
                .iter()
                .map(|cycle| graph.account_ids(cycle))
                .collect(),
            cap,
            starts_examined,
            truncated,
        }
    }
}

/// Mutable DFS state shared by every root of one search.
struct CycleSearch<'g> {
    graph: &'g TransactionGraph,
    limits: &'g CycleLimits,
    cap: usize,
    was_root: Vec<bool>,
    on_path: Vec<bool>,
    path: Vec<NodeId>,
    signatures: HashSet<Vec<NodeId>>,
    cycles: Vec<Vec<NodeId>>,
    stopped: bool,
}

impl<'g> CycleSearch<'g> {
    fn new(graph: &'g TransactionGraph, limits: &'g CycleLimits, cap: usize) -> Self {
        let n = graph.node_count();
        Self {
            graph,
            limits,
            cap,
            was_root: vec![false; n],
            on_path: vec![false; n],
            path: Vec::with_capacity(limits.max_depth + 1),
            signatures: HashSet::new(),
            cycles: Vec::new(),
            stopped: false,
        }
    }

    fn visit(&mut self, node: NodeId, depth: usize) {
        if self.stopped || self.cycles.len() >= self.cap {
            self.stopped = true;
            return;
        }

        self.path.push(node);
        self.on_path[node] = true;

        let graph = self.graph;
        let outgoing = &graph.node(node).outgoing;
        if depth < self.limits.max_depth {
            for &edge_id in outgoing.iter().take(self.limits.edges_per_node) {
                if self.stopped {
                    break;
                }
                let next = graph.edge(edge_id).to;
                if self.on_path[next] {
                    self.close_cycle(next);
                } else if !self.was_root[next] {
                    self.visit(next, depth + 1);
                }
            }
        }

        self.on_path[node] = false;
        self.path.pop();
    }

    /// Record the path suffix starting at `entry` as a cycle.
    fn close_cycle(&mut self, entry: NodeId) {
        let Some(pos) = self.path.iter().position(|&n| n == entry) else {
            return;
        };
        let cycle = &self.path[pos..];
        if cycle.len() < self.limits.min_length || cycle.len() > self.limits.max_length {
            return;
        }

        let mut signature = cycle.to_vec();
        signature.sort_unstable();
        if self.signatures.insert(signature) {
            self.cycles.push(cycle.to_vec());
            if self.cycles.len() >= self.cap {
                self.stopped = true;
            }
        }
    }
}

impl Kernel for CycleDetection {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

#[async_trait]
impl BatchKernel<CycleDetectionInput, CycleDetectionOutput> for CycleDetection {
    async fn execute(&self, input: CycleDetectionInput) -> Result<CycleDetectionOutput> {
        let start = Instant::now();
        let result = Self::compute(&input.graph, &input.limits);
        Ok(CycleDetectionOutput {
            result,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }

    fn validate_input(&self, input: &CycleDetectionInput) -> Result<()> {
        input.limits.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_graph;
    use crate::types::Transaction;
    use std::sync::Arc;

    fn ledger(edges: &[(&str, &str)]) -> Vec<Transaction> {
        edges
            .iter()
            .enumerate()
            .map(|(i, (from, to))| {
                Transaction::parse(format!("T{}", i), *from, *to, 100.0, "2026-01-01 00:00:00")
                    .unwrap()
            })
            .collect()
    }

    fn detect(edges: &[(&str, &str)]) -> CycleDetectionResult {
        let graph = build_graph(&ledger(edges));
        CycleDetection::compute(&graph, &CycleLimits::default())
    }

    /// Complete tripartite layers a -> b -> c -> a; every (a, b, c) is a triangle.
    fn tripartite(layer: usize) -> Vec<(String, String)> {
        let mut edges = Vec::new();
        for (from, to) in [("a", "b"), ("b", "c"), ("c", "a")] {
            for i in 0..layer {
                for j in 0..layer {
                    edges.push((format!("{}{}", from, i), format!("{}{}", to, j)));
                }
            }
        }
        edges
    }

    fn as_refs(edges: &[(String, String)]) -> Vec<(&str, &str)> {
        edges.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect()
    }

    #[test]
    fn test_cycle_detection_metadata() {
        let kernel = CycleDetection::new();
        assert_eq!(kernel.metadata().id, "graph/cycle-detection");
        assert_eq!(kernel.metadata().domain, Domain::GraphAnalytics);
    }

    #[test]
    fn test_triangle_detected() {
        let result = detect(&[("A", "B"), ("B", "C"), ("C", "A")]);
        assert_eq!(result.cycles, vec![vec!["A", "B", "C"]]);
        assert_eq!(result.cap, 200);
        assert!(!result.truncated);
    }

    #[test]
    fn test_cycle_edges_exist() {
        let txs = ledger(&[("A", "B"), ("B", "C"), ("C", "D"), ("D", "A"), ("C", "A")]);
        let graph = build_graph(&txs);
        let result = CycleDetection::compute(&graph, &CycleLimits::default());
        assert!(!result.cycles.is_empty());

        for cycle in &result.cycles {
            for (i, from) in cycle.iter().enumerate() {
                let to = &cycle[(i + 1) % cycle.len()];
                let from_id = graph.node_id(from).unwrap();
                assert!(
                    graph.outgoing(from_id).any(|e| graph.account_id(e.to) == to),
                    "missing edge {} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_two_cycle_ignored() {
        let result = detect(&[("A", "B"), ("B", "A")]);
        assert!(result.cycles.is_empty());
    }

    #[test]
    fn test_five_cycle_detected_six_cycle_not() {
        let five = detect(&[("A", "B"), ("B", "C"), ("C", "D"), ("D", "E"), ("E", "A")]);
        assert_eq!(five.cycles.len(), 1);
        assert_eq!(five.cycles[0].len(), 5);

        let six = detect(&[
            ("A", "B"),
            ("B", "C"),
            ("C", "D"),
            ("D", "E"),
            ("E", "F"),
            ("F", "A"),
        ]);
        assert!(six.cycles.is_empty());
    }

    #[test]
    fn test_same_member_set_reported_once() {
        let result = detect(&[
            ("A", "B"),
            ("B", "C"),
            ("C", "A"),
            ("A", "C"),
            ("C", "B"),
            ("B", "A"),
        ]);
        assert_eq!(result.cycles.len(), 1);
        assert_eq!(result.cycles[0].len(), 3);
    }

    #[test]
    fn test_members_unique_within_cycle() {
        let edges = tripartite(3);
        let result = detect(&as_refs(&edges));
        assert_eq!(result.cycles.len(), 27);
        for cycle in &result.cycles {
            let unique: HashSet<&String> = cycle.iter().collect();
            assert_eq!(unique.len(), cycle.len());
        }
    }

    #[test]
    fn test_cap_on_small_graph() {
        // 18 nodes, 216 triangles; cap is the 200 floor.
        let edges = tripartite(6);
        let result = detect(&as_refs(&edges));
        assert_eq!(result.cap, 200);
        assert_eq!(result.cycles.len(), 200);
        assert!(result.truncated);

        let signatures: HashSet<Vec<String>> = result
            .cycles
            .iter()
            .map(|c| {
                let mut s = c.clone();
                s.sort();
                s
            })
            .collect();
        assert_eq!(signatures.len(), 200);
    }

    #[test]
    fn test_cap_never_exceeds_ceiling() {
        // 13^3 = 2197 triangles plus filler pairs pushing the node count past 2000.
        let mut edges = tripartite(13);
        for i in 0..1000 {
            edges.push((format!("x{}", i), format!("y{}", i)));
        }
        let graph = build_graph(&ledger(&as_refs(&edges)));
        assert!(graph.node_count() > 2000);

        let result = CycleDetection::compute(&graph, &CycleLimits::default());
        assert_eq!(result.cap, 2000);
        assert_eq!(result.cycles.len(), 2000);
        assert!(result.cycles.iter().all(|c| (3..=5).contains(&c.len())));
    }

    #[test]
    fn test_empty_graph() {
        let result = detect(&[]);
        assert!(result.cycles.is_empty());
        assert_eq!(result.starts_examined, 0);
    }

    /// A has 20 dead-end payees before its edge into the triangle A -> B -> C -> A.
    fn triangle_behind_fanout() -> TransactionGraph {
        let leaves: Vec<String> = (0..20).map(|i| format!("L{}", i)).collect();
        let mut edges: Vec<(&str, &str)> = leaves.iter().map(|l| ("A", l.as_str())).collect();
        edges.extend([("A", "B"), ("B", "C"), ("C", "A")]);
        build_graph(&ledger(&edges))
    }

    #[test]
    fn test_edges_past_budget_not_followed() {
        let graph = triangle_behind_fanout();
        assert_eq!(graph.get("A").unwrap().out_degree, 21);

        let missed = CycleDetection::compute(&graph, &CycleLimits::default());
        assert!(missed.cycles.is_empty());

        let limits = CycleLimits {
            edges_per_node: 21,
            ..CycleLimits::default()
        };
        let found = CycleDetection::compute(&graph, &limits);
        assert_eq!(found.cycles, vec![vec!["A", "B", "C"]]);
    }

    #[test]
    fn test_cycles_through_earlier_root_found_by_that_root() {
        // R reaches the triangle only through A, which was searched first.
        let result = detect(&[("A", "B"), ("B", "C"), ("C", "A"), ("R", "A"), ("C", "R")]);
        assert_eq!(result.starts_examined, 4);
        // [A, B, C] from root A; [A, B, C, R] also closes at A during A's search.
        assert_eq!(
            result.cycles,
            vec![vec!["A", "B", "C"], vec!["A", "B", "C", "R"]]
        );
    }

    #[test]
    fn test_root_budget() {
        // One root allowed: only X is searched and the triangle is never reached.
        let limits = CycleLimits {
            min_cycles: 1,
            max_cycles: 1,
            start_multiplier: 1,
            ..CycleLimits::default()
        };
        let graph = build_graph(&ledger(&[("X", "Y"), ("A", "B"), ("B", "C"), ("C", "A")]));
        let result = CycleDetection::compute(&graph, &limits);
        assert_eq!(result.starts_examined, 1);
        assert!(result.cycles.is_empty());
        assert!(!result.truncated);
    }

    #[test]
    fn test_zero_cap_is_not_truncation() {
        let limits = CycleLimits {
            min_cycles: 0,
            max_cycles: 0,
            ..CycleLimits::default()
        };
        let result = CycleDetection::compute(&build_graph(&[]), &limits);
        assert_eq!(result.cap, 0);
        assert!(!result.truncated);
    }

    #[tokio::test]
    async fn test_batch_execute() {
        let graph = Arc::new(build_graph(&ledger(&[("A", "B"), ("B", "C"), ("C", "A")])));
        let kernel = CycleDetection::new();
        let output = kernel.execute(CycleDetectionInput::new(graph)).await.unwrap();
        assert_eq!(output.result.cycles.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_limits_rejected() {
        let graph = Arc::new(build_graph(&[]));
        let limits = CycleLimits {
            min_length: 6,
            ..CycleLimits::default()
        };
        let kernel = CycleDetection::new();
        let err = kernel
            .execute_with_timeout(
                CycleDetectionInput::new(graph).with_limits(limits),
                std::time::Duration::from_secs(5),
            )
            .await;
        assert!(err.is_err());
    }
}
