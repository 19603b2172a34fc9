//! Layered shell-account chain detection.
//!
//! Breadth-first search from the first `max_start_nodes` accounts looking for
//! short directed paths whose interior accounts are all low-activity. Each
//! root keeps its own visited set, so a node is reached from a root at most
//! once, along its first-discovered path.

use crate::messages::{ShellChainInput, ShellChainOutput};
use crate::types::{NodeId, TransactionGraph};
use aegisgraph_core::{
    config::ShellLimits,
    domain::Domain,
    error::Result,
    kernel::KernelMetadata,
    traits::{BatchKernel, Kernel},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::time::Instant;

/// A path through low-activity intermediaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellChain {
    /// Full path, source first.
    pub members: Vec<String>,
    /// Interior accounts (members without the endpoints).
    pub intermediates: Vec<String>,
}

/// Shell chains found in one search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShellChainResult {
    /// Chains in discovery order.
    pub chains: Vec<ShellChain>,
    /// Chain cap applied to this graph.
    pub cap: usize,
    /// Root nodes searched.
    pub starts_examined: usize,
    /// True when the cap stopped the search.
    pub truncated: bool,
}

/// Shell-chain detection kernel.
#[derive(Debug, Clone)]
pub struct ShellChainDetection {
    metadata: KernelMetadata,
}

impl Default for ShellChainDetection {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellChainDetection {
    /// Create a new shell-chain detection kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch("graph/shell-chains", Domain::GraphAnalytics)
                .with_description("BFS for layered chains through low-activity accounts")
                .with_throughput(50_000)
                .with_latency_us(500.0),
        }
    }

    /// Find shell chains.
    ///
    /// A path is extended only while it has fewer than `max_depth` accounts,
    /// so with the default bounds no chain is longer than four accounts even
    /// though up to `max_length` would qualify.
    pub fn compute(graph: &TransactionGraph, limits: &ShellLimits) -> ShellChainResult {
        let node_count = graph.node_count();
        let cap = limits.cap_for(node_count);
        let low_activity: Vec<bool> = graph
            .nodes()
            .map(|(_, n)| n.total_transactions <= limits.low_activity_max_transactions)
            .collect();

        let mut signatures: HashSet<Vec<NodeId>> = HashSet::new();
        let mut chains: Vec<Vec<NodeId>> = Vec::new();
        let mut starts_examined = 0;
        let mut truncated = false;

        for root in 0..node_count.min(limits.max_start_nodes) {
            if chains.len() >= cap {
                truncated = true;
                break;
            }
            starts_examined += 1;

            let mut queue: VecDeque<(NodeId, Vec<NodeId>, usize)> = VecDeque::new();
            queue.push_back((root, vec![root], 0));
            let mut visited: HashSet<NodeId> = HashSet::from([root]);

            while let Some((node, path, depth)) = queue.pop_front() {
                if chains.len() >= cap {
                    truncated = true;
                    break;
                }
                if depth >= limits.max_depth {
                    continue;
                }

                for edge in graph.outgoing(node).take(limits.edges_per_node) {
                    let next = edge.to;
                    if !visited.insert(next) {
                        continue;
                    }

                    let mut extended = path.clone();
                    extended.push(next);

                    if (limits.min_length..=limits.max_length).contains(&extended.len()) {
                        let interior = &extended[1..extended.len() - 1];
                        if interior.iter().all(|&id| low_activity[id])
                            && signatures.insert(extended.clone())
                        {
                            chains.push(extended.clone());
                            if chains.len() >= cap {
                                truncated = true;
                                break;
                            }
                        }
                    }

                    if extended.len() < limits.max_depth {
                        queue.push_back((next, extended, depth + 1));
                    }
                }
            }
        }

        if truncated {
            tracing::warn!(cap, starts_examined, "Shell chain cap reached, results truncated");
        }

        ShellChainResult {
            chains: chains
                .iter()
                .map(|path| ShellChain {
                    members: graph.account_ids(path),
                    intermediates: graph.account_ids(&path[1..path.len() - 1]),
                })
                .collect(),
            cap,
            starts_examined,
            truncated,
        }
    }
}

impl Kernel for ShellChainDetection {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

#[async_trait]
impl BatchKernel<ShellChainInput, ShellChainOutput> for ShellChainDetection {
    async fn execute(&self, input: ShellChainInput) -> Result<ShellChainOutput> {
        let start = Instant::now();
        let result = Self::compute(&input.graph, &input.limits);
        Ok(ShellChainOutput {
            result,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }

    fn validate_input(&self, input: &ShellChainInput) -> Result<()> {
        input.limits.validate()
    }
}
