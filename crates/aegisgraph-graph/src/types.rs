//! Transaction graph types.
//!
//! The graph is an arena: edges live in one vector and each account node holds
//! the indices of its outgoing and incoming edges, so an edge is stored once
//! and shared by both endpoints.

use aegisgraph_core::error::{KernelError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Index of an account node within a [`TransactionGraph`].
pub type NodeId = usize;

/// Index of an edge within a [`TransactionGraph`].
pub type EdgeId = usize;

// ============================================================================
// Transaction
// ============================================================================

/// A single ledger row. Never mutated once parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction identifier.
    pub transaction_id: String,
    /// Paying account.
    pub sender_id: String,
    /// Receiving account.
    pub receiver_id: String,
    /// Amount; negative values are not rejected.
    pub amount: f64,
    /// Booking time, normalized to UTC.
    pub timestamp: NaiveDateTime,
}

impl Transaction {
    /// Create a transaction.
    pub fn new(
        transaction_id: impl Into<String>,
        sender_id: impl Into<String>,
        receiver_id: impl Into<String>,
        amount: f64,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
            amount,
            timestamp,
        }
    }

    /// Create a transaction from a textual timestamp.
    pub fn parse(
        transaction_id: impl Into<String>,
        sender_id: impl Into<String>,
        receiver_id: impl Into<String>,
        amount: f64,
        timestamp: &str,
    ) -> Result<Self> {
        Ok(Self::new(
            transaction_id,
            sender_id,
            receiver_id,
            amount,
            parse_timestamp(timestamp)?,
        ))
    }
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse a ledger timestamp.
///
/// Accepts RFC 3339 (converted to UTC), `YYYY-MM-DD HH:MM[:SS[.fff]]` with a
/// space or `T` separator, `YYYY/MM/DD HH:MM:SS` and a bare `YYYY-MM-DD`.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| KernelError::validation(format!("Unparseable timestamp: {:?}", raw)))
}

// ============================================================================
// Graph
// ============================================================================

/// One edge per transaction row; parallel edges are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Originating transaction.
    pub transaction_id: String,
    /// Sender node.
    pub from: NodeId,
    /// Receiver node.
    pub to: NodeId,
    /// Amount.
    pub amount: f64,
    /// Booking time.
    pub timestamp: NaiveDateTime,
}

/// An account and the edges touching it, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountNode {
    /// Account identifier.
    pub account_id: String,
    /// Outgoing edge indices.
    pub outgoing: Vec<EdgeId>,
    /// Incoming edge indices.
    pub incoming: Vec<EdgeId>,
    /// `in_degree + out_degree`, counted per edge.
    pub total_transactions: usize,
    /// Number of incoming edges.
    pub in_degree: usize,
    /// Number of outgoing edges.
    pub out_degree: usize,
}

impl AccountNode {
    fn new(account_id: String) -> Self {
        Self {
            account_id,
            outgoing: Vec::new(),
            incoming: Vec::new(),
            total_transactions: 0,
            in_degree: 0,
            out_degree: 0,
        }
    }
}

/// Directed transaction multigraph keyed by account.
///
/// Nodes are kept in first-reference order; the detectors' sampling bounds
/// ("first N nodes") are defined against this order.
#[derive(Debug, Clone, Default)]
pub struct TransactionGraph {
    nodes: Vec<AccountNode>,
    index: HashMap<String, NodeId>,
    edges: Vec<Edge>,
}

impl TransactionGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with room for `transactions` edges.
    #[must_use]
    pub fn with_capacity(transactions: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(transactions / 2),
            index: HashMap::with_capacity(transactions / 2),
            edges: Vec::with_capacity(transactions),
        }
    }

    /// Number of accounts.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges (transactions).
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// True when the graph has no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node by index.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this graph.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &AccountNode {
        &self.nodes[id]
    }

    /// Index of an account, if present.
    #[must_use]
    pub fn node_id(&self, account_id: &str) -> Option<NodeId> {
        self.index.get(account_id).copied()
    }

    /// Node for an account, if present.
    #[must_use]
    pub fn get(&self, account_id: &str) -> Option<&AccountNode> {
        self.node_id(account_id).map(|id| &self.nodes[id])
    }

    /// Account identifier of a node.
    #[must_use]
    pub fn account_id(&self, id: NodeId) -> &str {
        &self.nodes[id].account_id
    }

    /// Account identifiers for a sequence of nodes.
    #[must_use]
    pub fn account_ids(&self, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&id| self.nodes[id].account_id.clone()).collect()
    }

    /// Nodes in first-reference order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &AccountNode)> {
        self.nodes.iter().enumerate()
    }

    /// All edges in transaction order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edge by index.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    /// Outgoing edges of a node, in insertion order.
    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.nodes[id].outgoing.iter().map(move |&e| &self.edges[e])
    }

    /// Incoming edges of a node, in insertion order.
    pub fn incoming(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.nodes[id].incoming.iter().map(move |&e| &self.edges[e])
    }

    /// Distinct accounts that sent to or received from `id`.
    #[must_use]
    pub fn counterparties(&self, id: NodeId) -> HashSet<NodeId> {
        self.incoming(id)
            .map(|e| e.from)
            .chain(self.outgoing(id).map(|e| e.to))
            .collect()
    }

    /// Mean outgoing amount; zero for accounts that never send.
    #[must_use]
    pub fn mean_outgoing_amount(&self, id: NodeId) -> f64 {
        let node = &self.nodes[id];
        let total: f64 = self.outgoing(id).map(|e| e.amount).sum();
        total / node.outgoing.len().max(1) as f64
    }

    /// Look up or create the node for an account.
    pub(crate) fn node_or_insert(&mut self, account_id: &str) -> NodeId {
        if let Some(&id) = self.index.get(account_id) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(AccountNode::new(account_id.to_string()));
        self.index.insert(account_id.to_string(), id);
        id
    }

    /// Append a transaction as an edge and update both endpoints.
    pub(crate) fn push_transaction(&mut self, tx: &Transaction) -> EdgeId {
        let from = self.node_or_insert(&tx.sender_id);
        let to = self.node_or_insert(&tx.receiver_id);

        let edge_id = self.edges.len();
        self.edges.push(Edge {
            transaction_id: tx.transaction_id.clone(),
            from,
            to,
            amount: tx.amount,
            timestamp: tx.timestamp,
        });

        let sender = &mut self.nodes[from];
        sender.outgoing.push(edge_id);
        sender.out_degree += 1;
        sender.total_transactions += 1;

        let receiver = &mut self.nodes[to];
        receiver.incoming.push(edge_id);
        receiver.in_degree += 1;
        receiver.total_transactions += 1;

        edge_id
    }
}
