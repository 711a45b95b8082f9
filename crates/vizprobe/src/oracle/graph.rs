//! Breadth-first search oracle.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};

use super::Stepper;

/// Adjacency lists keyed by node id, as the BFS page exposes them.
///
/// Neighbor order is the list order, which is also the order BFS enqueues.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Graph {
    adjacency: BTreeMap<String, Vec<String>>,
}

impl Graph {
    /// Empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an undirected edge
    #[must_use]
    pub fn with_edge(mut self, a: &str, b: &str) -> Self {
        self.link(a, b);
        self.link(b, a);
        self
    }

    fn link(&mut self, from: &str, to: &str) {
        let list = self.adjacency.entry(from.to_string()).or_default();
        if !list.iter().any(|n| n == to) {
            list.push(to.to_string());
        }
    }

    /// Neighbors of `node`; empty for unknown nodes
    #[must_use]
    pub fn neighbors(&self, node: &str) -> &[String] {
        self.adjacency.get(node).map_or(&[][..], Vec::as_slice)
    }

    /// Node ids, sorted
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    /// Number of nodes with an adjacency entry
    #[must_use]
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Whether the graph has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}

/// One visible BFS step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BfsAction {
    /// `node` is dequeued and marked visited
    Visit {
        /// Node id
        node: String,
    },
    /// `node` is discovered from `from` and enqueued
    Enqueue {
        /// Node id
        node: String,
        /// Discovering node
        from: String,
    },
}

/// BFS as a state machine: each visit is followed by the enqueues it causes
#[derive(Debug, Clone)]
pub struct BfsStepper {
    graph: Graph,
    queue: VecDeque<String>,
    discovered: HashSet<String>,
    pending: VecDeque<BfsAction>,
    visited: Vec<String>,
}

impl BfsStepper {
    /// Start a search from `start`
    #[must_use]
    pub fn new(graph: Graph, start: &str) -> Self {
        Self {
            graph,
            queue: VecDeque::from([start.to_string()]),
            discovered: HashSet::from([start.to_string()]),
            pending: VecDeque::new(),
            visited: Vec::new(),
        }
    }

    /// Nodes visited so far, in order
    #[must_use]
    pub fn visit_order(&self) -> &[String] {
        &self.visited
    }

    /// Nodes waiting in the queue
    #[must_use]
    pub fn queued(&self) -> Vec<&str> {
        self.queue.iter().map(String::as_str).collect()
    }
}

impl Stepper for BfsStepper {
    type Action = BfsAction;

    const NAME: &'static str = "breadth-first search";

    fn step(&mut self) -> Option<BfsAction> {
        if let Some(action) = self.pending.pop_front() {
            return Some(action);
        }
        let node = self.queue.pop_front()?;
        for next in self.graph.neighbors(&node) {
            if self.discovered.insert(next.clone()) {
                self.queue.push_back(next.clone());
                self.pending.push_back(BfsAction::Enqueue {
                    node: next.clone(),
                    from: node.clone(),
                });
            }
        }
        self.visited.push(node.clone());
        Some(BfsAction::Visit { node })
    }

    fn is_done(&self) -> bool {
        self.pending.is_empty() && self.queue.is_empty()
    }
}

/// BFS visit order from `start`
#[must_use]
pub fn bfs_order(graph: &Graph, start: &str) -> Vec<String> {
    let mut stepper = BfsStepper::new(graph.clone(), start);
    while stepper.step().is_some() {}
    stepper.visited
}
