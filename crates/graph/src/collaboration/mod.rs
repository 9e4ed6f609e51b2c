//! Institution collaboration graph
//!
//! Nodes are canonical institutions, edge weights count the papers two
//! institutions share. Edges live in a directed `petgraph::Graph`; an
//! undirected graph stores one edge per unordered pair and every accessor
//! reads it in both directions.

mod builder;

pub use builder::CollaborationGraphBuilder;

use affilnet_common::config::{GraphConfig, SelfLoopMode};
use affilnet_common::PaperId;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Papers that contributed each node
pub type NodeFileIndex = BTreeMap<String, BTreeSet<PaperId>>;

/// Node payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionNode {
    /// Canonical institution name
    pub name: String,
}

/// Edge payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaborationEdge {
    /// Number of co-occurring papers
    pub weight: u32,
}

/// Filters applied while building one graph
#[derive(Debug, Clone, Default)]
pub struct GraphQuery {
    /// Institutions must appear in strictly more papers than this
    pub frequency_threshold: usize,

    /// Only papers published this year
    pub year: Option<u16>,

    /// Only these papers
    pub paper_ids: Option<HashSet<PaperId>>,

    /// Reciprocal directed edges instead of undirected ones
    pub directed: bool,

    /// Self-loop accumulation policy
    pub self_loops: SelfLoopMode,
}

impl GraphQuery {
    pub fn from_config(config: &GraphConfig) -> Self {
        Self {
            frequency_threshold: config.frequency_threshold,
            year: config.year,
            paper_ids: None,
            directed: config.directed,
            self_loops: config.self_loops,
        }
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.frequency_threshold = threshold;
        self
    }

    pub fn with_year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_papers(mut self, paper_ids: HashSet<PaperId>) -> Self {
        self.paper_ids = Some(paper_ids);
        self
    }

    pub fn directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    pub fn with_self_loops(mut self, mode: SelfLoopMode) -> Self {
        self.self_loops = mode;
        self
    }
}

/// Weighted institution co-occurrence graph
#[derive(Debug, Clone)]
pub struct CollaborationGraph {
    inner: DiGraph<InstitutionNode, CollaborationEdge>,
    index: HashMap<String, NodeIndex>,
    directed: bool,
}

impl CollaborationGraph {
    /// Create an empty graph
    pub fn new(directed: bool) -> Self {
        Self {
            inner: DiGraph::new(),
            index: HashMap::new(),
            directed,
        }
    }

    /// Access the underlying petgraph graph
    pub fn inner(&self) -> &DiGraph<InstitutionNode, CollaborationEdge> {
        &self.inner
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Stored edges; an undirected pair counts once, a directed pair twice
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn node_index(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }

    /// Name of a node
    pub fn name(&self, idx: NodeIndex) -> &str {
        &self.inner[idx].name
    }

    /// Node names in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.inner.node_weights().map(|node| node.name.as_str())
    }

    /// `(source, target, weight)` for every stored edge
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, u32)> {
        self.inner.edge_references().map(move |edge| {
            (
                self.name(edge.source()),
                self.name(edge.target()),
                edge.weight().weight,
            )
        })
    }

    /// Weight of the edge between two institutions
    pub fn weight(&self, a: &str, b: &str) -> Option<u32> {
        let (ia, ib) = (self.node_index(a)?, self.node_index(b)?);
        let edge = match self.inner.find_edge(ia, ib) {
            Some(edge) => Some(edge),
            None if !self.directed => self.inner.find_edge(ib, ia),
            None => None,
        }?;
        self.inner.edge_weight(edge).map(|e| e.weight)
    }

    /// Number of edge endpoints at a node; a self-loop counts twice
    pub fn degree(&self, name: &str) -> usize {
        match self.node_index(name) {
            Some(idx) => self.degree_of(idx),
            None => 0,
        }
    }

    pub(crate) fn degree_of(&self, idx: NodeIndex) -> usize {
        self.inner.edges_directed(idx, Direction::Outgoing).count()
            + self.inner.edges_directed(idx, Direction::Incoming).count()
    }

    /// Adjacent institutions, sorted; successors only for directed graphs
    pub fn neighbors(&self, name: &str) -> Vec<&str> {
        let Some(idx) = self.node_index(name) else {
            return Vec::new();
        };
        let mut names: Vec<&str> = if self.directed {
            self.inner
                .neighbors_directed(idx, Direction::Outgoing)
                .map(|n| self.name(n))
                .collect()
        } else {
            self.inner.neighbors_undirected(idx).map(|n| self.name(n)).collect()
        };
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Other endpoint and weight of every edge at a node, sorted by endpoint.
    /// Undirected graphs report each incident edge once, directed graphs
    /// their out-edges.
    pub fn incident_edges(&self, name: &str) -> Vec<(&str, u32)> {
        let Some(idx) = self.node_index(name) else {
            return Vec::new();
        };
        let mut edges: Vec<(&str, u32)> = self
            .inner
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (self.name(e.target()), e.weight().weight))
            .collect();
        if !self.directed {
            edges.extend(
                self.inner
                    .edges_directed(idx, Direction::Incoming)
                    .filter(|e| e.source() != idx)
                    .map(|e| (self.name(e.source()), e.weight().weight)),
            );
        }
        edges.sort_unstable();
        edges
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.inner.add_node(InstitutionNode {
            name: name.to_string(),
        });
        self.index.insert(name.to_string(), idx);
        idx
    }

    fn bump(&mut self, source: NodeIndex, target: NodeIndex) {
        match self.inner.find_edge(source, target) {
            Some(edge) => self.inner[edge].weight += 1,
            None => {
                self.inner.add_edge(source, target, CollaborationEdge { weight: 1 });
            }
        }
    }

    /// Count one more shared paper between two distinct institutions.
    /// Returns the number of stored edges touched.
    pub fn increment(&mut self, a: &str, b: &str) -> usize {
        let ia = self.ensure_node(a);
        let ib = self.ensure_node(b);

        if self.directed {
            self.bump(ia, ib);
            self.bump(ib, ia);
            return 2;
        }

        match self.inner.find_edge(ib, ia) {
            Some(edge) => self.inner[edge].weight += 1,
            None => self.bump(ia, ib),
        }
        1
    }

    /// Record a single-institution paper
    pub fn add_self_loop(&mut self, name: &str, mode: SelfLoopMode) {
        let idx = self.ensure_node(name);
        match (mode, self.inner.find_edge(idx, idx)) {
            (SelfLoopMode::Reset, Some(edge)) => self.inner[edge].weight = 1,
            (SelfLoopMode::Accumulate, Some(edge)) => self.inner[edge].weight += 1,
            (_, None) => {
                self.inner.add_edge(idx, idx, CollaborationEdge { weight: 1 });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undirected_increment_is_symmetric() {
        let mut graph = CollaborationGraph::new(false);
        graph.increment("mit", "stanford university");
        graph.increment("stanford university", "mit");

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.weight("mit", "stanford university"), Some(2));
        assert_eq!(graph.weight("stanford university", "mit"), Some(2));
        assert_eq!(graph.degree("mit"), 1);
        assert_eq!(graph.neighbors("stanford university"), vec!["mit"]);
    }

    #[test]
    fn test_directed_increment_adds_both_directions() {
        let mut graph = CollaborationGraph::new(true);
        graph.increment("a", "b");
        graph.increment("a", "b");

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.weight("a", "b"), Some(2));
        assert_eq!(graph.weight("b", "a"), Some(2));
        assert_eq!(graph.degree("a"), 2);
    }

    #[test]
    fn test_self_loop_modes() {
        let mut graph = CollaborationGraph::new(false);
        graph.add_self_loop("mit", SelfLoopMode::Reset);
        graph.add_self_loop("mit", SelfLoopMode::Reset);
        assert_eq!(graph.weight("mit", "mit"), Some(1));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.degree("mit"), 2);
        assert_eq!(graph.neighbors("mit"), vec!["mit"]);
        assert_eq!(graph.incident_edges("mit"), vec![("mit", 1)]);

        graph.add_self_loop("mit", SelfLoopMode::Accumulate);
        assert_eq!(graph.weight("mit", "mit"), Some(2));
    }

    #[test]
    fn test_incident_edges_sorted_by_endpoint() {
        let mut graph = CollaborationGraph::new(false);
        graph.increment("h", "l1");
        graph.increment("h", "l3");
        graph.increment("a", "h");
        graph.increment("h", "l2");
        graph.increment("h", "l2");

        assert_eq!(
            graph.incident_edges("h"),
            vec![("a", 1), ("l1", 1), ("l2", 2), ("l3", 1)]
        );

        let mut directed = CollaborationGraph::new(true);
        directed.increment("x", "z");
        directed.increment("x", "y");
        assert_eq!(directed.incident_edges("x"), vec![("y", 1), ("z", 1)]);
    }

    #[test]
    fn test_missing_nodes() {
        let graph = CollaborationGraph::new(false);
        assert_eq!(graph.weight("a", "b"), None);
        assert_eq!(graph.degree("a"), 0);
        assert!(graph.neighbors("a").is_empty());
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_query_from_config() {
        let config = GraphConfig::default();
        let query = GraphQuery::from_config(&config).with_year(2017).directed(true);
        assert_eq!(query.frequency_threshold, 2);
        assert_eq!(query.year, Some(2017));
        assert!(query.directed);
        assert!(query.paper_ids.is_none());
    }
}
