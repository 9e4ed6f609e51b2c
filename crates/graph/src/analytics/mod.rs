//! Graph analytics provider
//!
//! Community detection and centrality measures behind [`GraphAnalytics`], so
//! the construction pipeline never depends on a concrete implementation.
//! [`NativeAnalytics`] computes everything in-process.

mod centrality;
mod community;

pub use community::{modularity, Louvain};

use crate::collaboration::CollaborationGraph;
use affilnet_common::config::AnalyticsConfig;
use affilnet_common::errors::{AppError, Result};
use affilnet_common::metrics::AnalyticsTimer;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Score per institution
pub type Scores = BTreeMap<String, f64>;

/// Community id per institution
pub type Partition = BTreeMap<String, usize>;

/// HITS result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitsScores {
    pub hubs: Scores,
    pub authorities: Scores,
}

/// Every measure computed over one graph snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphReport {
    pub partition: Partition,

    /// Modularity of `partition`
    pub modularity: f64,

    pub betweenness: Scores,

    pub closeness: Scores,

    pub eigenvector: Scores,

    pub katz: Scores,

    pub hubs: Scores,

    pub authorities: Scores,

    /// Node degree, self-loops counted twice
    pub degrees: BTreeMap<String, usize>,
}

impl GraphReport {
    /// Clusters of the partition with more than `min_size` members
    pub fn clusters(&self, min_size: usize) -> BTreeMap<usize, Vec<String>> {
        clusters(&self.partition, min_size)
    }
}

/// Group institutions by community, keeping clusters larger than `min_size`
pub fn clusters(partition: &Partition, min_size: usize) -> BTreeMap<usize, Vec<String>> {
    let mut groups: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for (name, &community) in partition {
        groups.entry(community).or_default().push(name.clone());
    }
    groups.retain(|_, members| members.len() > min_size);
    groups
}

/// Pluggable community detection and centrality provider
pub trait GraphAnalytics {
    /// Modularity-maximizing partition
    fn communities(&self, graph: &CollaborationGraph) -> Result<Partition>;

    fn betweenness(&self, graph: &CollaborationGraph) -> Result<Scores>;

    fn closeness(&self, graph: &CollaborationGraph) -> Result<Scores>;

    fn eigenvector(&self, graph: &CollaborationGraph) -> Result<Scores>;

    fn katz(&self, graph: &CollaborationGraph) -> Result<Scores>;

    fn hits(&self, graph: &CollaborationGraph) -> Result<HitsScores>;

    /// Run every measure over the same graph
    fn analyze(&self, graph: &CollaborationGraph) -> Result<GraphReport> {
        let timer = AnalyticsTimer::start("communities");
        let partition = self.communities(graph)?;
        timer.finish();

        let timer = AnalyticsTimer::start("betweenness");
        let betweenness = self.betweenness(graph)?;
        timer.finish();

        let timer = AnalyticsTimer::start("closeness");
        let closeness = self.closeness(graph)?;
        timer.finish();

        let timer = AnalyticsTimer::start("eigenvector");
        let eigenvector = self.eigenvector(graph)?;
        timer.finish();

        let timer = AnalyticsTimer::start("katz");
        let katz = self.katz(graph)?;
        timer.finish();

        let timer = AnalyticsTimer::start("hits");
        let HitsScores { hubs, authorities } = self.hits(graph)?;
        timer.finish();

        let degrees = graph
            .nodes()
            .map(|name| (name.to_string(), graph.degree(name)))
            .collect();
        let modularity = modularity(graph, &partition, 1.0);

        info!(
            nodes = graph.node_count(),
            communities = partition.values().collect::<BTreeSet<_>>().len(),
            modularity,
            "Graph analytics computed"
        );

        Ok(GraphReport {
            partition,
            modularity,
            betweenness,
            closeness,
            eigenvector,
            katz,
            hubs,
            authorities,
            degrees,
        })
    }
}

/// In-process implementation of every measure
#[derive(Debug, Clone, Default)]
pub struct NativeAnalytics {
    config: AnalyticsConfig,
}

impl NativeAnalytics {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }
}

impl GraphAnalytics for NativeAnalytics {
    fn communities(&self, graph: &CollaborationGraph) -> Result<Partition> {
        let view = IndexedGraph::new(graph, "communities")?;
        let louvain = Louvain::new(self.config.resolution, self.config.seed);
        Ok(view.label(louvain.partition(&view)))
    }

    fn betweenness(&self, graph: &CollaborationGraph) -> Result<Scores> {
        let view = IndexedGraph::new(graph, "betweenness")?;
        Ok(view.label(centrality::betweenness(&view)))
    }

    fn closeness(&self, graph: &CollaborationGraph) -> Result<Scores> {
        let view = IndexedGraph::new(graph, "closeness")?;
        Ok(view.label(centrality::closeness(&view)))
    }

    fn eigenvector(&self, graph: &CollaborationGraph) -> Result<Scores> {
        let view = IndexedGraph::new(graph, "eigenvector")?;
        let scores =
            centrality::eigenvector(&view, self.config.max_iterations, self.config.tolerance)?;
        Ok(view.label(scores))
    }

    fn katz(&self, graph: &CollaborationGraph) -> Result<Scores> {
        let view = IndexedGraph::new(graph, "katz")?;
        let scores = centrality::katz(&view, self.config.katz_alpha, self.config.katz_beta)?;
        Ok(view.label(scores))
    }

    fn hits(&self, graph: &CollaborationGraph) -> Result<HitsScores> {
        let view = IndexedGraph::new(graph, "hits")?;
        let (hubs, authorities) =
            centrality::hits(&view, self.config.max_iterations, self.config.hits_tolerance)?;
        Ok(HitsScores {
            hubs: view.label(hubs),
            authorities: view.label(authorities),
        })
    }
}

/// Dense-index adjacency snapshot shared by the algorithms
#[derive(Debug, Clone)]
pub(crate) struct IndexedGraph {
    pub names: Vec<String>,

    /// Successors with weights; both directions for undirected graphs,
    /// a self-loop listed once
    pub out: Vec<Vec<(usize, f64)>>,

    /// Predecessors with weights
    pub inc: Vec<Vec<(usize, f64)>>,

    pub directed: bool,
}

impl IndexedGraph {
    pub fn new(graph: &CollaborationGraph, algorithm: &str) -> Result<Self> {
        if graph.node_count() == 0 {
            return Err(AppError::empty_graph(algorithm));
        }
        Ok(Self::from_graph(graph))
    }

    pub fn from_graph(graph: &CollaborationGraph) -> Self {
        let inner = graph.inner();
        let n = inner.node_count();
        let names = graph.nodes().map(str::to_string).collect();
        let mut out = vec![Vec::new(); n];
        let mut inc = vec![Vec::new(); n];

        for edge in inner.raw_edges() {
            let (s, t) = (edge.source().index(), edge.target().index());
            let w = edge.weight.weight as f64;
            out[s].push((t, w));
            inc[t].push((s, w));
            if !graph.is_directed() && s != t {
                out[t].push((s, w));
                inc[s].push((t, w));
            }
        }

        Self {
            names,
            out,
            inc,
            directed: graph.is_directed(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Attach names to per-index values
    pub fn label<T>(&self, values: Vec<T>) -> BTreeMap<String, T> {
        self.names.iter().cloned().zip(values).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph() -> CollaborationGraph {
        let mut graph = CollaborationGraph::new(false);
        graph.increment("a", "b");
        graph.increment("b", "c");
        graph
    }

    #[test]
    fn test_clusters_drop_small_groups() {
        let partition: Partition = [("a", 0), ("b", 0), ("c", 0), ("d", 1), ("e", 2), ("f", 2)]
            .into_iter()
            .map(|(n, c)| (n.to_string(), c))
            .collect();

        let kept = clusters(&partition, 1);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[&0], vec!["a", "b", "c"]);
        assert_eq!(kept[&2], vec!["e", "f"]);

        // strictly more than the minimum
        assert_eq!(clusters(&partition, 3).len(), 0);
    }

    #[test]
    fn test_empty_graph_is_an_error() {
        let graph = CollaborationGraph::new(false);
        let analytics = NativeAnalytics::default();

        let err = analytics.betweenness(&graph).unwrap_err();
        assert!(err.is_fatal_analytics());
        assert!(analytics.katz(&graph).is_err());
        assert!(analytics.hits(&graph).is_err());
        assert!(analytics.communities(&graph).is_err());
        assert!(analytics.analyze(&graph).is_err());
    }

    #[test]
    fn test_indexed_view_expands_undirected_edges() {
        let mut graph = path_graph();
        graph.add_self_loop("c", Default::default());
        let view = IndexedGraph::from_graph(&graph);

        assert_eq!(view.len(), 3);
        assert_eq!(view.out[1].len(), 2);
        // the self-loop is listed once
        assert_eq!(view.out[2], vec![(1, 1.0), (2, 1.0)]);
        assert_eq!(view.inc[0], vec![(1, 1.0)]);
    }

    #[test]
    fn test_analyze_path_graph() {
        let config = AnalyticsConfig {
            seed: Some(7),
            ..Default::default()
        };
        let report = NativeAnalytics::new(config).analyze(&path_graph()).unwrap();

        assert_eq!(report.degrees["b"], 2);
        assert!((report.betweenness["b"] - 1.0).abs() < 1e-9);
        assert!((report.closeness["b"] - 1.0).abs() < 1e-9);
        assert_eq!(report.partition.len(), 3);
        assert_eq!(report.hubs.len(), 3);
    }
}
