//! Affilnet Collaboration Graphs
//!
//! Everything downstream of institution extraction:
//! - Weighted co-occurrence graph construction under frequency/year/paper filters
//! - Community detection and centrality measures behind a swappable provider
//! - Node-link, hierarchical edge bundling and treemap JSON documents

pub mod analytics;
pub mod collaboration;
pub mod export;

pub use analytics::{clusters, GraphAnalytics, GraphReport, HitsScores, NativeAnalytics, Partition, Scores};
pub use export::{hierarchical_edge_bundling, node_link, treemap, write_json, RenderStyle};
pub use collaboration::{
    CollaborationEdge, CollaborationGraph, CollaborationGraphBuilder, GraphQuery, InstitutionNode,
    NodeFileIndex,
};
