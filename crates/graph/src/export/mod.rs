//! JSON documents for the visualization front-ends
//!
//! - node-link graph for force layouts
//! - hierarchical edge bundling records
//! - treemap of clusters with per-institution scores
//! - render style (node sizes, edge colours) for static drawings

mod style;

pub use style::{EdgeStyle, NodeStyle, RenderStyle};

use crate::analytics::{GraphReport, Partition, Scores};
use crate::collaboration::CollaborationGraph;
use affilnet_common::errors::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Name of the treemap root
pub const TREEMAP_ROOT: &str = "institutions";

/// Group assigned to every node when no partition is available
pub const DEFAULT_GROUP: usize = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkNode {
    pub id: String,
    pub group: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkLink {
    pub source: String,
    pub target: String,
    pub value: u32,
}

/// Force-layout document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkGraph {
    pub nodes: Vec<NodeLinkNode>,
    pub links: Vec<NodeLinkLink>,
}

/// One hierarchical edge bundling record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HebRecord {
    pub name: String,

    /// Number of incident edges
    pub size: usize,

    /// Bundling target per incident edge
    pub edges: Vec<String>,
}

/// Scores of one institution inside a treemap cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreemapLeaf {
    pub name: String,
    pub hub: f64,
    pub authorities: f64,
    pub betweenness: f64,
    pub closeness: f64,
    pub katz: f64,
    pub eigen: f64,

    /// Node degree
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreemapCluster {
    pub name: String,
    pub children: Vec<TreemapLeaf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treemap {
    pub name: String,
    pub children: Vec<TreemapCluster>,
}

/// Node-link document; node groups come from the partition when given
pub fn node_link(graph: &CollaborationGraph, partition: Option<&Partition>) -> NodeLinkGraph {
    let nodes = graph
        .nodes()
        .map(|name| NodeLinkNode {
            id: name.to_string(),
            group: partition
                .and_then(|p| p.get(name).copied())
                .unwrap_or(DEFAULT_GROUP),
        })
        .collect();

    let links = graph
        .edges()
        .map(|(source, target, value)| NodeLinkLink {
            source: source.to_string(),
            target: target.to_string(),
            value,
        })
        .collect();

    NodeLinkGraph { nodes, links }
}

/// Bundling records, one per node with at least one edge.
///
/// Each incident edge bundles towards the neighbour when the neighbour's
/// degree does not exceed the node's, and onto the node itself otherwise.
pub fn hierarchical_edge_bundling(graph: &CollaborationGraph) -> Vec<HebRecord> {
    graph
        .nodes()
        .filter_map(|name| {
            let incident = graph.incident_edges(name);
            if incident.is_empty() {
                return None;
            }
            let degree = graph.degree(name);
            let edges = incident
                .iter()
                .map(|(neighbour, _)| {
                    if graph.degree(neighbour) <= degree {
                        neighbour.to_string()
                    } else {
                        name.to_string()
                    }
                })
                .collect();
            Some(HebRecord {
                name: name.to_string(),
                size: incident.len(),
                edges,
            })
        })
        .collect()
}

/// Treemap of the clusters with more than `min_size` members
pub fn treemap(report: &GraphReport, min_size: usize) -> Treemap {
    let score = |scores: &Scores, name: &str| scores.get(name).copied().unwrap_or(0.0);

    let children = report
        .clusters(min_size)
        .into_iter()
        .map(|(id, members)| TreemapCluster {
            name: format!("cluster_{}", id),
            children: members
                .iter()
                .map(|name| TreemapLeaf {
                    name: name.clone(),
                    hub: score(&report.hubs, name),
                    authorities: score(&report.authorities, name),
                    betweenness: score(&report.betweenness, name),
                    closeness: score(&report.closeness, name),
                    katz: score(&report.katz, name),
                    eigen: score(&report.eigenvector, name),
                    size: report.degrees.get(name).copied().unwrap_or(0),
                })
                .collect(),
        })
        .collect();

    Treemap {
        name: TREEMAP_ROOT.to_string(),
        children,
    }
}

/// Write a document as pretty JSON, creating parent directories
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;

    debug!(path = %path.display(), "JSON document written");
    Ok(())
}
