//! Render style for static graph drawings
//!
//! Only the styling data is produced here; drawing is left to the consumer.

use crate::analytics::Partition;
use crate::collaboration::CollaborationGraph;
use serde::{Deserialize, Serialize};

/// Node size by degree bucket
pub fn node_size(degree: usize) -> u32 {
    match degree {
        0..=4 => 10,
        5..=9 => 40,
        _ => 90,
    }
}

/// Edge colour and width by weight bucket
pub fn edge_style(weight: u32) -> (&'static str, f64) {
    match weight {
        0..=6 => ("gray", 0.1),
        7..=14 => ("black", 1.0),
        15..=24 => ("blue", 1.0),
        _ => ("red", 6.0),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    pub id: String,
    pub size: u32,

    /// Community id, 0 without a partition
    pub color: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub source: String,
    pub target: String,
    pub color: String,
    pub width: f64,
}

/// Styling for every node and edge of a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderStyle {
    pub nodes: Vec<NodeStyle>,
    pub edges: Vec<EdgeStyle>,
}

impl RenderStyle {
    pub fn from_graph(graph: &CollaborationGraph, partition: Option<&Partition>) -> Self {
        let nodes = graph
            .nodes()
            .map(|name| NodeStyle {
                id: name.to_string(),
                size: node_size(graph.degree(name)),
                color: partition.and_then(|p| p.get(name).copied()).unwrap_or(0),
            })
            .collect();

        let edges = graph
            .edges()
            .map(|(source, target, weight)| {
                let (color, width) = edge_style(weight);
                EdgeStyle {
                    source: source.to_string(),
                    target: target.to_string(),
                    color: color.to_string(),
                    width,
                }
            })
            .collect();

        Self { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets() {
        assert_eq!(node_size(0), 10);
        assert_eq!(node_size(4), 10);
        assert_eq!(node_size(5), 40);
        assert_eq!(node_size(9), 40);
        assert_eq!(node_size(10), 90);

        assert_eq!(edge_style(6), ("gray", 0.1));
        assert_eq!(edge_style(7), ("black", 1.0));
        assert_eq!(edge_style(15), ("blue", 1.0));
        assert_eq!(edge_style(25), ("red", 6.0));
    }

    #[test]
    fn test_style_from_graph() {
        let mut graph = CollaborationGraph::new(false);
        for _ in 0..7 {
            graph.increment("a", "b");
        }
        let partition: Partition = [("a".to_string(), 3)].into_iter().collect();
        let style = RenderStyle::from_graph(&graph, Some(&partition));

        assert_eq!(style.nodes[0].color, 3);
        assert_eq!(style.nodes[1].color, 0);
        assert_eq!(style.nodes[0].size, 10);
        assert_eq!(style.edges.len(), 1);
        assert_eq!(style.edges[0].color, "black");
    }
}
