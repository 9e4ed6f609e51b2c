//! Louvain community detection
//!
//! Multi-level modularity optimization: nodes move greedily to the neighbour
//! community with the best modularity gain, communities are collapsed into
//! nodes of an induced graph, and the process repeats until a level improves
//! modularity by less than [`MIN_GAIN`]. Node visiting order is random, so
//! partitions are only reproducible with a seed.

use super::{IndexedGraph, Partition};
use crate::collaboration::CollaborationGraph;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Smallest modularity improvement that counts as progress
pub const MIN_GAIN: f64 = 1e-7;

/// Undirected weighted graph on dense indices
#[derive(Debug, Clone)]
struct WeightedGraph {
    /// Neighbours other than the node itself
    adj: Vec<Vec<(usize, f64)>>,

    /// Self-loop weight per node
    loops: Vec<f64>,

    /// Sum of edge weights, each edge once
    total_weight: f64,
}

impl WeightedGraph {
    /// Undirected view; a pair stored in both directions keeps its larger weight
    fn from_view(view: &IndexedGraph) -> Self {
        let mut pairs: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for (s, targets) in view.out.iter().enumerate() {
            for &(t, w) in targets {
                let key = (s.min(t), s.max(t));
                let entry = pairs.entry(key).or_insert(w);
                *entry = entry.max(w);
            }
        }
        Self::from_pairs(view.len(), pairs)
    }

    fn from_pairs(n: usize, pairs: BTreeMap<(usize, usize), f64>) -> Self {
        let mut adj = vec![Vec::new(); n];
        let mut loops = vec![0.0; n];
        let mut total_weight = 0.0;

        for ((a, b), w) in pairs {
            total_weight += w;
            if a == b {
                loops[a] += w;
            } else {
                adj[a].push((b, w));
                adj[b].push((a, w));
            }
        }

        Self {
            adj,
            loops,
            total_weight,
        }
    }

    fn len(&self) -> usize {
        self.loops.len()
    }

    /// Weighted degree, self-loop counted twice
    fn degree(&self, node: usize) -> f64 {
        self.adj[node].iter().map(|&(_, w)| w).sum::<f64>() + 2.0 * self.loops[node]
    }

    /// Collapse every community into one node
    fn induced(&self, partition: &[usize], communities: usize) -> Self {
        let mut pairs: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for node in 0..self.len() {
            let c = partition[node];
            if self.loops[node] > 0.0 {
                *pairs.entry((c, c)).or_insert(0.0) += self.loops[node];
            }
            for &(nbr, w) in &self.adj[node] {
                if nbr > node {
                    let d = partition[nbr];
                    *pairs.entry((c.min(d), c.max(d))).or_insert(0.0) += w;
                }
            }
        }
        Self::from_pairs(communities, pairs)
    }
}

/// Per-level bookkeeping of community degrees and internal weights
#[derive(Debug, Clone)]
struct Status {
    node2com: Vec<usize>,

    /// Total degree per community
    degrees: Vec<f64>,

    /// Degree per node
    gdegrees: Vec<f64>,

    /// Internal edge weight per community
    internals: Vec<f64>,

    loops: Vec<f64>,

    total_weight: f64,
}

impl Status {
    /// Every node in its own community
    fn new(graph: &WeightedGraph) -> Self {
        Self::with_assignment(graph, (0..graph.len()).collect())
    }

    fn with_assignment(graph: &WeightedGraph, node2com: Vec<usize>) -> Self {
        let n = graph.len();
        let slots = node2com.iter().max().map_or(0, |&c| c + 1).max(n);
        let gdegrees: Vec<f64> = (0..n).map(|i| graph.degree(i)).collect();
        let mut degrees = vec![0.0; slots];
        let mut internals = vec![0.0; slots];

        for node in 0..n {
            let c = node2com[node];
            degrees[c] += gdegrees[node];
            internals[c] += graph.loops[node];
            for &(nbr, w) in &graph.adj[node] {
                if nbr > node && node2com[nbr] == c {
                    internals[c] += w;
                }
            }
        }

        Self {
            node2com,
            degrees,
            gdegrees,
            internals,
            loops: graph.loops.clone(),
            total_weight: graph.total_weight,
        }
    }

    fn modularity(&self, resolution: f64) -> f64 {
        let links = self.total_weight;
        if links <= 0.0 {
            return 0.0;
        }
        let mut seen = vec![false; self.degrees.len()];
        let mut result = 0.0;
        for &c in &self.node2com {
            if seen[c] {
                continue;
            }
            seen[c] = true;
            result += self.internals[c] * resolution / links
                - (self.degrees[c] / (2.0 * links)).powi(2);
        }
        result
    }

    fn remove(&mut self, node: usize, com: usize, weight: f64) {
        self.degrees[com] -= self.gdegrees[node];
        self.internals[com] -= weight + self.loops[node];
    }

    fn insert(&mut self, node: usize, com: usize, weight: f64) {
        self.node2com[node] = com;
        self.degrees[com] += self.gdegrees[node];
        self.internals[com] += weight + self.loops[node];
    }

    /// Edge weight from `node` to each neighbouring community
    fn neighbour_communities(&self, graph: &WeightedGraph, node: usize) -> BTreeMap<usize, f64> {
        let mut weights = BTreeMap::new();
        for &(nbr, w) in &graph.adj[node] {
            *weights.entry(self.node2com[nbr]).or_insert(0.0) += w;
        }
        weights
    }
}

/// Seedable Louvain partitioner
#[derive(Debug, Clone)]
pub struct Louvain {
    resolution: f64,
    seed: Option<u64>,
}

impl Default for Louvain {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            seed: None,
        }
    }
}

impl Louvain {
    pub fn new(resolution: f64, seed: Option<u64>) -> Self {
        Self { resolution, seed }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Community id per view index
    pub(crate) fn partition(&self, view: &IndexedGraph) -> Vec<usize> {
        let graph = WeightedGraph::from_view(view);
        let levels = self.dendrogram(&graph);

        let partition: Vec<usize> = (0..graph.len())
            .map(|node| levels.iter().fold(node, |c, level| level[c]))
            .collect();
        debug!(levels = levels.len(), nodes = graph.len(), "Louvain partition computed");
        partition
    }

    /// One renumbered partition per level, each over the previous level's communities
    fn dendrogram(&self, graph: &WeightedGraph) -> Vec<Vec<usize>> {
        if graph.total_weight <= 0.0 {
            return vec![(0..graph.len()).collect()];
        }

        let mut rng = self.rng();
        let mut current = graph.clone();
        let mut status = Status::new(&current);
        let mut levels = Vec::new();

        self.one_level(&current, &mut status, &mut rng);
        let mut best = status.modularity(self.resolution);
        let (partition, count) = renumber(&status.node2com);
        current = current.induced(&partition, count);
        levels.push(partition);
        status = Status::new(&current);

        loop {
            self.one_level(&current, &mut status, &mut rng);
            let new_mod = status.modularity(self.resolution);
            if new_mod - best < MIN_GAIN {
                break;
            }
            let (partition, count) = renumber(&status.node2com);
            current = current.induced(&partition, count);
            levels.push(partition);
            status = Status::new(&current);
            best = new_mod;
        }

        levels
    }

    /// Move nodes between communities until no pass improves modularity
    fn one_level(&self, graph: &WeightedGraph, status: &mut Status, rng: &mut StdRng) {
        let resolution = self.resolution;
        let mut order: Vec<usize> = (0..graph.len()).collect();
        let mut new_mod = status.modularity(resolution);
        let mut modified = true;

        while modified {
            let cur_mod = new_mod;
            modified = false;
            order.shuffle(rng);

            for &node in &order {
                let com_node = status.node2com[node];
                let degc_totw = status.gdegrees[node] / (status.total_weight * 2.0);
                let neighbours = status.neighbour_communities(graph, node);
                let own = neighbours.get(&com_node).copied().unwrap_or(0.0);
                let remove_cost = -own
                    + resolution * (status.degrees[com_node] - status.gdegrees[node]) * degc_totw;
                status.remove(node, com_node, own);

                let mut candidates: Vec<(usize, f64)> = neighbours.iter().map(|(&c, &w)| (c, w)).collect();
                candidates.shuffle(rng);

                let mut best_com = com_node;
                let mut best_increase = 0.0;
                for (com, dnc) in candidates {
                    let increase =
                        remove_cost + dnc - resolution * status.degrees[com] * degc_totw;
                    if increase > best_increase {
                        best_increase = increase;
                        best_com = com;
                    }
                }

                let weight = neighbours.get(&best_com).copied().unwrap_or(0.0);
                status.insert(node, best_com, weight);
                if best_com != com_node {
                    modified = true;
                }
            }

            new_mod = status.modularity(resolution);
            if new_mod - cur_mod < MIN_GAIN {
                break;
            }
        }
    }
}

/// Relabel communities `0..k` by first appearance
fn renumber(node2com: &[usize]) -> (Vec<usize>, usize) {
    let mut labels: HashMap<usize, usize> = HashMap::new();
    let partition = node2com
        .iter()
        .map(|c| {
            let next = labels.len();
            *labels.entry(*c).or_insert(next)
        })
        .collect();
    (partition, labels.len())
}

/// Modularity of a named partition over a collaboration graph.
/// Nodes missing from the partition form singleton communities.
pub fn modularity(graph: &CollaborationGraph, partition: &Partition, resolution: f64) -> f64 {
    let view = IndexedGraph::from_graph(graph);
    let weighted = WeightedGraph::from_view(&view);

    let offset = partition.values().max().map_or(0, |&c| c + 1);
    let assignment = view
        .names
        .iter()
        .enumerate()
        .map(|(i, name)| partition.get(name).copied().unwrap_or(offset + i))
        .collect();

    Status::with_assignment(&weighted, assignment).modularity(resolution)
}
