//! Centrality measures over an indexed graph snapshot
//!
//! Betweenness, closeness and eigenvector centralities ignore edge weights.
//! HITS uses them. Katz is solved in closed form.

use super::IndexedGraph;
use affilnet_common::errors::{AppError, Result};
use nalgebra::{DMatrix, DVector};
use std::collections::VecDeque;

/// Breadth-first hop counts from `source` over an adjacency list, `None` when unreachable
fn bfs(adjacency: &[Vec<(usize, f64)>], source: usize) -> Vec<Option<usize>> {
    let mut dist = vec![None; adjacency.len()];
    let mut queue = VecDeque::new();
    dist[source] = Some(0);
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        let next = dist[v].map_or(0, |d| d + 1);
        for &(w, _) in &adjacency[v] {
            if dist[w].is_none() {
                dist[w] = Some(next);
                queue.push_back(w);
            }
        }
    }
    dist
}

/// Brandes shortest-path betweenness, normalized by `1/((n-1)(n-2))`
pub(crate) fn betweenness(view: &IndexedGraph) -> Vec<f64> {
    let n = view.len();
    let mut centrality = vec![0.0; n];

    for s in 0..n {
        let mut stack = Vec::with_capacity(n);
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut dist: Vec<Option<usize>> = vec![None; n];
        let mut queue = VecDeque::new();

        sigma[s] = 1.0;
        dist[s] = Some(0);
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let dv = dist[v].unwrap_or(0);
            for &(w, _) in &view.out[v] {
                if dist[w].is_none() {
                    dist[w] = Some(dv + 1);
                    queue.push_back(w);
                }
                if dist[w] == Some(dv + 1) {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0_f64; n];
        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                centrality[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        for value in &mut centrality {
            *value *= scale;
        }
    }
    centrality
}

/// Closeness with Wasserman-Faust scaling for disconnected graphs.
/// Directed graphs use incoming distances.
pub(crate) fn closeness(view: &IndexedGraph) -> Vec<f64> {
    let n = view.len();
    let adjacency = if view.directed { &view.inc } else { &view.out };

    (0..n)
        .map(|node| {
            let dist = bfs(adjacency, node);
            let reached = dist.iter().filter(|d| d.is_some()).count();
            let total: usize = dist.iter().flatten().sum();
            if total == 0 || n <= 1 {
                return 0.0;
            }
            let r = (reached - 1) as f64;
            (r / total as f64) * (r / (n - 1) as f64)
        })
        .collect()
}

/// Power iteration on `A + I`, L2-normalized each step
pub(crate) fn eigenvector(view: &IndexedGraph, max_iterations: usize, tolerance: f64) -> Result<Vec<f64>> {
    let n = view.len();
    let mut x = vec![1.0 / n as f64; n];

    for _ in 0..max_iterations {
        let last = x.clone();
        for (node, targets) in view.out.iter().enumerate() {
            for &(nbr, _) in targets {
                x[nbr] += last[node];
            }
        }

        let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
        let norm = if norm == 0.0 { 1.0 } else { norm };
        for value in &mut x {
            *value /= norm;
        }

        let change: f64 = x.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if change < n as f64 * tolerance {
            return Ok(x);
        }
    }

    Err(AppError::not_converged("eigenvector", max_iterations))
}

/// Closed-form Katz centrality: solve `(I - alpha A^T) x = beta`
pub(crate) fn katz(view: &IndexedGraph, alpha: f64, beta: f64) -> Result<Vec<f64>> {
    let n = view.len();
    let mut system = DMatrix::<f64>::identity(n, n);
    for (source, targets) in view.out.iter().enumerate() {
        for &(target, _) in targets {
            system[(target, source)] = if target == source { 1.0 - alpha } else { -alpha };
        }
    }

    let rhs = DVector::from_element(n, beta);
    let solution = system.lu().solve(&rhs).ok_or_else(|| AppError::SingularSystem {
        algorithm: "katz".to_string(),
    })?;
    if solution.iter().any(|v| !v.is_finite()) {
        return Err(AppError::SingularSystem {
            algorithm: "katz".to_string(),
        });
    }

    let norm = solution.sum().signum() * solution.norm();
    let norm = if norm == 0.0 { 1.0 } else { norm };
    Ok(solution.iter().map(|v| v / norm).collect())
}

/// Weighted HITS power iteration, returns `(hubs, authorities)` summing to 1
pub(crate) fn hits(
    view: &IndexedGraph,
    max_iterations: usize,
    tolerance: f64,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let n = view.len();
    let mut hubs = vec![1.0 / n as f64; n];
    let mut authorities = vec![0.0; n];
    let mut converged = false;

    for _ in 0..max_iterations {
        let last = std::mem::replace(&mut hubs, vec![0.0; n]);
        authorities = vec![0.0; n];

        for (node, targets) in view.out.iter().enumerate() {
            for &(nbr, w) in targets {
                authorities[nbr] += last[node] * w;
            }
        }
        for (node, targets) in view.out.iter().enumerate() {
            for &(nbr, w) in targets {
                hubs[node] += authorities[nbr] * w;
            }
        }

        scale_by_max(&mut hubs);
        scale_by_max(&mut authorities);

        let change: f64 = hubs.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if change < tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(AppError::not_converged("hits", max_iterations));
    }

    scale_by_sum(&mut hubs);
    scale_by_sum(&mut authorities);
    Ok((hubs, authorities))
}

fn scale_by_max(values: &mut [f64]) {
    let max = values.iter().copied().fold(f64::MIN, f64::max);
    if max > 0.0 {
        for value in values.iter_mut() {
            *value /= max;
        }
    }
}

fn scale_by_sum(values: &mut [f64]) {
    let sum: f64 = values.iter().sum();
    if sum > 0.0 {
        for value in values.iter_mut() {
            *value /= sum;
        }
    }
}
