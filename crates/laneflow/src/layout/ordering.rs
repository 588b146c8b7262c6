//! Barycenter ordering for edge crossing reduction
//!
//! Implements the ordering phase of the layered layout: nodes inside each
//! rank are reordered by the mean position of their neighbours in the
//! adjacent rank, sweeping down and up alternately.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::layered::RankGraph;

/// Count edge crossings between all adjacent ranks.
///
/// Edges (a1→b1) and (a2→b2) between rank L and rank L+1 cross when
/// a1 is before a2 but b1 is after b2, or vice versa. Edges spanning more
/// than one rank are not counted.
pub fn cross_count(layers: &[Vec<usize>], graph: &RankGraph) -> usize {
    layers
        .windows(2)
        .map(|pair| two_layer_cross_count(&pair[0], &pair[1], graph))
        .sum()
}

fn two_layer_cross_count(north: &[usize], south: &[usize], graph: &RankGraph) -> usize {
    let south_pos: HashMap<usize, usize> =
        south.iter().enumerate().map(|(i, &n)| (n, i)).collect();

    let mut edges: Vec<(usize, usize)> = Vec::new();
    for (np, &n) in north.iter().enumerate() {
        for succ in graph.successors(n) {
            if let Some(&sp) = south_pos.get(&succ) {
                edges.push((np, sp));
            }
        }
    }

    let mut crossings = 0;
    for i in 0..edges.len() {
        for j in (i + 1)..edges.len() {
            let (n1, s1) = edges[i];
            let (n2, s2) = edges[j];
            if (n1 < n2 && s1 > s2) || (n1 > n2 && s1 < s2) {
                crossings += 1;
            }
        }
    }
    crossings
}

/// Which neighbours a sweep looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepDirection {
    /// Predecessors in the previous rank
    Downward,
    /// Successors in the next rank
    Upward,
}

/// Mean position of each node's neighbours in the reference rank.
///
/// `None` for nodes with no neighbour there.
pub fn compute_barycenters(
    layer: &[usize],
    ref_layer: &[usize],
    graph: &RankGraph,
    direction: SweepDirection,
) -> Vec<Option<f64>> {
    let ref_pos: HashMap<usize, usize> =
        ref_layer.iter().enumerate().map(|(i, &n)| (n, i)).collect();

    layer
        .iter()
        .map(|&node| {
            let neighbours: Vec<usize> = match direction {
                SweepDirection::Downward => graph.predecessors(node).collect(),
                SweepDirection::Upward => graph.successors(node).collect(),
            };
            let positions: Vec<f64> = neighbours
                .iter()
                .filter_map(|n| ref_pos.get(n).map(|&p| p as f64))
                .collect();

            if positions.is_empty() {
                None
            } else {
                Some(positions.iter().sum::<f64>() / positions.len() as f64)
            }
        })
        .collect()
}

/// Stable reorder of a rank by barycenter.
///
/// Ties keep their previous relative order; nodes without a barycenter go
/// after the connected ones, in their previous relative order.
pub fn order_layer_by_barycenter(layer: &mut Vec<usize>, barycenters: &[Option<f64>]) {
    let mut entries: Vec<(usize, Option<f64>, usize)> = layer
        .iter()
        .enumerate()
        .map(|(i, &node)| (node, barycenters.get(i).copied().flatten(), i))
        .collect();

    entries.sort_by(|a, b| match (a.1, b.1) {
        (Some(bc_a), Some(bc_b)) => bc_a
            .partial_cmp(&bc_b)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.2.cmp(&b.2)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.2.cmp(&b.2),
    });

    *layer = entries.into_iter().map(|(node, _, _)| node).collect();
}

/// Alternate downward/upward barycenter sweeps, keeping the best ordering.
///
/// Returns the crossing count of the ordering left in `layers`.
pub fn order_layers_barycenter(
    graph: &RankGraph,
    layers: &mut Vec<Vec<usize>>,
    passes: usize,
) -> usize {
    if layers.len() < 2 {
        return 0;
    }

    let mut best_layers = layers.clone();
    let mut best_cc = cross_count(layers, graph);

    for pass in 0..passes {
        if best_cc == 0 {
            break;
        }
        let downward = pass % 2 == 0;
        let layer_indices: Vec<usize> = if downward {
            (1..layers.len()).collect()
        } else {
            (0..layers.len() - 1).rev().collect()
        };

        for layer_idx in layer_indices {
            let (ref_idx, direction) = if downward {
                (layer_idx - 1, SweepDirection::Downward)
            } else {
                (layer_idx + 1, SweepDirection::Upward)
            };
            let barycenters =
                compute_barycenters(&layers[layer_idx], &layers[ref_idx], graph, direction);
            order_layer_by_barycenter(&mut layers[layer_idx], &barycenters);
        }

        let cc = cross_count(layers, graph);
        if cc < best_cc {
            best_layers = layers.clone();
            best_cc = cc;
        }
    }

    *layers = best_layers;
    best_cc
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Graph over `n` nodes with the given index edges
    fn graph(n: usize, edges: &[(usize, usize)]) -> RankGraph {
        RankGraph::from_index_edges(n, edges.iter().copied())
    }

    #[test]
    fn test_cross_count_no_crossings() {
        // A→C, B→D run parallel
        let g = graph(4, &[(0, 2), (1, 3)]);
        let layers = vec![vec![0, 1], vec![2, 3]];
        assert_eq!(cross_count(&layers, &g), 0);
    }

    #[test]
    fn test_cross_count_one_crossing() {
        // A→D, B→C form an X
        let g = graph(4, &[(0, 3), (1, 2)]);
        let layers = vec![vec![0, 1], vec![2, 3]];
        assert_eq!(cross_count(&layers, &g), 1);
    }

    #[test]
    fn test_cross_count_empty_and_single() {
        let g = graph(1, &[]);
        assert_eq!(cross_count(&[], &g), 0);
        assert_eq!(cross_count(&[vec![0]], &g), 0);
    }

    #[test]
    fn test_barycenter_without_neighbours() {
        let g = graph(2, &[]);
        let bcs = compute_barycenters(&[1], &[0], &g, SweepDirection::Downward);
        assert_eq!(bcs, vec![None]);
    }

    #[test]
    fn test_barycenter_averages_positions() {
        // Layer 0: [A, B, C]; D has predecessors A and C
        let g = graph(4, &[(0, 3), (2, 3)]);
        let bcs = compute_barycenters(&[3], &[0, 1, 2], &g, SweepDirection::Downward);
        assert_eq!(bcs, vec![Some(1.0)]);
    }

    #[test]
    fn test_order_layer_unconnected_keep_order_after_connected() {
        let mut layer = vec![10, 11, 12];
        order_layer_by_barycenter(&mut layer, &[None, Some(1.0), None]);
        assert_eq!(layer, vec![11, 10, 12]);
    }

    #[test]
    fn test_sweeps_remove_simple_crossing() {
        let g = graph(4, &[(0, 3), (1, 2)]);
        let mut layers = vec![vec![0, 1], vec![2, 3]];
        let cc = order_layers_barycenter(&g, &mut layers, 4);
        assert_eq!(cc, 0);
        assert_eq!(layers[1], vec![3, 2]);
    }
}
