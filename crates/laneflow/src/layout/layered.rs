//! Layered layout engine
//!
//! Arranges a flat graph in discrete ranks following edge direction:
//!
//! 1. Order nodes topologically (Kahn), releasing the earliest remaining node
//!    in input order whenever a cycle blocks progress
//! 2. Rank by longest path over the forward edges of that order
//! 3. Reduce crossings with barycenter sweeps
//! 4. Stack ranks along the flow axis, centre each rank on the cross axis
//! 5. Translate so the top-left of the drawing sits at the configured margin
//!
//! Positions come back as top-left corners.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use tracing::{debug, span, trace, warn, Level};

use super::ordering::order_layers_barycenter;
use crate::core::{Direction, LayoutConfig, Point, Size};

/// Adjacency over dense node indices
#[derive(Debug, Clone, Default)]
pub struct RankGraph {
    succ: Vec<Vec<usize>>,
    pred: Vec<Vec<usize>>,
}

impl RankGraph {
    /// Build from index pairs; self-loops, out-of-range and repeated pairs
    /// are skipped
    pub fn from_index_edges(n: usize, edges: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut graph = Self {
            succ: vec![Vec::new(); n],
            pred: vec![Vec::new(); n],
        };
        for (from, to) in edges {
            if from == to || from >= n || to >= n || graph.succ[from].contains(&to) {
                continue;
            }
            graph.succ[from].push(to);
            graph.pred[to].push(from);
        }
        graph
    }

    pub fn len(&self) -> usize {
        self.succ.len()
    }

    pub fn is_empty(&self) -> bool {
        self.succ.is_empty()
    }

    pub fn successors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.succ[node].iter().copied()
    }

    pub fn predecessors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.pred[node].iter().copied()
    }

    /// Kahn's algorithm, smallest ready index first.
    ///
    /// When only cyclic nodes remain, the smallest unplaced index is released
    /// so every node appears exactly once.
    pub fn topological_order(&self) -> Vec<usize> {
        let n = self.len();
        let mut in_degree: Vec<usize> = self.pred.iter().map(Vec::len).collect();
        let mut placed = vec![false; n];
        let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
            .filter(|&v| in_degree[v] == 0)
            .map(Reverse)
            .collect();
        let mut order = Vec::with_capacity(n);
        let mut next_unplaced = 0;

        while order.len() < n {
            let node = match ready.pop() {
                Some(Reverse(v)) => v,
                None => {
                    while placed[next_unplaced] {
                        next_unplaced += 1;
                    }
                    trace!(node = next_unplaced, "Cycle detected, releasing node");
                    next_unplaced
                }
            };
            if placed[node] {
                continue;
            }
            placed[node] = true;
            order.push(node);

            for &next in &self.succ[node] {
                if placed[next] {
                    continue;
                }
                in_degree[next] = in_degree[next].saturating_sub(1);
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }
        order
    }

    /// Longest-path rank of every node. Edges pointing backwards in `order`
    /// (cycle edges) are ignored.
    pub fn longest_path_ranks(&self, order: &[usize]) -> Vec<usize> {
        let mut position = vec![0; self.len()];
        for (i, &v) in order.iter().enumerate() {
            position[v] = i;
        }

        let mut ranks = vec![0; self.len()];
        for &v in order {
            ranks[v] = self
                .predecessors(v)
                .filter(|&u| position[u] < position[v])
                .map(|u| ranks[u] + 1)
                .max()
                .unwrap_or(0);
        }
        ranks
    }
}

/// A node handed to the engine: identity plus box
#[derive(Debug, Clone, Copy)]
pub struct LayoutNode<'a> {
    pub id: &'a str,
    pub size: Size,
}

impl<'a> LayoutNode<'a> {
    pub fn new(id: &'a str, size: Size) -> Self {
        Self { id, size }
    }
}

/// A positioned node; `position` is the top-left corner
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    pub id: String,
    pub position: Point,
    pub size: Size,
    pub rank: usize,
}

/// Engine output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayeredResult {
    /// Placed nodes in input order
    pub nodes: Vec<PlacedNode>,
    /// Extent of the drawing including both margins
    pub width: f64,
    pub height: f64,
}

impl LayeredResult {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&PlacedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Positions keyed by node id
    pub fn positions(&self) -> HashMap<&str, Point> {
        self.nodes
            .iter()
            .map(|n| (n.id.as_str(), n.position))
            .collect()
    }
}

/// Layered layout algorithm
#[derive(Debug, Clone, Default)]
pub struct LayeredLayoutEngine {
    config: LayoutConfig,
}

impl LayeredLayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out `nodes` along `direction`.
    ///
    /// Edges naming unknown nodes and self-loops are dropped. Repeated node
    /// ids keep their first occurrence. An empty node set yields an empty
    /// result.
    pub fn layout(
        &self,
        nodes: &[LayoutNode<'_>],
        edges: &[(&str, &str)],
        direction: Direction,
    ) -> LayeredResult {
        let layout_span = span!(
            Level::DEBUG,
            "layered_layout",
            node_count = nodes.len(),
            edge_count = edges.len(),
            direction = %direction
        );
        let _enter = layout_span.enter();

        if nodes.is_empty() {
            debug!("No nodes, returning empty layout");
            return LayeredResult::default();
        }

        let mut index: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
        let mut unique: Vec<LayoutNode<'_>> = Vec::with_capacity(nodes.len());
        for node in nodes {
            if index.contains_key(node.id) {
                warn!(node_id = node.id, "Duplicate node id, keeping first occurrence");
                continue;
            }
            index.insert(node.id, unique.len());
            unique.push(*node);
        }

        let mut dropped = 0usize;
        let index_edges: Vec<(usize, usize)> = edges
            .iter()
            .filter_map(|(source, target)| match (index.get(source), index.get(target)) {
                (Some(&s), Some(&t)) if s != t => Some((s, t)),
                _ => {
                    dropped += 1;
                    None
                }
            })
            .collect();
        if dropped > 0 {
            debug!(dropped, "Dropped self-loop or dangling edges");
        }

        let graph = RankGraph::from_index_edges(unique.len(), index_edges);
        let order = graph.topological_order();
        let ranks = graph.longest_path_ranks(&order);

        let max_rank = ranks.iter().copied().max().unwrap_or(0);
        let mut layers: Vec<Vec<usize>> = vec![Vec::new(); max_rank + 1];
        for (v, &rank) in ranks.iter().enumerate() {
            layers[rank].push(v);
        }
        let crossings = order_layers_barycenter(&graph, &mut layers, self.config.ordering_passes);
        debug!(rank_count = layers.len(), crossings, "Ranks assigned and ordered");

        let centers = self.assign_centers(&unique, &layers, direction);

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        for (v, center) in centers.iter().enumerate() {
            let size = unique[v].size;
            min_x = min_x.min(center.x - size.width / 2.0);
            min_y = min_y.min(center.y - size.height / 2.0);
        }
        let shift_x = self.config.margin_x - min_x;
        let shift_y = self.config.margin_y - min_y;

        let mut width: f64 = 0.0;
        let mut height: f64 = 0.0;
        let placed: Vec<PlacedNode> = unique
            .iter()
            .enumerate()
            .map(|(v, node)| {
                let position = Point::new(
                    centers[v].x - node.size.width / 2.0 + shift_x,
                    centers[v].y - node.size.height / 2.0 + shift_y,
                );
                width = width.max(position.x + node.size.width);
                height = height.max(position.y + node.size.height);
                trace!(node_id = node.id, x = position.x, y = position.y, rank = ranks[v], "Placed node");
                PlacedNode {
                    id: node.id.to_string(),
                    position,
                    size: node.size,
                    rank: ranks[v],
                }
            })
            .collect();

        LayeredResult {
            nodes: placed,
            width: width + self.config.margin_x,
            height: height + self.config.margin_y,
        }
    }

    /// Centre of every node before translation. Ranks advance along the flow
    /// axis by their thickest member plus `rank_sep`; members of a rank are
    /// packed `node_sep` apart and centred on the cross axis.
    fn assign_centers(
        &self,
        nodes: &[LayoutNode<'_>],
        layers: &[Vec<usize>],
        direction: Direction,
    ) -> Vec<Point> {
        let vertical = direction.is_vertical();
        let along = |size: Size| if vertical { size.height } else { size.width };
        let across = |size: Size| if vertical { size.width } else { size.height };

        let mut centers = vec![Point::default(); nodes.len()];
        let mut rank_cursor = 0.0;

        for layer in layers {
            let thickness = layer
                .iter()
                .map(|&v| along(nodes[v].size))
                .fold(0.0, f64::max);
            let rank_center = rank_cursor + thickness / 2.0;

            let span: f64 = layer.iter().map(|&v| across(nodes[v].size)).sum::<f64>()
                + layer.len().saturating_sub(1) as f64 * self.config.node_sep;
            let mut cross_cursor = -span / 2.0;

            for &v in layer {
                let extent = across(nodes[v].size);
                let cross_center = cross_cursor + extent / 2.0;
                centers[v] = if vertical {
                    Point::new(cross_center, rank_center)
                } else {
                    Point::new(rank_center, cross_center)
                };
                cross_cursor += extent + self.config.node_sep;
            }

            rank_cursor += thickness + self.config.rank_sep;
        }
        centers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task<'a>(id: &'a str) -> LayoutNode<'a> {
        LayoutNode::new(id, Size::new(180.0, 60.0))
    }

    #[test]
    fn test_empty_input_yields_empty_result() {
        let result = LayeredLayoutEngine::new().layout(&[], &[], Direction::TopBottom);
        assert!(result.is_empty());
        assert_eq!(result.width, 0.0);
    }

    #[test]
    fn test_topological_order_follows_edges() {
        let graph = RankGraph::from_index_edges(3, [(2, 1), (1, 0)]);
        assert_eq!(graph.topological_order(), vec![2, 1, 0]);
    }

    #[test]
    fn test_topological_order_breaks_cycle_by_input_order() {
        let graph = RankGraph::from_index_edges(3, [(0, 1), (1, 2), (2, 0)]);
        let order = graph.topological_order();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(graph.longest_path_ranks(&order), vec![0, 1, 2]);
    }

    #[test]
    fn test_chain_ranks_are_separated() {
        let nodes = [task("a"), task("b"), task("c")];
        let edges = [("a", "b"), ("b", "c")];
        let result = LayeredLayoutEngine::new().layout(&nodes, &edges, Direction::TopBottom);

        let a = result.get("a").unwrap();
        let b = result.get("b").unwrap();
        let c = result.get("c").unwrap();
        assert_eq!(a.position.y, 40.0);
        assert_eq!(b.position.y, a.position.y + 60.0 + 80.0);
        assert_eq!(c.position.y, b.position.y + 60.0 + 80.0);
        assert_eq!(a.position.x, 40.0);
        assert_eq!(result.height, c.position.y + 60.0 + 40.0);
    }

    #[test]
    fn test_siblings_are_node_sep_apart() {
        let nodes = [task("root"), task("left"), task("right")];
        let edges = [("root", "left"), ("root", "right")];
        let result = LayeredLayoutEngine::new().layout(&nodes, &edges, Direction::TopBottom);

        let left = result.get("left").unwrap();
        let right = result.get("right").unwrap();
        assert_eq!(left.rank, right.rank);
        assert_eq!(right.position.x - (left.position.x + 180.0), 60.0);
        let min_x = result.nodes.iter().map(|n| n.position.x).fold(f64::MAX, f64::min);
        assert_eq!(min_x, 40.0);
    }

    #[test]
    fn test_left_right_advances_along_x() {
        let nodes = [task("a"), LayoutNode::new("b", Size::new(40.0, 40.0))];
        let result = LayeredLayoutEngine::new().layout(&nodes, &[("a", "b")], Direction::LeftRight);

        let a = result.get("a").unwrap();
        let b = result.get("b").unwrap();
        assert_eq!(b.position.x, a.position.x + 180.0 + 80.0);
        // centred on the same cross-axis line
        assert_eq!(a.position.y + 30.0, b.position.y + 20.0);
    }

    #[test]
    fn test_dangling_and_self_loop_edges_are_dropped() {
        let nodes = [task("a"), task("b")];
        let edges = [("a", "ghost"), ("a", "a"), ("a", "b")];
        let result = LayeredLayoutEngine::new().layout(&nodes, &edges, Direction::TopBottom);
        assert_eq!(result.nodes.len(), 2);
        assert_eq!(result.get("b").unwrap().rank, 1);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let nodes = [task("a"), LayoutNode::new("a", Size::new(10.0, 10.0))];
        let result = LayeredLayoutEngine::new().layout(&nodes, &[], Direction::TopBottom);
        assert_eq!(result.nodes.len(), 1);
        assert_eq!(result.nodes[0].size, Size::new(180.0, 60.0));
    }

    #[test]
    fn test_cycle_still_places_every_node() {
        let nodes = [task("a"), task("b"), task("c")];
        let edges = [("a", "b"), ("b", "c"), ("c", "a")];
        let result = LayeredLayoutEngine::new().layout(&nodes, &edges, Direction::TopBottom);
        assert_eq!(result.nodes.len(), 3);
        assert!(result.nodes.iter().all(|n| n.position.x >= 0.0 && n.position.y >= 0.0));
    }
}
