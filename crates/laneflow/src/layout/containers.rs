//! Container layout coordinator
//!
//! Entry point of the layout pipeline. Graphs without pools go straight to
//! the layered engine. Otherwise every lane is laid out on its own, lanes are
//! stretched to a common width and stacked inside their pool, and pools are
//! stacked into a single column. Content positions come back relative to
//! their lane; lane positions relative to their pool.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info, span, trace, warn, Level};

use super::layered::{LayeredLayoutEngine, LayoutNode};
use crate::core::{
    Connection, Direction, EngineConfig, LayoutConfig, LayoutState, Node, NodeKind, Point, Size,
};
use crate::routing::{assign_handles, compute_offsets};

/// Suffix of the lane synthesized for a pool that declares none
pub const DEFAULT_LANE_SUFFIX: &str = "_default_lane";

/// Id of the lane synthesized for `pool_id`
pub fn default_lane_id(pool_id: &str) -> String {
    format!("{}{}", pool_id, DEFAULT_LANE_SUFFIX)
}

/// Lay out a diagram with the default configuration.
///
/// Returns the positioned nodes and the connections with attachment sides
/// and fan-out offsets assigned. Never fails: unknown references are
/// dropped and an empty graph gives an empty state.
pub fn layout(nodes: &[Node], connections: &[Connection], direction: Direction) -> LayoutState {
    layout_with_config(nodes, connections, direction, &EngineConfig::default())
}

/// [`layout`] with explicit spacing and container constants
pub fn layout_with_config(
    nodes: &[Node],
    connections: &[Connection],
    direction: Direction,
    config: &EngineConfig,
) -> LayoutState {
    let layout_span = span!(
        Level::INFO,
        "layout",
        node_count = nodes.len(),
        connection_count = connections.len(),
        direction = %direction
    );
    let _enter = layout_span.enter();

    let has_pools = nodes.iter().any(|n| n.kind == NodeKind::Pool);
    let laid_out = if has_pools {
        ContainerLayout::new(config, direction).run(nodes, connections)
    } else {
        debug!("No pools, using simple layout");
        let all: Vec<&Node> = nodes.iter().collect();
        simple_layout(&all, connections, direction, &config.top_level)
    };

    let handled = assign_handles(&laid_out, connections);
    let connections = compute_offsets(&handled);

    info!(
        nodes = laid_out.len(),
        connections = connections.len(),
        "Layout complete"
    );
    LayoutState::new(laid_out, connections)
}

/// Lay out `nodes` as one flat graph. Ownership is cleared: every returned
/// position is absolute.
fn simple_layout(
    nodes: &[&Node],
    connections: &[Connection],
    direction: Direction,
    config: &LayoutConfig,
) -> Vec<Node> {
    let inputs: Vec<LayoutNode<'_>> = nodes
        .iter()
        .map(|n| LayoutNode::new(&n.id, n.kind.dimensions()))
        .collect();
    let edges: Vec<(&str, &str)> = connections
        .iter()
        .map(|c| (c.source.as_str(), c.target.as_str()))
        .collect();

    let result = LayeredLayoutEngine::with_config(config.clone()).layout(&inputs, &edges, direction);
    let positions = result.positions();

    nodes
        .iter()
        .map(|node| Node {
            position: positions.get(node.id.as_str()).copied().unwrap_or_default(),
            parent: None,
            size: None,
            ..(*node).clone()
        })
        .collect()
}

/// A lane box before it is placed inside its pool
#[derive(Debug)]
struct LaneBox {
    lane: Node,
    content: Vec<Node>,
    width: f64,
    height: f64,
}

struct ContainerLayout<'a> {
    config: &'a EngineConfig,
    direction: Direction,
    lane_engine: LayeredLayoutEngine,
}

impl<'a> ContainerLayout<'a> {
    fn new(config: &'a EngineConfig, direction: Direction) -> Self {
        Self {
            config,
            direction,
            lane_engine: LayeredLayoutEngine::with_config(config.lane.clone()),
        }
    }

    fn run(&self, nodes: &[Node], connections: &[Connection]) -> Vec<Node> {
        let containers = &self.config.containers;

        // Partition; repeated ids keep their first occurrence
        let mut seen: HashSet<&str> = HashSet::new();
        let mut pools: Vec<&Node> = Vec::new();
        let mut lanes: Vec<&Node> = Vec::new();
        let mut content: Vec<&Node> = Vec::new();
        for node in nodes {
            if !seen.insert(node.id.as_str()) {
                warn!(node_id = %node.id, "Duplicate node id, keeping first occurrence");
                continue;
            }
            match node.kind {
                NodeKind::Pool => pools.push(node),
                NodeKind::Lane => lanes.push(node),
                _ => content.push(node),
            }
        }

        let pool_ids: HashSet<&str> = pools.iter().map(|p| p.id.as_str()).collect();
        let mut pool_lanes: HashMap<&str, Vec<&Node>> = HashMap::new();
        let mut stray: Vec<&Node> = Vec::new();
        for lane in lanes {
            match lane.parent.as_deref() {
                Some(pool_id) if pool_ids.contains(pool_id) => {
                    pool_lanes.entry(pool_id).or_default().push(lane)
                }
                _ => stray.push(lane),
            }
        }

        // Lane-less pools get one synthetic lane; the first of them also
        // adopts content that resolves to no lane at all
        let synthetic: HashMap<&str, String> = pools
            .iter()
            .filter(|p| !pool_lanes.contains_key(p.id.as_str()))
            .map(|p| (p.id.as_str(), default_lane_id(&p.id)))
            .collect();
        let adopter: Option<String> = pools
            .iter()
            .find_map(|p| synthetic.get(p.id.as_str()).cloned());
        let lane_ids: HashSet<String> = pool_lanes
            .values()
            .flatten()
            .map(|l| l.id.clone())
            .chain(synthetic.values().cloned())
            .collect();

        let mut members: HashMap<String, Vec<&Node>> = HashMap::new();
        for node in content {
            let owner = match node.parent.as_deref() {
                Some(parent) if lane_ids.contains(parent) => Some(parent.to_string()),
                Some(parent) => synthetic
                    .get(parent)
                    .cloned()
                    .or_else(|| adopter.clone()),
                None => adopter.clone(),
            };
            match owner {
                Some(lane_id) => members.entry(lane_id).or_default().push(node),
                None => stray.push(node),
            }
        }

        let mut out: Vec<Node> = Vec::with_capacity(nodes.len() + synthetic.len());
        let mut pool_y = 0.0;

        for pool in &pools {
            let pool_span = span!(Level::DEBUG, "pool", pool_id = %pool.id);
            let _pool_enter = pool_span.enter();

            let pool_lane_nodes: Vec<Node> = match pool_lanes.get(pool.id.as_str()) {
                Some(declared) => declared.iter().map(|l| (*l).clone()).collect(),
                None => {
                    trace!("Pool declares no lanes, synthesizing one");
                    vec![Node::new(default_lane_id(&pool.id), NodeKind::Lane, "")]
                }
            };

            let boxes: Vec<LaneBox> = pool_lane_nodes
                .into_iter()
                .map(|lane| {
                    let lane_members = members.remove(&lane.id).unwrap_or_default();
                    self.layout_lane(lane, &lane_members, connections)
                })
                .collect();

            let lane_width = boxes
                .iter()
                .map(|b| b.width)
                .fold(containers.min_lane_width, f64::max);

            let mut lane_y = 0.0;
            let mut pool_members: Vec<Node> = Vec::new();
            for lane_box in boxes {
                let mut lane = lane_box.lane;
                lane.position = Point::new(containers.pool_header_width, lane_y);
                lane.parent = Some(pool.id.clone());
                lane.size = Some(Size::new(lane_width, lane_box.height));
                lane_y += lane_box.height;
                pool_members.push(lane);
                pool_members.extend(lane_box.content);
            }

            debug!(
                lane_width,
                pool_height = lane_y,
                y = pool_y,
                "Pool stacked"
            );
            out.push(Node {
                position: Point::new(containers.pool_x, pool_y),
                parent: None,
                size: Some(Size::new(lane_width + containers.pool_header_width, lane_y)),
                ..(*pool).clone()
            });
            out.extend(pool_members);

            pool_y += lane_y + containers.pool_gap;
        }

        if !stray.is_empty() {
            warn!(
                count = stray.len(),
                "Nodes without a resolvable container, placing them below the pools"
            );
            let fallback = simple_layout(&stray, connections, self.direction, &self.config.top_level);
            out.extend(fallback.into_iter().map(|mut node| {
                node.position.y += pool_y;
                node
            }));
        }

        out
    }

    /// Lay out one lane's members in lane-relative coordinates and measure
    /// the box they need
    fn layout_lane(&self, lane: Node, members: &[&Node], connections: &[Connection]) -> LaneBox {
        let lane_span = span!(Level::DEBUG, "lane", lane_id = %lane.id, members = members.len());
        let _enter = lane_span.enter();
        let containers = &self.config.containers;

        if members.is_empty() {
            trace!("Empty lane, using placeholder box");
            return LaneBox {
                lane,
                content: Vec::new(),
                width: containers.placeholder_width,
                height: containers.placeholder_height,
            };
        }

        let member_ids: HashSet<&str> = members.iter().map(|n| n.id.as_str()).collect();
        let inputs: Vec<LayoutNode<'_>> = members
            .iter()
            .map(|n| LayoutNode::new(&n.id, n.kind.dimensions()))
            .collect();
        // Cross-lane edges are routed after layout, not laid out here
        let edges: Vec<(&str, &str)> = connections
            .iter()
            .filter(|c| {
                member_ids.contains(c.source.as_str()) && member_ids.contains(c.target.as_str())
            })
            .map(|c| (c.source.as_str(), c.target.as_str()))
            .collect();

        let result = self.lane_engine.layout(&inputs, &edges, self.direction);
        let positions = result.positions();

        let mut max_x: f64 = 0.0;
        let mut max_y: f64 = 0.0;
        let content: Vec<Node> = members
            .iter()
            .map(|node| {
                let placed = positions.get(node.id.as_str()).copied().unwrap_or_default();
                let size = node.kind.dimensions();
                let position = Point::new(placed.x + containers.lane_header_width, placed.y);
                max_x = max_x.max(position.x + size.width);
                max_y = max_y.max(position.y + size.height);
                Node {
                    position,
                    parent: Some(lane.id.clone()),
                    size: None,
                    ..(*node).clone()
                }
            })
            .collect();

        let width = max_x + containers.lane_padding.right;
        let height = (max_y + containers.lane_padding.bottom).max(containers.min_lane_height);
        trace!(width, height, "Lane measured");

        LaneBox {
            lane,
            content,
            width,
            height,
        }
    }
}
