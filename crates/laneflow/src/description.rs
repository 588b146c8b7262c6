//! Graph description ingest
//!
//! The graph to lay out arrives as JSON produced by an upstream model: a node
//! list, an edge list and optional pools with their lanes. Lanes list their
//! members by id; ingest turns that into ownership on the nodes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, span, warn, Level};

use crate::core::{
    Connection, ConnectionKind, FlowError, GatewayKind, LayoutState, Node, NodeKind, Result,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribedNode {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_kind: Option<GatewayKind>,
    /// Owner used when no lane lists this node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribedEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: ConnectionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribedLane {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub node_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribedPool {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub lanes: Vec<DescribedLane>,
}

/// A parsed graph description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDescription {
    pub nodes: Vec<DescribedNode>,
    pub edges: Vec<DescribedEdge>,
    #[serde(default)]
    pub pools: Vec<DescribedPool>,
}

fn keep(id: &str, seen: &mut HashSet<String>) -> bool {
    let fresh = seen.insert(id.to_string());
    if !fresh {
        warn!(node_id = id, "Duplicate id in description, dropped");
    }
    fresh
}

/// Remove a surrounding markdown code fence, with or without a `json` tag
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_end();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse a description, tolerating a markdown code fence around the JSON
pub fn parse_description(raw: &str) -> Result<GraphDescription> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))?;

    if !value.get("nodes").is_some_and(Value::is_array) {
        return Err(FlowError::description("missing nodes array"));
    }
    if !value.get("edges").is_some_and(Value::is_array) {
        return Err(FlowError::description("missing edges array"));
    }

    let description: GraphDescription = serde_json::from_value(value)?;
    debug!(
        nodes = description.nodes.len(),
        edges = description.edges.len(),
        pools = description.pools.len(),
        "Parsed graph description"
    );
    Ok(description)
}

impl GraphDescription {
    pub fn lane_count(&self) -> usize {
        self.pools.iter().map(|p| p.lanes.len()).sum()
    }

    /// Build an unpositioned layout state.
    ///
    /// Pools come first, each followed by its lanes, then the content nodes.
    /// A node listed by several lanes belongs to the first. Repeated ids,
    /// self-loops and edges naming unknown nodes are dropped.
    pub fn into_state(self) -> LayoutState {
        let ingest_span = span!(Level::DEBUG, "ingest_description");
        let _enter = ingest_span.enter();

        let mut membership: HashMap<String, String> = HashMap::new();
        for lane in self.pools.iter().flat_map(|p| &p.lanes) {
            for node_id in &lane.node_ids {
                membership
                    .entry(node_id.clone())
                    .or_insert_with(|| lane.id.clone());
            }
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut nodes: Vec<Node> = Vec::new();

        for pool in self.pools {
            if keep(&pool.id, &mut seen) {
                nodes.push(Node::new(pool.id.clone(), NodeKind::Pool, pool.label));
            }
            for lane in pool.lanes {
                if keep(&lane.id, &mut seen) {
                    nodes.push(Node::new(lane.id, NodeKind::Lane, lane.label).in_container(&pool.id));
                }
            }
        }

        for described in self.nodes {
            if !keep(&described.id, &mut seen) {
                continue;
            }
            let parent = membership.remove(&described.id).or(described.parent_id);
            let mut node = Node::new(described.id, described.kind, described.label);
            node.gateway_kind = described.gateway_kind;
            node.parent = parent;
            nodes.push(node);
        }

        let connections: Vec<Connection> = self
            .edges
            .into_iter()
            .filter(|edge| {
                let valid = edge.source != edge.target
                    && seen.contains(&edge.source)
                    && seen.contains(&edge.target);
                if !valid {
                    warn!(edge_id = %edge.id, "Self-loop or dangling edge in description, dropped");
                }
                valid
            })
            .map(|edge| {
                let conn = Connection::new(edge.id, edge.source, edge.target).with_kind(edge.kind);
                match edge.label {
                    Some(label) => conn.with_label(label),
                    None => conn,
                }
            })
            .collect();

        debug!(nodes = nodes.len(), connections = connections.len(), "Description ingested");
        LayoutState::new(nodes, connections)
    }
}
