//! Core type definitions for flow diagram layout
//!
//! This module contains the fundamental types used throughout Laneflow:
//! node kinds, connection kinds, attachment sides, layout direction, and
//! the node/connection records that make up a layout state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 2-D point in layout units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise sum, used when walking container frames
    pub fn offset_by(self, other: Point) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

/// Width/height pair in layout units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Node kinds of a process diagram
///
/// Serialized in camelCase (`startEvent`, `subProcess`, ...) which is the
/// vocabulary of the graph descriptions produced upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    StartEvent,
    EndEvent,
    IntermediateEvent,
    #[default]
    Task,
    Gateway,
    SubProcess,
    /// Top-level swimlane container
    Pool,
    /// Sub-container of a pool
    Lane,
    Annotation,
}

impl NodeKind {
    /// Every kind, in declaration order
    pub const ALL: [NodeKind; 9] = [
        NodeKind::StartEvent,
        NodeKind::EndEvent,
        NodeKind::IntermediateEvent,
        NodeKind::Task,
        NodeKind::Gateway,
        NodeKind::SubProcess,
        NodeKind::Pool,
        NodeKind::Lane,
        NodeKind::Annotation,
    ];

    /// Returns true for pools and lanes
    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Pool | NodeKind::Lane)
    }

    /// Kinds that can be dropped onto the canvas from the palette
    pub fn palette() -> impl Iterator<Item = NodeKind> {
        Self::ALL.into_iter().filter(|k| !k.is_container())
    }

    /// Label given to a node freshly dropped from the palette
    pub fn default_label(&self) -> &'static str {
        match self {
            NodeKind::StartEvent => "Start",
            NodeKind::EndEvent => "End",
            _ => "New",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::StartEvent => "startEvent",
            NodeKind::EndEvent => "endEvent",
            NodeKind::IntermediateEvent => "intermediateEvent",
            NodeKind::Task => "task",
            NodeKind::Gateway => "gateway",
            NodeKind::SubProcess => "subProcess",
            NodeKind::Pool => "pool",
            NodeKind::Lane => "lane",
            NodeKind::Annotation => "annotation",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    /// Accepts the camelCase wire names as well as kebab-case (`start-event`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        NodeKind::ALL
            .into_iter()
            .find(|k| k.as_str().to_lowercase() == folded)
            .ok_or_else(|| format!("Unknown node kind: {}", s))
    }
}

/// Gateway sub-kind, only meaningful for [`NodeKind::Gateway`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GatewayKind {
    Exclusive,
    Parallel,
    Inclusive,
}

impl fmt::Display for GatewayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayKind::Exclusive => write!(f, "exclusive"),
            GatewayKind::Parallel => write!(f, "parallel"),
            GatewayKind::Inclusive => write!(f, "inclusive"),
        }
    }
}

/// Connection kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionKind {
    #[default]
    SequenceFlow,
    /// Conventionally crosses pool boundaries
    MessageFlow,
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionKind::SequenceFlow => write!(f, "sequenceFlow"),
            ConnectionKind::MessageFlow => write!(f, "messageFlow"),
        }
    }
}

/// Side of a shape a connection attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// Returns true when the perpendicular offset for this side runs along x
    pub fn is_horizontal_edge(&self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Top => write!(f, "top"),
            Side::Right => write!(f, "right"),
            Side::Bottom => write!(f, "bottom"),
            Side::Left => write!(f, "left"),
        }
    }
}

/// Layout flow direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Ranks stack downward (TB)
    #[default]
    #[serde(rename = "TB")]
    TopBottom,
    /// Ranks stack rightward (LR)
    #[serde(rename = "LR")]
    LeftRight,
}

impl Direction {
    /// Parse direction from its short name (TB, TD, LR)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "TB" | "TD" => Some(Direction::TopBottom),
            "LR" => Some(Direction::LeftRight),
            _ => None,
        }
    }

    /// Returns true if ranks are laid out along the y axis
    pub fn is_vertical(&self) -> bool {
        matches!(self, Direction::TopBottom)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::TopBottom => write!(f, "TB"),
            Direction::LeftRight => write!(f, "LR"),
        }
    }
}

/// A node of the diagram with all its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier for the node
    pub id: String,
    pub kind: NodeKind,
    /// Display label
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_kind: Option<GatewayKind>,
    /// Id of the owning lane or pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Relative to the owning container, or absolute when unowned
    #[serde(default)]
    pub position: Point,
    /// Computed box of pools and lanes; never authored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

impl Node {
    /// Create a new unowned node at the origin
    pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            gateway_kind: None,
            parent: None,
            position: Point::default(),
            size: None,
        }
    }

    /// Builder: set the owning container
    pub fn in_container(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Builder: set the gateway sub-kind
    pub fn with_gateway_kind(mut self, gateway_kind: GatewayKind) -> Self {
        self.gateway_kind = Some(gateway_kind);
        self
    }

    /// Builder: set the position
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Point::new(x, y);
        self
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Computed box for containers, the kind's default box otherwise
    pub fn extent(&self) -> Size {
        self.size.unwrap_or_else(|| self.kind.dimensions())
    }
}

/// Signed perpendicular displacement of a connection's endpoints
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConnectionOffset {
    pub source: f64,
    pub target: f64,
}

/// A directed connection between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub kind: ConnectionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_side: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_side: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<ConnectionOffset>,
}

impl Connection {
    /// Create a new sequence-flow connection
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind: ConnectionKind::SequenceFlow,
            label: None,
            source_side: None,
            target_side: None,
            offset: None,
        }
    }

    /// Builder: set the connection kind
    pub fn with_kind(mut self, kind: ConnectionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Builder: set the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns true if either endpoint is the given node
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// The full editable state: nodes plus connections
///
/// Snapshots stored by [`crate::history::History`] are owned clones of this
/// type; nothing in it is reference-counted, so a clone never aliases the
/// live state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutState {
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
}

impl LayoutState {
    pub fn new(nodes: Vec<Node>, connections: Vec<Connection>) -> Self {
        Self { nodes, connections }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parsing() {
        assert_eq!(Direction::from_str("TB"), Some(Direction::TopBottom));
        assert_eq!(Direction::from_str("td"), Some(Direction::TopBottom));
        assert_eq!(Direction::from_str("lr"), Some(Direction::LeftRight));
        assert_eq!(Direction::from_str("RL"), None);
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::TopBottom.to_string(), "TB");
        assert_eq!(Direction::LeftRight.to_string(), "LR");
    }

    #[test]
    fn test_node_kind_wire_names() {
        let json = serde_json::to_string(&NodeKind::SubProcess).unwrap();
        assert_eq!(json, "\"subProcess\"");
        let kind: NodeKind = serde_json::from_str("\"startEvent\"").unwrap();
        assert_eq!(kind, NodeKind::StartEvent);
    }

    #[test]
    fn test_node_kind_from_str_accepts_kebab_case() {
        assert_eq!("start-event".parse::<NodeKind>(), Ok(NodeKind::StartEvent));
        assert_eq!("subProcess".parse::<NodeKind>(), Ok(NodeKind::SubProcess));
        assert_eq!("LANE".parse::<NodeKind>(), Ok(NodeKind::Lane));
        assert!("swimlane".parse::<NodeKind>().is_err());
    }

    #[test]
    fn test_palette_excludes_containers() {
        let palette: Vec<_> = NodeKind::palette().collect();
        assert_eq!(palette.len(), 7);
        assert!(palette.iter().all(|k| !k.is_container()));
    }

    #[test]
    fn test_node_builders() {
        let node = Node::new("g1", NodeKind::Gateway, "Approved?")
            .with_gateway_kind(GatewayKind::Exclusive)
            .in_container("lane_a")
            .at(10.0, 20.0);
        assert_eq!(node.parent.as_deref(), Some("lane_a"));
        assert_eq!(node.gateway_kind, Some(GatewayKind::Exclusive));
        assert_eq!(node.position, Point::new(10.0, 20.0));
        assert_eq!(node.extent(), Size::new(50.0, 50.0));
    }

    #[test]
    fn test_connection_serialization_omits_unset_fields() {
        let conn = Connection::new("e1", "a", "b");
        let json = serde_json::to_value(&conn).unwrap();
        assert_eq!(json["kind"], "sequenceFlow");
        assert!(json.get("sourceSide").is_none());
        assert!(json.get("offset").is_none());
    }

    #[test]
    fn test_connection_touches() {
        let conn = Connection::new("e1", "a", "b");
        assert!(conn.touches("a"));
        assert!(conn.touches("b"));
        assert!(!conn.touches("c"));
    }
}
