//! Laneflow - Deterministic layout for swimlane process diagrams
//!
//! Takes a graph of typed process nodes, optionally nested in pools and
//! lanes, and computes non-overlapping geometry, connection attachment sides
//! and fan-out offsets. An editing [`Session`](session::Session) keeps a
//! bounded undo/redo history of the result.
//!
//! # Quick Start
//!
//! ```rust
//! use laneflow::prelude::*;
//!
//! let nodes = vec![
//!     Node::new("start", NodeKind::StartEvent, "Start"),
//!     Node::new("review", NodeKind::Task, "Review"),
//!     Node::new("end", NodeKind::EndEvent, "End"),
//! ];
//! let connections = vec![
//!     Connection::new("e1", "start", "review"),
//!     Connection::new("e2", "review", "end"),
//! ];
//!
//! let state = layout(&nodes, &connections, Direction::TopBottom);
//! let start = state.node("start").unwrap();
//! let end = state.node("end").unwrap();
//! assert!(end.position.y > start.position.y);
//! assert_eq!(state.connections[0].source_side, Some(Side::Bottom));
//! ```
//!
//! # From a graph description
//!
//! ```rust
//! use laneflow::{layout_description, Direction, NodeKind};
//!
//! let raw = r#"{
//!   "nodes": [{"id": "t", "type": "task", "label": "Ship"}],
//!   "edges": [],
//!   "pools": [{"id": "p", "label": "Team", "lanes": [{"id": "l", "label": "Ops", "nodeIds": ["t"]}]}]
//! }"#;
//!
//! let state = layout_description(raw, Direction::LeftRight).unwrap();
//! assert_eq!(state.node("p").unwrap().kind, NodeKind::Pool);
//! assert_eq!(state.node("t").unwrap().parent.as_deref(), Some("l"));
//! ```

pub mod core;
pub mod description;
pub mod history;
pub mod layout;
pub mod routing;
pub mod session;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use core::*;
pub use description::{parse_description, GraphDescription};
pub use history::{History, HISTORY_CAPACITY};
pub use layout::{layout, layout_with_config};
pub use routing::{assign_handles, compute_offsets};
pub use session::Session;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Connection, ConnectionKind, ConnectionOffset, Direction, EngineConfig, FlowError,
        GatewayKind, LayoutConfig, LayoutState, Node, NodeKind, Point, Side, Size,
    };
    pub use crate::description::{parse_description, GraphDescription};
    pub use crate::history::History;
    pub use crate::layout::{layout, layout_with_config, LayeredLayoutEngine};
    pub use crate::routing::{assign_handles, compute_offsets};
    pub use crate::session::Session;
}

/// Parse a graph description and lay it out
///
/// # Arguments
/// * `raw` - description JSON, optionally wrapped in a markdown code fence
/// * `direction` - flow direction inside every lane
///
/// # Returns
/// * `Ok(LayoutState)` - positioned nodes and routed connections
/// * `Err` - if the description is not valid JSON or lacks its arrays
pub fn layout_description(raw: &str, direction: Direction) -> Result<LayoutState> {
    let state = parse_description(raw)?.into_state();
    Ok(layout(&state.nodes, &state.connections, direction))
}
