//! Connection handle assignment
//!
//! Chooses the side of each endpoint shape a connection attaches to, from
//! the angle between the two shape centres in absolute coordinates.

use std::collections::HashMap;
use tracing::{debug, span, trace, Level};

use crate::core::{Connection, Node, Point, Side};

/// Ownership chains are pool → lane → content, so at most two hops
const MAX_NESTING: usize = 2;

/// Absolute position of `node`, adding the position of each owning
/// container. The walk stops at the first missing owner.
pub fn absolute_position(node: &Node, index: &HashMap<&str, &Node>) -> Point {
    let mut position = node.position;
    let mut current = node;
    for _ in 0..MAX_NESTING {
        let Some(parent) = current.parent.as_deref().and_then(|id| index.get(id).copied()) else {
            break;
        };
        position = position.offset_by(parent.position);
        current = parent;
    }
    position
}

/// Attachment sides for a connection from a shape centred at `source` to
/// one centred at `target`.
///
/// The angle from source to target is bucketed into half-open quadrants
/// centred on the cardinal directions: `[-45, 45)` right, `[45, 135)` down,
/// `[-135, -45)` up, anything else left.
pub fn pick_sides(source: Point, target: Point) -> (Side, Side) {
    let angle = (target.y - source.y).atan2(target.x - source.x).to_degrees();

    if (-45.0..45.0).contains(&angle) {
        (Side::Right, Side::Left)
    } else if (45.0..135.0).contains(&angle) {
        (Side::Bottom, Side::Top)
    } else if (-135.0..-45.0).contains(&angle) {
        (Side::Top, Side::Bottom)
    } else {
        (Side::Left, Side::Right)
    }
}

fn center(node: &Node, index: &HashMap<&str, &Node>) -> Point {
    let origin = absolute_position(node, index);
    let size = node.kind.dimensions();
    Point::new(origin.x + size.width / 2.0, origin.y + size.height / 2.0)
}

/// Assign attachment sides to every connection.
///
/// Connections touching a pool or lane, or naming a node that does not
/// exist, are returned unchanged.
pub fn assign_handles(nodes: &[Node], connections: &[Connection]) -> Vec<Connection> {
    let handles_span = span!(Level::DEBUG, "assign_handles", connections = connections.len());
    let _enter = handles_span.enter();

    let index = node_index(nodes);
    let mut assigned = 0usize;
    let result: Vec<Connection> = connections
        .iter()
        .map(|conn| {
            let mut conn = conn.clone();
            if assign_one(&mut conn, &index) {
                assigned += 1;
            }
            conn
        })
        .collect();

    debug!(assigned, skipped = connections.len() - assigned, "Handles assigned");
    result
}

/// Reassign sides in place for the connections touching `node_id` only
pub fn reassign_handles_for(nodes: &[Node], connections: &mut [Connection], node_id: &str) {
    let index = node_index(nodes);
    for conn in connections.iter_mut().filter(|c| c.touches(node_id)) {
        assign_one(conn, &index);
    }
}

fn node_index(nodes: &[Node]) -> HashMap<&str, &Node> {
    let mut index = HashMap::with_capacity(nodes.len());
    for node in nodes {
        index.entry(node.id.as_str()).or_insert(node);
    }
    index
}

fn assign_one(conn: &mut Connection, index: &HashMap<&str, &Node>) -> bool {
    let (Some(source), Some(target)) = (
        index.get(conn.source.as_str()),
        index.get(conn.target.as_str()),
    ) else {
        trace!(connection = %conn.id, "Endpoint missing, leaving unchanged");
        return false;
    };
    if source.is_container() || target.is_container() {
        trace!(connection = %conn.id, "Container endpoint, leaving unchanged");
        return false;
    }

    let (source_side, target_side) = pick_sides(center(source, index), center(target, index));
    trace!(
        connection = %conn.id,
        source_side = %source_side,
        target_side = %target_side,
        "Sides picked"
    );
    conn.source_side = Some(source_side);
    conn.target_side = Some(target_side);
    true
}
