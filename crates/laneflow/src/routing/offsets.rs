//! Connection offset fan-out
//!
//! Connections leaving the same node would be drawn on top of each other.
//! Each one gets a perpendicular offset, spaced evenly and centred on the
//! undisplaced line.

use std::collections::HashMap;
use tracing::trace;

use crate::core::{Connection, ConnectionOffset};

/// Spacing between sibling connections
pub const OFFSET_STEP: f64 = 15.0;

/// Offset of the `index`-th of `count` siblings
pub fn fan_offset(index: usize, count: usize) -> f64 {
    (index as f64 - (count as f64 - 1.0) / 2.0) * OFFSET_STEP
}

/// Recompute offsets for every connection, grouped by source node.
///
/// Group order follows input order. A connection with no sibling has its
/// offset cleared.
pub fn compute_offsets(connections: &[Connection]) -> Vec<Connection> {
    let mut group_sizes: HashMap<&str, usize> = HashMap::new();
    for conn in connections {
        *group_sizes.entry(conn.source.as_str()).or_insert(0) += 1;
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    connections
        .iter()
        .map(|conn| {
            let count = group_sizes.get(conn.source.as_str()).copied().unwrap_or(0);
            let slot = seen.entry(conn.source.as_str()).or_insert(0);
            let index = *slot;
            *slot += 1;

            let mut conn = conn.clone();
            conn.offset = if count > 1 {
                let offset = fan_offset(index, count);
                trace!(connection = %conn.id, offset, "Fanned out");
                Some(ConnectionOffset {
                    source: offset,
                    target: offset,
                })
            } else {
                None
            };
            conn
        })
        .collect()
}
