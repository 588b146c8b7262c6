//! Editing session
//!
//! Owns the live [`LayoutState`] and applies user edits to it. Every edit
//! follows the same order: record the pre-edit state in history, apply the
//! mutation, then recompute whatever geometry depends on it (attachment
//! sides and fan-out offsets). Full reloads and direction changes start a
//! fresh history.

use tracing::{debug, info, span, Level};

use crate::core::{
    Connection, ConnectionKind, Direction, EngineConfig, FlowError, LayoutState, Node, NodeKind,
    Point, Result,
};
use crate::description::GraphDescription;
use crate::history::History;
use crate::layout::layout_with_config;
use crate::routing::{assign_handles, compute_offsets, reassign_handles_for};

/// A single-user editing session over one diagram
#[derive(Debug, Clone)]
pub struct Session {
    state: LayoutState,
    direction: Direction,
    config: EngineConfig,
    history: History,
    /// The live state differs from history's current snapshot
    dirty: bool,
    next_connection: usize,
    next_drop: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let state = LayoutState::default();
        let mut history = History::new();
        history.reset(&state);
        Self {
            state,
            direction: Direction::default(),
            config,
            history,
            dirty: false,
            next_connection: 1,
            next_drop: 1,
        }
    }

    pub fn state(&self) -> &LayoutState {
        &self.state
    }

    pub fn nodes(&self) -> &[Node] {
        &self.state.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.state.connections
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Lay out a new diagram and make it the history baseline
    pub fn load(&mut self, nodes: Vec<Node>, connections: Vec<Connection>) {
        let load_span = span!(Level::INFO, "session_load", nodes = nodes.len());
        let _enter = load_span.enter();

        self.state = layout_with_config(&nodes, &connections, self.direction, &self.config);
        self.history.reset(&self.state);
        self.dirty = false;
        info!(nodes = self.state.nodes.len(), "Diagram loaded");
    }

    pub fn load_description(&mut self, description: GraphDescription) {
        let state = description.into_state();
        self.load(state.nodes, state.connections);
    }

    /// Re-lay out the live diagram along `direction`. History restarts
    /// from the result.
    pub fn change_direction(&mut self, direction: Direction) {
        self.direction = direction;
        if self.state.nodes.is_empty() {
            return;
        }
        debug!(direction = %direction, "Changing layout direction");
        self.state = layout_with_config(
            &self.state.nodes,
            &self.state.connections,
            direction,
            &self.config,
        );
        self.history.reset(&self.state);
        self.dirty = false;
    }

    /// Connect two content nodes; returns the new connection's id
    pub fn connect(&mut self, source: &str, target: &str, kind: ConnectionKind) -> Result<String> {
        self.validate_endpoints(source, target, None)?;
        self.checkpoint();

        let id = self.fresh_connection_id();
        let conn = Connection::new(id.clone(), source, target).with_kind(kind);
        let handled = assign_handles(&self.state.nodes, std::slice::from_ref(&conn));
        self.state.connections.extend(handled);
        self.refresh_offsets();
        self.dirty = true;
        debug!(connection = %id, source, target, "Connected");
        Ok(id)
    }

    /// Move an existing connection onto new endpoints
    pub fn reconnect(&mut self, id: &str, source: &str, target: &str) -> Result<()> {
        if self.state.connection(id).is_none() {
            return Err(FlowError::unknown_connection(id));
        }
        self.validate_endpoints(source, target, Some(id))?;
        self.checkpoint();

        let index = self
            .state
            .connections
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| FlowError::unknown_connection(id))?;
        let mut conn = self.state.connections[index].clone();
        conn.source = source.to_string();
        conn.target = target.to_string();
        conn.source_side = None;
        conn.target_side = None;
        let mut handled = assign_handles(&self.state.nodes, std::slice::from_ref(&conn));
        if let Some(updated) = handled.pop() {
            self.state.connections[index] = updated;
        }
        self.refresh_offsets();
        self.dirty = true;
        debug!(connection = id, source, target, "Reconnected");
        Ok(())
    }

    pub fn delete_connection(&mut self, id: &str) -> Result<()> {
        if self.state.connection(id).is_none() {
            return Err(FlowError::unknown_connection(id));
        }
        self.checkpoint();
        self.state.connections.retain(|c| c.id != id);
        self.refresh_offsets();
        self.dirty = true;
        debug!(connection = id, "Connection deleted");
        Ok(())
    }

    /// Delete a content node together with every connection touching it.
    /// Pools and lanes cannot be deleted.
    pub fn delete_node(&mut self, id: &str) -> Result<()> {
        let node = self.state.node(id).ok_or_else(|| FlowError::unknown_node(id))?;
        if node.is_container() {
            return Err(FlowError::not_editable(format!("{} {} cannot be deleted", node.kind, id)));
        }
        self.checkpoint();
        self.state.nodes.retain(|n| n.id != id);
        self.state.connections.retain(|c| !c.touches(id));
        self.refresh_offsets();
        self.dirty = true;
        debug!(node = id, "Node deleted");
        Ok(())
    }

    /// Drop a new node from the palette, centred on `center`; returns its id
    pub fn drop_node(&mut self, kind: NodeKind, center: Point) -> Result<String> {
        if kind.is_container() {
            return Err(FlowError::not_editable(format!("{} is not in the palette", kind)));
        }
        self.checkpoint();

        let id = self.fresh_drop_id(kind);
        let size = kind.dimensions();
        let node = Node::new(id.clone(), kind, kind.default_label()).at(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
        );
        self.state.nodes.push(node);
        self.dirty = true;
        debug!(node = %id, kind = %kind, "Node dropped");
        Ok(id)
    }

    /// Finish a drag: place `id` at `position` and re-pick sides for the
    /// connections it affects
    pub fn move_node(&mut self, id: &str, position: Point) -> Result<()> {
        let node = self.state.node(id).ok_or_else(|| FlowError::unknown_node(id))?;
        if node.kind == NodeKind::Lane {
            return Err(FlowError::not_editable(format!("lane {} cannot be moved", id)));
        }
        if node.position == position {
            return Ok(());
        }
        let moves_members = node.kind == NodeKind::Pool;
        self.checkpoint();

        if let Some(node) = self.state.node_mut(id) {
            node.position = position;
        }
        if moves_members {
            // every member moved with the pool
            self.state.connections = assign_handles(&self.state.nodes, &self.state.connections);
        } else {
            reassign_handles_for(&self.state.nodes, &mut self.state.connections, id);
        }
        self.refresh_offsets();
        self.dirty = true;
        debug!(node = id, x = position.x, y = position.y, "Node moved");
        Ok(())
    }

    /// Change a node's label. Returns false, recording nothing, when the
    /// trimmed label is empty or unchanged.
    pub fn relabel(&mut self, id: &str, label: &str) -> Result<bool> {
        let node = self.state.node(id).ok_or_else(|| FlowError::unknown_node(id))?;
        let label = label.trim();
        if label.is_empty() || label == node.label {
            return Ok(false);
        }
        self.checkpoint();
        if let Some(node) = self.state.node_mut(id) {
            node.label = label.to_string();
        }
        self.dirty = true;
        Ok(true)
    }

    /// Returns false when there is nothing to undo
    pub fn undo(&mut self) -> bool {
        self.checkpoint();
        match self.history.undo() {
            Some(state) => {
                self.state = state;
                debug!("Undo applied");
                true
            }
            None => false,
        }
    }

    /// Returns false when there is nothing to redo
    pub fn redo(&mut self) -> bool {
        self.checkpoint();
        match self.history.redo() {
            Some(state) => {
                self.state = state;
                debug!("Redo applied");
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.dirty || self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.dirty && self.history.can_redo()
    }

    /// Record the live state unless history already holds it
    fn checkpoint(&mut self) {
        if self.dirty {
            self.history.snapshot(&self.state);
            self.dirty = false;
        }
    }

    fn refresh_offsets(&mut self) {
        self.state.connections = compute_offsets(&self.state.connections);
    }

    fn validate_endpoints(&self, source: &str, target: &str, exclude: Option<&str>) -> Result<()> {
        if source == target {
            return Err(FlowError::SelfLoop {
                node: source.to_string(),
            });
        }
        for id in [source, target] {
            let node = self.state.node(id).ok_or_else(|| FlowError::unknown_node(id))?;
            if node.is_container() {
                return Err(FlowError::ContainerEndpoint { id: id.to_string() });
            }
        }
        let duplicate = self.state.connections.iter().any(|c| {
            c.source == source && c.target == target && Some(c.id.as_str()) != exclude
        });
        if duplicate {
            return Err(FlowError::DuplicateConnection {
                source_id: source.to_string(),
                target_id: target.to_string(),
            });
        }
        Ok(())
    }

    fn fresh_connection_id(&mut self) -> String {
        loop {
            let id = format!("flow_{}", self.next_connection);
            self.next_connection += 1;
            if self.state.connection(&id).is_none() {
                return id;
            }
        }
    }

    fn fresh_drop_id(&mut self, kind: NodeKind) -> String {
        loop {
            let id = format!("dropped_{}_{}", kind, self.next_drop);
            self.next_drop += 1;
            if self.state.node(&id).is_none() {
                return id;
            }
        }
    }
}
