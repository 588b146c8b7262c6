//! WebAssembly bindings for Laneflow
//!
//! JSON in, JSON out: the browser side hands over `LayoutState` documents
//! (or raw graph descriptions) and renders whatever comes back. Errors
//! surface as thrown JavaScript strings.

use wasm_bindgen::prelude::*;

use crate::core::{ConnectionKind, Direction, LayoutState, NodeKind, Point};
use crate::description::parse_description;
use crate::layout::layout;
use crate::routing::{assign_handles, compute_offsets};
use crate::session::Session;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_direction(direction: &str) -> Result<Direction, JsValue> {
    Direction::from_str(direction)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown direction: {}. Use 'TB' or 'LR'", direction)))
}

fn parse_state(state_json: &str) -> Result<LayoutState, JsValue> {
    serde_json::from_str(state_json).map_err(js_error)
}

fn to_json(state: &LayoutState) -> Result<String, JsValue> {
    serde_json::to_string(state).map_err(js_error)
}

/// Initialize WASM module
///
/// Sets up the panic hook and routes tracing output to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use crate::core::logging::init_logging;
    let _ = init_logging(Some("info"), None);
}

/// Lay out a `LayoutState` document along `direction` ("TB" or "LR")
#[wasm_bindgen]
pub fn layout_json(state_json: &str, direction: &str) -> Result<String, JsValue> {
    let direction = parse_direction(direction)?;
    let state = parse_state(state_json)?;
    to_json(&layout(&state.nodes, &state.connections, direction))
}

/// Parse a graph description (optionally fenced in markdown) and lay it out
#[wasm_bindgen]
pub fn layout_description(raw: &str, direction: &str) -> Result<String, JsValue> {
    let direction = parse_direction(direction)?;
    let state = parse_description(raw).map_err(js_error)?.into_state();
    to_json(&layout(&state.nodes, &state.connections, direction))
}

/// Re-pick attachment sides from the document's current geometry
#[wasm_bindgen]
pub fn assign_handles_json(state_json: &str) -> Result<String, JsValue> {
    let mut state = parse_state(state_json)?;
    state.connections = assign_handles(&state.nodes, &state.connections);
    to_json(&state)
}

/// Recompute fan-out offsets for the document's connections
#[wasm_bindgen]
pub fn compute_offsets_json(state_json: &str) -> Result<String, JsValue> {
    let mut state = parse_state(state_json)?;
    state.connections = compute_offsets(&state.connections);
    to_json(&state)
}

/// An editing session held on the JavaScript side
#[wasm_bindgen]
pub struct WasmSession {
    inner: Session,
}

#[wasm_bindgen]
impl WasmSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmSession {
        WasmSession {
            inner: Session::new(),
        }
    }

    /// Current state as JSON
    pub fn state(&self) -> Result<String, JsValue> {
        to_json(self.inner.state())
    }

    pub fn load(&mut self, state_json: &str) -> Result<(), JsValue> {
        let state = parse_state(state_json)?;
        self.inner.load(state.nodes, state.connections);
        Ok(())
    }

    pub fn load_description(&mut self, raw: &str) -> Result<(), JsValue> {
        let description = parse_description(raw).map_err(js_error)?;
        self.inner.load_description(description);
        Ok(())
    }

    pub fn change_direction(&mut self, direction: &str) -> Result<(), JsValue> {
        self.inner.change_direction(parse_direction(direction)?);
        Ok(())
    }

    /// Returns the new connection id
    pub fn connect(&mut self, source: &str, target: &str, message_flow: bool) -> Result<String, JsValue> {
        let kind = if message_flow {
            ConnectionKind::MessageFlow
        } else {
            ConnectionKind::SequenceFlow
        };
        self.inner.connect(source, target, kind).map_err(js_error)
    }

    pub fn reconnect(&mut self, id: &str, source: &str, target: &str) -> Result<(), JsValue> {
        self.inner.reconnect(id, source, target).map_err(js_error)
    }

    pub fn delete_connection(&mut self, id: &str) -> Result<(), JsValue> {
        self.inner.delete_connection(id).map_err(js_error)
    }

    pub fn delete_node(&mut self, id: &str) -> Result<(), JsValue> {
        self.inner.delete_node(id).map_err(js_error)
    }

    /// Returns the new node id
    pub fn drop_node(&mut self, kind: &str, x: f64, y: f64) -> Result<String, JsValue> {
        let kind: NodeKind = kind.parse().map_err(|e: String| JsValue::from_str(&e))?;
        self.inner.drop_node(kind, Point::new(x, y)).map_err(js_error)
    }

    pub fn move_node(&mut self, id: &str, x: f64, y: f64) -> Result<(), JsValue> {
        self.inner.move_node(id, Point::new(x, y)).map_err(js_error)
    }

    pub fn relabel(&mut self, id: &str, label: &str) -> Result<bool, JsValue> {
        self.inner.relabel(id, label).map_err(js_error)
    }

    pub fn undo(&mut self) -> bool {
        self.inner.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.inner.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }
}

impl Default for WasmSession {
    fn default() -> Self {
        Self::new()
    }
}
