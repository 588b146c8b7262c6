//! Core error types
//!
//! The layout, handle and offset pipeline never fails; these errors come from
//! the boundaries around it: ingesting a graph description and validating
//! edits made in a session.

use thiserror::Error;

/// Errors raised at the edges of the layout pipeline
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Invalid description: {message}")]
    Description { message: String },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("Self-loop rejected: node {node} cannot connect to itself")]
    SelfLoop { node: String },

    #[error("Unknown node: {id}")]
    UnknownNode { id: String },

    #[error("Unknown connection: {id}")]
    UnknownConnection { id: String },

    #[error("Connection from {source_id} to {target_id} already exists")]
    DuplicateConnection { source_id: String, target_id: String },

    #[error("Containers are not connectable: {id}")]
    ContainerEndpoint { id: String },

    #[error("Not editable: {message}")]
    NotEditable { message: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, FlowError>;

impl FlowError {
    /// Create a new description error
    pub fn description(message: impl Into<String>) -> Self {
        Self::Description {
            message: message.into(),
        }
    }

    /// Create a new unknown-node error
    pub fn unknown_node(id: impl Into<String>) -> Self {
        Self::UnknownNode { id: id.into() }
    }

    /// Create a new unknown-connection error
    pub fn unknown_connection(id: impl Into<String>) -> Self {
        Self::UnknownConnection { id: id.into() }
    }

    /// Create a new not-editable error
    pub fn not_editable(message: impl Into<String>) -> Self {
        Self::NotEditable {
            message: message.into(),
        }
    }
}
