//! Core data model and ambient plumbing
//!
//! Node and connection records, the per-kind geometry table, configuration,
//! the crate error type and logging setup.

mod config;
mod error;
mod geometry;
pub mod logging;
mod types;

pub use config::*;
pub use error::*;
pub use geometry::*;
pub use logging::*;
pub use types::*;
