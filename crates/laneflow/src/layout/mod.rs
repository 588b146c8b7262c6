//! Layout pipeline
//!
//! The layered engine positions a flat graph; the container coordinator runs
//! it once per lane and assembles pools around the results.

mod containers;
pub mod layered;
mod ordering;

pub use containers::*;
pub use layered::{LayeredLayoutEngine, LayeredResult, LayoutNode, PlacedNode};
