//! Connection routing
//!
//! Runs on final geometry: attachment sides first, then fan-out offsets.

mod handles;
mod offsets;

pub use handles::*;
pub use offsets::*;
