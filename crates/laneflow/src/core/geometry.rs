//! Default shape geometry per node kind

use super::types::{NodeKind, Size};

/// Box used for kinds without authored geometry
pub const FALLBACK_SIZE: Size = Size::new(180.0, 60.0);

impl NodeKind {
    /// Default width/height of a shape of this kind
    ///
    /// Pools and lanes have no authored size; their boxes are derived by the
    /// container layout, so they report the fallback box here.
    pub fn dimensions(&self) -> Size {
        match self {
            NodeKind::StartEvent | NodeKind::EndEvent | NodeKind::IntermediateEvent => {
                Size::new(40.0, 40.0)
            }
            NodeKind::Task => Size::new(180.0, 60.0),
            NodeKind::Gateway => Size::new(50.0, 50.0),
            NodeKind::SubProcess => Size::new(200.0, 80.0),
            NodeKind::Annotation => Size::new(160.0, 40.0),
            NodeKind::Pool | NodeKind::Lane => FALLBACK_SIZE,
        }
    }
}
