//! gpui host for connection dragging: nodes with handles, committed edges
//! and the live connection line.

mod edge;
mod graph;
mod node;
mod store;
mod surface;

pub use edge::GraphEdge;
pub use graph::{ConnectionCreated, ConnectionRule, Graph};
pub use node::{GraphNode, NodeHandle};
pub use store::{ConnectionLine, ConnectionStore, FrameQueue, handle_center};
pub use surface::{HandleMarker, HandleSurfaces};

pub(crate) fn to_f32(value: gpui::Pixels) -> f32 {
    (value / gpui::px(1.0)) as f32
}
