//! Connection-drag gesture engine for node-based diagram editors.
//!
//! [`ConnectionController`] runs the press → drag → release gesture that draws
//! a new edge between two handles. It finds the closest handle on every move,
//! validates the candidate edge, keeps one handle surface highlighted, pans the
//! viewport near the container edges and commits or cancels on release. All
//! host state is reached through the traits in [`port`].

mod auto_pan;
mod closest;
mod config;
mod error;
mod feedback;
mod geometry;
mod gesture;
mod handle;
pub mod port;
mod validation;

pub use auto_pan::{AutoPan, calc_auto_pan};
pub use closest::closest_handle;
pub use config::{AutoPanConfig, ConnectionConfig, ConnectionMode};
pub use error::{ConnectError, Result};
pub use feedback::HandleFeedback;
pub use geometry::{Point, Rect, Transform, point};
pub use gesture::{
    ConnectCallback, ConnectParams, ConnectionController, ConnectionSession, ConnectionValidator,
    GesturePhase, PointerCallback, StartOutcome,
};
pub use handle::{
    HandleBound, HandleBounds, HandleDescriptor, HandleId, HandleKey, HandleLookup, HandleType,
    NodeGeometry, NodeId, resolve_handle_type,
};
pub use port::{
    ConnectStartParams, ConnectionStart, DiagramState, DocumentScope, FrameScheduler, FrameToken,
    HandleMarkers, ListenerId, ListenerKind, PointerEvent, PointerKind, Ports, ScopeId,
    ScopeRegistry, SurfaceId,
};
pub use validation::{Connection, ConnectionOrigin, ValidationResult, validate_handle};
