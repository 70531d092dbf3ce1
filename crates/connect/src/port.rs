//! Narrow interfaces between the gesture engine and its host.
//!
//! The host owns diagram state, event scopes, handle surfaces and the frame
//! clock. The engine only sees them through these traits, which keeps it free
//! of any particular UI toolkit.

use crate::config::ConnectionConfig;
use crate::geometry::{Point, Rect, Transform};
use crate::handle::{HandleId, HandleKey, HandleType, NodeGeometry, NodeId};

/// Identifies an isolated event scope (a window or an embedded surface)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u64);

/// Opaque reference to a rendered handle surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    MouseMove,
    MouseUp,
    TouchMove,
    TouchEnd,
}

impl ListenerKind {
    pub const ALL: [ListenerKind; 4] = [
        ListenerKind::MouseMove,
        ListenerKind::MouseUp,
        ListenerKind::TouchMove,
        ListenerKind::TouchEnd,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// A pointer event in window ("client") coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    pub kind: PointerKind,
    pub scope: ScopeId,
}

impl PointerEvent {
    pub fn mouse(scope: ScopeId, position: Point) -> Self {
        Self {
            position,
            kind: PointerKind::Mouse,
            scope,
        }
    }

    pub fn touch(scope: ScopeId, position: Point) -> Self {
        Self {
            position,
            kind: PointerKind::Touch,
            scope,
        }
    }
}

/// Session fields written to the store when a gesture starts
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionStart {
    pub position: Point,
    pub node_id: NodeId,
    pub handle_id: Option<HandleId>,
    pub handle_type: HandleType,
}

/// Payload of the connect-start callback
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectStartParams {
    pub node_id: NodeId,
    pub handle_id: Option<HandleId>,
    pub handle_type: HandleType,
}

/// The slice of diagram state the gesture engine reads and writes.
pub trait DiagramState {
    fn config(&self) -> ConnectionConfig;
    /// Container bounds in window coordinates; `None` while not laid out
    fn container_bounds(&self) -> Option<Rect>;
    fn transform(&self) -> Transform;
    fn nodes(&self) -> &[NodeGeometry];

    fn start_connection(&mut self, start: ConnectionStart);
    /// Container-relative position of the loose end of the connection line
    fn set_connection_position(&mut self, position: Point);
    fn pan_by(&mut self, delta: Point);
    fn cancel_connection(&mut self);

    fn on_connect_start(&mut self, _event: &PointerEvent, _params: &ConnectStartParams) {}
    fn on_connect_end(&mut self, _event: &PointerEvent) {}
}

/// Marker capability on handle surfaces
pub trait HandleMarkers {
    fn mark_connecting(&mut self, surface: SurfaceId);
    fn mark_validity(&mut self, surface: SurfaceId, valid: bool);
    fn clear(&mut self, surface: SurfaceId);
}

/// An event scope: owns handle surfaces and pointer listeners.
pub trait DocumentScope: HandleMarkers {
    /// Identity of the topmost handle surface under a window position
    fn handle_at(&self, position: Point) -> Option<HandleKey>;

    /// Type of the handle surface under a window position, if any
    fn handle_type_at(&self, position: Point) -> Option<HandleType> {
        self.handle_at(position).map(|key| key.handle_type)
    }

    fn handle_surface(&self, handle: &HandleKey) -> Option<SurfaceId>;
    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId;
    fn remove_listener(&mut self, id: ListenerId);
}

pub trait ScopeRegistry {
    fn resolve(&mut self, scope: ScopeId) -> Option<&mut dyn DocumentScope>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// Frame clock used by the auto-pan loop
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameToken;
    fn cancel_frame(&mut self, token: FrameToken);
}

/// Borrowed host ports handed to every controller call
pub struct Ports<'a> {
    pub state: &'a mut dyn DiagramState,
    pub scopes: &'a mut dyn ScopeRegistry,
    pub frames: &'a mut dyn FrameScheduler,
}
