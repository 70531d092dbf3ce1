//! Pointer-down → move → up lifecycle of a connection drag.

use tracing::{debug, trace, warn};

use crate::auto_pan::AutoPan;
use crate::closest::closest_handle;
use crate::config::ConnectionConfig;
use crate::error::{ConnectError, Result};
use crate::feedback::HandleFeedback;
use crate::geometry::{Point, Rect};
use crate::handle::{
    HandleDescriptor, HandleId, HandleKey, HandleLookup, HandleType, NodeId, resolve_handle_type,
};
use crate::port::{
    ConnectStartParams, ConnectionStart, DiagramState, DocumentScope, FrameToken, ListenerId,
    ListenerKind, PointerEvent, Ports, ScopeId, SurfaceId,
};
use crate::validation::{Connection, ConnectionOrigin, validate_handle};

pub type ConnectionValidator = Box<dyn Fn(&Connection) -> bool>;
pub type ConnectCallback = Box<dyn FnMut(&Connection)>;
pub type PointerCallback = Box<dyn FnMut(&PointerEvent)>;

/// Per-handle inputs for starting a gesture
pub struct ConnectParams {
    pub node_id: NodeId,
    pub handle_id: Option<HandleId>,
    /// The dragged handle plays the target role
    pub is_target: bool,
    /// Set when an existing edge end is being reattached
    pub edge_updater_type: Option<HandleType>,
    pub is_valid_connection: ConnectionValidator,
    pub on_connect: Option<ConnectCallback>,
    pub on_edge_update_end: Option<PointerCallback>,
}

impl ConnectParams {
    pub fn new(node_id: impl Into<NodeId>, handle_id: Option<&str>) -> Self {
        Self {
            node_id: node_id.into(),
            handle_id: handle_id.map(str::to_string),
            is_target: false,
            edge_updater_type: None,
            is_valid_connection: Box::new(|_: &Connection| true),
            on_connect: None,
            on_edge_update_end: None,
        }
    }

    pub fn target(mut self, is_target: bool) -> Self {
        self.is_target = is_target;
        self
    }

    pub fn validator(mut self, validator: impl Fn(&Connection) -> bool + 'static) -> Self {
        self.is_valid_connection = Box::new(validator);
        self
    }

    pub fn on_connect(mut self, on_connect: impl FnMut(&Connection) + 'static) -> Self {
        self.on_connect = Some(Box::new(on_connect));
        self
    }

    pub fn edge_updater(
        mut self,
        handle_type: HandleType,
        on_edge_update_end: impl FnMut(&PointerEvent) + 'static,
    ) -> Self {
        self.edge_updater_type = Some(handle_type);
        self.on_edge_update_end = Some(Box::new(on_edge_update_end));
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// Bounds or handle type could not be resolved; nothing changed
    NotAHandle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Dragging,
    Finalizing,
}

/// State of the one active connection drag
pub struct ConnectionSession {
    origin: ConnectionOrigin,
    scope: ScopeId,
    container: Rect,
    config: ConnectionConfig,
    lookup: HandleLookup,
    /// Raw container-relative pointer position
    position: Point,
    closest: Option<HandleDescriptor>,
    feedback: HandleFeedback,
    auto_pan: AutoPan,
    listeners: Vec<ListenerId>,
    edge_updater_type: Option<HandleType>,
    is_valid_connection: ConnectionValidator,
    on_connect: Option<ConnectCallback>,
    on_edge_update_end: Option<PointerCallback>,
}

impl ConnectionSession {
    pub fn origin(&self) -> &ConnectionOrigin {
        &self.origin
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn closest(&self) -> Option<&HandleDescriptor> {
        self.closest.as_ref()
    }

    pub fn active_surface(&self) -> Option<SurfaceId> {
        self.feedback.active()
    }

    pub fn auto_pan_started(&self) -> bool {
        self.auto_pan.is_started()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Clear markers, drop the store session and unregister every listener.
    fn teardown(&mut self, scope: &mut dyn DocumentScope, state: &mut dyn DiagramState) {
        self.feedback.reset(scope);
        state.cancel_connection();
        for id in self.listeners.drain(..) {
            scope.remove_listener(id);
        }
    }

    /// Teardown for a scope that is no longer registered: markers and listeners
    /// cannot be reached, only the store session is dropped.
    fn abandon(&mut self, state: &mut dyn DiagramState) {
        warn!(
            scope = ?self.scope,
            orphaned_listeners = self.listeners.len(),
            "scope vanished before the gesture ended"
        );
        self.feedback = HandleFeedback::default();
        self.listeners.clear();
        state.cancel_connection();
    }
}

#[derive(Default)]
enum Gesture {
    #[default]
    Idle,
    Dragging(Box<ConnectionSession>),
    Finalizing,
}

/// Drives connection gestures against the host ports.
#[derive(Default)]
pub struct ConnectionController {
    gesture: Gesture,
}

impl ConnectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GesturePhase {
        match self.gesture {
            Gesture::Idle => GesturePhase::Idle,
            Gesture::Dragging(_) => GesturePhase::Dragging,
            Gesture::Finalizing => GesturePhase::Finalizing,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging(_))
    }

    pub fn session(&self) -> Option<&ConnectionSession> {
        match &self.gesture {
            Gesture::Dragging(session) => Some(session),
            _ => None,
        }
    }

    pub fn pointer_down(
        &mut self,
        event: &PointerEvent,
        params: ConnectParams,
        ports: &mut Ports<'_>,
    ) -> Result<StartOutcome> {
        if !matches!(self.gesture, Gesture::Idle) {
            return Err(ConnectError::SessionActive);
        }

        let scope = ports
            .scopes
            .resolve(event.scope)
            .ok_or(ConnectError::UnknownScope(event.scope))?;

        let config = ports.state.config();
        let container = ports.state.container_bounds();
        let handle_type =
            resolve_handle_type(params.edge_updater_type, scope.handle_type_at(event.position));

        let (Some(container), Some(handle_type)) = (container, handle_type) else {
            debug!(
                node_id = %params.node_id,
                has_bounds = container.is_some(),
                "pointer down did not land on a connectable handle"
            );
            return Ok(StartOutcome::NotAHandle);
        };

        let from = HandleKey {
            node_id: params.node_id.clone(),
            handle_id: params.handle_id.clone(),
            handle_type,
        };
        let lookup = HandleLookup::build(ports.state.nodes(), &from);
        let position = container.relative(event.position);

        ports.state.start_connection(ConnectionStart {
            position,
            node_id: params.node_id.clone(),
            handle_id: params.handle_id.clone(),
            handle_type,
        });
        ports.state.on_connect_start(
            event,
            &ConnectStartParams {
                node_id: params.node_id.clone(),
                handle_id: params.handle_id.clone(),
                handle_type,
            },
        );

        let listeners = ListenerKind::ALL
            .iter()
            .map(|kind| scope.add_listener(*kind))
            .collect();

        debug!(
            handle = %from,
            candidates = lookup.len(),
            is_target = params.is_target,
            "connection gesture started"
        );

        self.gesture = Gesture::Dragging(Box::new(ConnectionSession {
            origin: ConnectionOrigin {
                node_id: params.node_id,
                handle_id: params.handle_id,
                is_target: params.is_target,
            },
            scope: event.scope,
            container,
            config,
            lookup,
            position,
            closest: None,
            feedback: HandleFeedback::default(),
            auto_pan: AutoPan::default(),
            listeners,
            edge_updater_type: params.edge_updater_type,
            is_valid_connection: params.is_valid_connection,
            on_connect: params.on_connect,
            on_edge_update_end: params.on_edge_update_end,
        }));

        Ok(StartOutcome::Started)
    }

    pub fn pointer_move(&mut self, event: &PointerEvent, ports: &mut Ports<'_>) {
        let Gesture::Dragging(session) = &mut self.gesture else {
            return;
        };
        let session = &mut **session;
        if event.scope != session.scope {
            return;
        }
        let Some(scope) = ports.scopes.resolve(session.scope) else {
            warn!(scope = ?session.scope, "move on a scope that is no longer registered");
            return;
        };

        let transform = ports.state.transform();
        session.position = session.container.relative(event.position);
        session.closest = closest_handle(
            transform.to_diagram(session.position),
            session.config.connection_radius,
            &session.lookup,
        )
        .cloned();

        let Some(closest) = session.closest.as_ref() else {
            ports.state.set_connection_position(session.position);
            session.feedback.reset(scope);
            return;
        };

        session.auto_pan.start(
            session.config.auto_pan_on_connect,
            session.position,
            &session.container,
            &session.config.auto_pan,
            ports.state,
            ports.frames,
        );
        ports
            .state
            .set_connection_position(transform.to_renderer(closest.position));

        let result = validate_handle(
            event,
            closest,
            session.config.connection_mode,
            &session.origin,
            &*session.is_valid_connection,
            &*scope,
        );
        trace!(
            handle = %closest.key(),
            valid = result.is_valid,
            has_surface = result.surface.is_some(),
            "closest handle"
        );

        match result.surface {
            Some(surface) => session.feedback.show(scope, surface, result.is_valid),
            None => session.feedback.reset(scope),
        }
    }

    /// Finish the gesture. Returns the committed connection, if any.
    pub fn pointer_up(&mut self, event: &PointerEvent, ports: &mut Ports<'_>) -> Option<Connection> {
        match &self.gesture {
            Gesture::Dragging(session) if session.scope == event.scope => {}
            _ => return None,
        }
        let Gesture::Dragging(mut session) =
            std::mem::replace(&mut self.gesture, Gesture::Finalizing)
        else {
            return None;
        };
        let session = &mut *session;

        session.auto_pan.stop(ports.frames);

        let scope = ports.scopes.resolve(session.scope);

        let mut committed = None;
        if let (Some(document), Some(closest)) = (scope.as_deref(), session.closest.as_ref()) {
            let result = validate_handle(
                event,
                closest,
                session.config.connection_mode,
                &session.origin,
                &*session.is_valid_connection,
                document,
            );
            if result.is_valid {
                debug!(
                    source = %result.connection.source,
                    target = %result.connection.target,
                    "connection committed"
                );
                if let Some(on_connect) = session.on_connect.as_mut() {
                    on_connect(&result.connection);
                }
                committed = Some(result.connection);
            }
        }

        ports.state.on_connect_end(event);
        if session.edge_updater_type.is_some() {
            if let Some(on_edge_update_end) = session.on_edge_update_end.as_mut() {
                on_edge_update_end(event);
            }
        }

        match scope {
            Some(scope) => session.teardown(scope, ports.state),
            None => session.abandon(ports.state),
        }
        self.gesture = Gesture::Idle;
        debug!(committed = committed.is_some(), "connection gesture ended");
        committed
    }

    /// Abort the active gesture without validating or committing.
    pub fn cancel(&mut self, ports: &mut Ports<'_>) -> bool {
        if !self.is_dragging() {
            return false;
        }
        let Gesture::Dragging(mut session) = std::mem::take(&mut self.gesture) else {
            return false;
        };
        session.auto_pan.stop(ports.frames);
        match ports.scopes.resolve(session.scope) {
            Some(scope) => session.teardown(scope, ports.state),
            None => session.abandon(ports.state),
        }
        debug!("connection gesture cancelled");
        true
    }

    /// Deliver a frame requested by the auto-pan loop.
    pub fn frame(&mut self, token: FrameToken, ports: &mut Ports<'_>) -> bool {
        let Gesture::Dragging(session) = &mut self.gesture else {
            trace!(?token, "frame outside of a gesture");
            return false;
        };
        let session = &mut **session;
        session.auto_pan.tick(
            token,
            session.position,
            &session.container,
            &session.config.auto_pan,
            ports.state,
            ports.frames,
        )
    }
}
