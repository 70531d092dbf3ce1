use serde::{Deserialize, Serialize};

use crate::config::ConnectionMode;
use crate::handle::{HandleDescriptor, HandleId, HandleType, NodeId};
use crate::port::{DocumentScope, PointerEvent, SurfaceId};

/// A directed edge candidate between two handles
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub source: NodeId,
    pub source_handle: Option<HandleId>,
    pub target: NodeId,
    pub target_handle: Option<HandleId>,
}

/// The handle a gesture was started from, with the role it plays
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionOrigin {
    pub node_id: NodeId,
    pub handle_id: Option<HandleId>,
    pub is_target: bool,
}

impl ConnectionOrigin {
    pub fn role(&self) -> HandleType {
        if self.is_target {
            HandleType::Target
        } else {
            HandleType::Source
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValidationResult {
    pub connection: Connection,
    pub surface: Option<SurfaceId>,
    pub is_valid: bool,
}

/// Build the candidate between `origin` and the handle the pointer targets and
/// decide whether it may be committed.
///
/// The targeted handle is the surface under `event`, falling back to `closest`
/// when the pointer is not over any handle. `is_valid_connection` is consulted
/// only for pairings that pass the same-node rule and the connection mode.
pub fn validate_handle(
    event: &PointerEvent,
    closest: &HandleDescriptor,
    connection_mode: ConnectionMode,
    origin: &ConnectionOrigin,
    is_valid_connection: &dyn Fn(&Connection) -> bool,
    scope: &dyn DocumentScope,
) -> ValidationResult {
    let handle = scope
        .handle_at(event.position)
        .unwrap_or_else(|| closest.key());
    let surface = scope.handle_surface(&handle);

    let connection = if origin.is_target {
        Connection {
            source: handle.node_id.clone(),
            source_handle: handle.handle_id.clone(),
            target: origin.node_id.clone(),
            target_handle: origin.handle_id.clone(),
        }
    } else {
        Connection {
            source: origin.node_id.clone(),
            source_handle: origin.handle_id.clone(),
            target: handle.node_id.clone(),
            target_handle: handle.handle_id.clone(),
        }
    };

    let allowed = connection.source != connection.target
        && match connection_mode {
            ConnectionMode::Strict => handle.handle_type != origin.role(),
            ConnectionMode::Loose => {
                handle.node_id != origin.node_id || handle.handle_id != origin.handle_id
            }
        };

    let is_valid = allowed && is_valid_connection(&connection);

    ValidationResult {
        connection,
        surface,
        is_valid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, point};
    use crate::handle::HandleKey;
    use crate::port::{HandleMarkers, ListenerId, ListenerKind, ScopeId};
    use std::cell::Cell;

    #[derive(Default)]
    struct Surfaces {
        known: Vec<HandleKey>,
        under_pointer: Option<HandleKey>,
    }

    impl HandleMarkers for Surfaces {
        fn mark_connecting(&mut self, _surface: SurfaceId) {}
        fn mark_validity(&mut self, _surface: SurfaceId, _valid: bool) {}
        fn clear(&mut self, _surface: SurfaceId) {}
    }

    impl DocumentScope for Surfaces {
        fn handle_at(&self, _position: Point) -> Option<HandleKey> {
            self.under_pointer.clone()
        }

        fn handle_surface(&self, handle: &HandleKey) -> Option<SurfaceId> {
            self.known
                .iter()
                .position(|k| k == handle)
                .map(|i| SurfaceId(i as u64))
        }

        fn add_listener(&mut self, _kind: ListenerKind) -> ListenerId {
            ListenerId(0)
        }

        fn remove_listener(&mut self, _id: ListenerId) {}
    }

    fn descriptor(node: &str, handle: &str, handle_type: HandleType) -> HandleDescriptor {
        HandleDescriptor {
            node_id: node.into(),
            handle_id: Some(handle.into()),
            handle_type,
            position: point(0.0, 0.0),
        }
    }

    fn origin(node: &str, handle: &str, is_target: bool) -> ConnectionOrigin {
        ConnectionOrigin {
            node_id: node.into(),
            handle_id: Some(handle.into()),
            is_target,
        }
    }

    fn event() -> PointerEvent {
        PointerEvent::mouse(ScopeId(1), point(0.0, 0.0))
    }

    fn always(_: &Connection) -> bool {
        true
    }

    #[test]
    fn source_role_points_from_origin_to_closest() {
        let closest = descriptor("b", "in", HandleType::Target);
        let result = validate_handle(
            &event(),
            &closest,
            ConnectionMode::Strict,
            &origin("a", "out", false),
            &always,
            &Surfaces::default(),
        );
        assert!(result.is_valid);
        assert_eq!(result.connection.source, "a");
        assert_eq!(result.connection.source_handle.as_deref(), Some("out"));
        assert_eq!(result.connection.target, "b");
        assert_eq!(result.connection.target_handle.as_deref(), Some("in"));
    }

    #[test]
    fn target_role_points_from_closest_to_origin() {
        let closest = descriptor("b", "out", HandleType::Source);
        let result = validate_handle(
            &event(),
            &closest,
            ConnectionMode::Strict,
            &origin("a", "in", true),
            &always,
            &Surfaces::default(),
        );
        assert!(result.is_valid);
        assert_eq!(result.connection.source, "b");
        assert_eq!(result.connection.target, "a");
    }

    #[test]
    fn strict_mode_rejects_target_to_target_even_if_host_accepts() {
        let closest = descriptor("b", "in", HandleType::Target);
        let result = validate_handle(
            &event(),
            &closest,
            ConnectionMode::Strict,
            &origin("a", "in", true),
            &always,
            &Surfaces::default(),
        );
        assert!(!result.is_valid);
    }

    #[test]
    fn loose_mode_allows_same_role_pairs() {
        let closest = descriptor("b", "in", HandleType::Target);
        let result = validate_handle(
            &event(),
            &closest,
            ConnectionMode::Loose,
            &origin("a", "in", true),
            &always,
            &Surfaces::default(),
        );
        assert!(result.is_valid);
    }

    #[test]
    fn same_node_is_never_valid_and_host_is_not_asked() {
        let asked = Cell::new(false);
        let predicate = |_: &Connection| {
            asked.set(true);
            true
        };
        for mode in [ConnectionMode::Strict, ConnectionMode::Loose] {
            let closest = descriptor("a", "in", HandleType::Target);
            let result = validate_handle(
                &event(),
                &closest,
                mode,
                &origin("a", "out", false),
                &predicate,
                &Surfaces::default(),
            );
            assert!(!result.is_valid);
            assert_eq!(result.connection.source, result.connection.target);
        }
        assert!(!asked.get());
    }

    #[test]
    fn host_predicate_can_veto() {
        let closest = descriptor("b", "in", HandleType::Target);
        let result = validate_handle(
            &event(),
            &closest,
            ConnectionMode::Strict,
            &origin("a", "out", false),
            &|_: &Connection| false,
            &Surfaces::default(),
        );
        assert!(!result.is_valid);
    }

    #[test]
    fn missing_surface_still_yields_candidate() {
        let closest = descriptor("b", "in", HandleType::Target);
        let surfaces = Surfaces {
            known: vec![HandleKey::new("c", Some("in"), HandleType::Target), closest.key()],
            ..Default::default()
        };
        let found = validate_handle(
            &event(),
            &closest,
            ConnectionMode::Strict,
            &origin("a", "out", false),
            &always,
            &surfaces,
        );
        assert_eq!(found.surface, Some(SurfaceId(1)));

        let missing = validate_handle(
            &event(),
            &closest,
            ConnectionMode::Strict,
            &origin("a", "out", false),
            &always,
            &Surfaces::default(),
        );
        assert_eq!(missing.surface, None);
        assert!(missing.is_valid);
        assert_eq!(missing.connection, found.connection);
    }

    #[test]
    fn handle_under_pointer_takes_precedence_over_closest() {
        let closest = descriptor("b", "in", HandleType::Target);
        let under = HandleKey::new("c", Some("out"), HandleType::Source);
        let surfaces = Surfaces {
            known: vec![closest.key(), under.clone()],
            under_pointer: Some(under),
        };
        let result = validate_handle(
            &event(),
            &closest,
            ConnectionMode::Strict,
            &origin("a", "out", false),
            &always,
            &surfaces,
        );
        assert_eq!(result.surface, Some(SurfaceId(1)));
        assert_eq!(result.connection.target, "c");
        assert_eq!(result.connection.target_handle.as_deref(), Some("out"));
        assert!(!result.is_valid, "source to source is rejected in strict mode");

        let loose = validate_handle(
            &event(),
            &closest,
            ConnectionMode::Loose,
            &origin("a", "out", false),
            &always,
            &surfaces,
        );
        assert!(loose.is_valid);
        assert_eq!(loose.connection.target, "c");
    }
}
