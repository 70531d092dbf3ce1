use std::collections::HashMap;

use connect::{
    DocumentScope, HandleKey, HandleMarkers, ListenerId, ListenerKind, Point, Rect,
    ScopeId, ScopeRegistry, SurfaceId,
};

/// Visual state of one handle while a connection is being dragged
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HandleMarker {
    pub connecting: bool,
    pub valid: Option<bool>,
}

/// Window-space hit areas of every rendered handle, plus the markers and
/// pointer listeners of the view that owns them.
#[derive(Debug)]
pub struct HandleSurfaces {
    scope: ScopeId,
    surfaces: Vec<(HandleKey, Rect)>,
    markers: HashMap<SurfaceId, HandleMarker>,
    listeners: HashMap<ListenerId, ListenerKind>,
    next_listener: u64,
}

impl HandleSurfaces {
    pub fn new(scope: ScopeId) -> Self {
        Self {
            scope,
            surfaces: Vec::new(),
            markers: HashMap::new(),
            listeners: HashMap::new(),
            next_listener: 0,
        }
    }

    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Replaces the hit areas. Surface ids are positions in this list, so
    /// this must not run while a connection is in progress.
    pub fn set_surfaces(&mut self, surfaces: Vec<(HandleKey, Rect)>) {
        self.surfaces = surfaces;
        self.markers.clear();
    }

    pub fn marker(&self, key: &HandleKey) -> HandleMarker {
        self.handle_surface(key)
            .and_then(|surface| self.markers.get(&surface).copied())
            .unwrap_or_default()
    }

    pub fn is_listening(&self, kind: ListenerKind) -> bool {
        self.listeners.values().any(|k| *k == kind)
    }
}

impl HandleMarkers for HandleSurfaces {
    fn mark_connecting(&mut self, surface: SurfaceId) {
        self.markers.entry(surface).or_default().connecting = true;
    }

    fn mark_validity(&mut self, surface: SurfaceId, valid: bool) {
        self.markers.entry(surface).or_default().valid = Some(valid);
    }

    fn clear(&mut self, surface: SurfaceId) {
        self.markers.remove(&surface);
    }
}

impl DocumentScope for HandleSurfaces {
    fn handle_at(&self, position: Point) -> Option<HandleKey> {
        self.surfaces
            .iter()
            .rev()
            .find(|(_, rect)| rect.contains(position))
            .map(|(key, _)| key.clone())
    }

    fn handle_surface(&self, handle: &HandleKey) -> Option<SurfaceId> {
        self.surfaces
            .iter()
            .position(|(key, _)| key == handle)
            .map(|index| SurfaceId(index as u64))
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.insert(id, kind);
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }
}

impl ScopeRegistry for HandleSurfaces {
    fn resolve(&mut self, scope: ScopeId) -> Option<&mut dyn DocumentScope> {
        if scope == self.scope {
            Some(self as &mut dyn DocumentScope)
        } else {
            None
        }
    }
}
