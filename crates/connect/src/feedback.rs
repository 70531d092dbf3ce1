use crate::port::{HandleMarkers, SurfaceId};

/// Tracks the one handle surface currently carrying connection markers.
#[derive(Debug, Default)]
pub struct HandleFeedback {
    active: Option<SurfaceId>,
}

impl HandleFeedback {
    pub fn active(&self) -> Option<SurfaceId> {
        self.active
    }

    /// Move the markers to `surface` and flag it valid or invalid.
    pub fn show<M: HandleMarkers + ?Sized>(
        &mut self,
        markers: &mut M,
        surface: SurfaceId,
        valid: bool,
    ) {
        if let Some(previous) = self.active.filter(|previous| *previous != surface) {
            markers.clear(previous);
        }
        markers.mark_connecting(surface);
        markers.mark_validity(surface, valid);
        self.active = Some(surface);
    }

    pub fn reset<M: HandleMarkers + ?Sized>(&mut self, markers: &mut M) {
        if let Some(previous) = self.active.take() {
            markers.clear(previous);
        }
    }
}
