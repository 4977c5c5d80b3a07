//! Overlay snapshot slot
//!
//! Holds the one live snapshot of a display. `refresh` discards the old
//! snapshot before creating the new one, so a display never owns two.

use crate::host::{OverlayId, SceneHost, SurfaceSnapshot};

#[derive(Debug, Default)]
pub struct OverlaySlot {
    current: Option<OverlayId>,
    refreshes: u64,
}

impl OverlaySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the live snapshot
    pub fn refresh<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        snapshot: &SurfaceSnapshot,
    ) -> OverlayId {
        if let Some(old) = self.current.take() {
            host.discard_overlay(old);
        }
        let id = host.create_overlay(snapshot);
        self.current = Some(id);
        self.refreshes += 1;
        id
    }

    /// Drop the live snapshot, if any
    pub fn release<H: SceneHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(old) = self.current.take() {
            host.discard_overlay(old);
        }
    }

    pub fn current(&self) -> Option<OverlayId> {
        self.current
    }

    pub fn refresh_count(&self) -> u64 {
        self.refreshes
    }
}
