use bevy::prelude::*;

use crate::aggregation::CellKey;

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayRequest {
    Show { key: CellKey, pointer: Vec2 },
    Hide,
}

/// Single-slot queue of overlay work for the next frame.
///
/// Scheduling overwrites any request that has not fired yet. The request
/// carries only what identifies the work; the firing system reads live
/// resources.
#[derive(Resource, Debug, Default)]
pub struct PendingOverlayRender {
    slot: Option<OverlayRequest>,
    overwritten: u64,
}

impl PendingOverlayRender {
    pub fn schedule(&mut self, request: OverlayRequest) {
        if self.slot.replace(request).is_some() {
            self.overwritten += 1;
        }
    }

    pub fn take(&mut self) -> Option<OverlayRequest> {
        self.slot.take()
    }

    pub fn peek(&self) -> Option<&OverlayRequest> {
        self.slot.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }

    /// Requests dropped because a newer one replaced them.
    pub fn overwritten(&self) -> u64 {
        self.overwritten
    }
}
