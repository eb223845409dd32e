use std::collections::HashMap;

use bevy::prelude::*;

use crate::aggregation::CellKey;

use super::target::{ChartHandle, ChartSeries, OverlayError, OverlayTarget};

/// Default pixel gap between the pointer and the overlay.
pub const DEFAULT_OVERLAY_PADDING: f32 = 15.0;

/// Result of [`OverlayManager::show`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
    /// Cached chart revealed and repositioned.
    Reused,
    /// A new chart was built.
    Built,
    /// Build failed; an error placeholder is shown.
    Failed,
}

#[derive(Debug, Default)]
struct OverlayState {
    active_key: Option<CellKey>,
    chart_handles: HashMap<CellKey, ChartHandle>,
    last_series: HashMap<CellKey, ChartSeries>,
    tracking: bool,
}

/// Owner of the single shared overlay.
///
/// At most one key is active. Switching keys disposes the previous key's
/// chart; re-showing the active key with an unchanged series only reveals
/// and repositions it. State is created on first use and torn down only by
/// [`OverlayManager::dispose`].
#[derive(Resource)]
pub struct OverlayManager<T: OverlayTarget> {
    target: T,
    state: Option<OverlayState>,
    padding: f32,
}

impl<T: OverlayTarget + Default> Default for OverlayManager<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: OverlayTarget> OverlayManager<T> {
    pub fn new(target: T) -> Self {
        Self {
            target,
            state: None,
            padding: DEFAULT_OVERLAY_PADDING,
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn set_padding(&mut self, padding: f32) {
        self.padding = padding;
    }

    pub fn active_key(&self) -> Option<&CellKey> {
        self.state.as_ref().and_then(|s| s.active_key.as_ref())
    }

    pub fn handle_count(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.chart_handles.len())
    }

    pub fn is_tracking(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.tracking)
    }

    /// Show the chart for `key` next to `pointer`.
    ///
    /// `builder` runs on every call; its series is compared with the cached
    /// one so an unchanged chart is never rebuilt.
    pub fn show<F>(&mut self, key: CellKey, pointer: Vec2, builder: F) -> ShowOutcome
    where
        F: FnOnce() -> Result<ChartSeries, OverlayError>,
    {
        let state = self.state.get_or_insert_with(OverlayState::default);

        if state.active_key.as_ref() != Some(&key) {
            if let Some(previous) = state.active_key.take() {
                if let Some(handle) = state.chart_handles.remove(&previous) {
                    self.target.dispose_chart(handle);
                }
                state.last_series.remove(&previous);
            }
            state.active_key = Some(key.clone());
        }
        state.tracking = true;

        let built = builder().and_then(|series| {
            if state.chart_handles.contains_key(&key)
                && state.last_series.get(&key) == Some(&series)
            {
                return Ok(None);
            }
            if let Some(stale) = state.chart_handles.remove(&key) {
                self.target.dispose_chart(stale);
            }
            state.last_series.remove(&key);
            let handle = self.target.create_chart(&key, &series)?;
            state.chart_handles.insert(key.clone(), handle);
            state.last_series.insert(key.clone(), series);
            Ok(Some(handle))
        });

        let outcome = match built {
            Ok(None) => ShowOutcome::Reused,
            Ok(Some(_)) => ShowOutcome::Built,
            Err(e) => {
                warn!("Overlay for {}: {}", key, e);
                if let Some(stale) = state.chart_handles.remove(&key) {
                    self.target.dispose_chart(stale);
                }
                state.last_series.remove(&key);
                self.target.show_error(&e.to_string());
                ShowOutcome::Failed
            }
        };
        self.target.set_visible(true);
        self.reposition(pointer);
        outcome
    }

    /// Hide the overlay and stop following the pointer. Handles are kept.
    pub fn hide(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.tracking = false;
        }
        self.target.set_visible(false);
    }

    /// Follow the pointer while the overlay is shown.
    pub fn pointer_moved(&mut self, pointer: Vec2) {
        if self.is_tracking() {
            self.reposition(pointer);
        }
    }

    pub fn reposition(&mut self, pointer: Vec2) -> Vec2 {
        let position = overlay_position(
            pointer,
            self.target.overlay_size(),
            self.target.viewport(),
            self.padding,
        );
        self.target.set_position(position);
        position
    }

    /// Dispose every chart and drop all state.
    pub fn dispose(&mut self) {
        let Some(state) = self.state.take() else {
            return;
        };
        let count = state.chart_handles.len();
        for (_, handle) in state.chart_handles {
            self.target.dispose_chart(handle);
        }
        self.target.set_visible(false);
        info!("Overlay disposed ({} charts)", count);
    }
}

/// Overlay top-left for a pointer: offset by `padding`, flipped to the
/// other side of the pointer on overflow, then clamped inside `viewport`.
pub fn overlay_position(pointer: Vec2, size: Vec2, viewport: Rect, padding: f32) -> Vec2 {
    let mut x = pointer.x + padding;
    if x + size.x > viewport.max.x {
        x = pointer.x - padding - size.x;
    }
    let mut y = pointer.y + padding;
    if y + size.y > viewport.max.y {
        y = pointer.y - padding - size.y;
    }
    Vec2::new(
        x.clamp(viewport.min.x, (viewport.max.x - size.x).max(viewport.min.x)),
        y.clamp(viewport.min.y, (viewport.max.y - size.y).max(viewport.min.y)),
    )
}
