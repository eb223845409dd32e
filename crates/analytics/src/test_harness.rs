//! # TestMap: headless harness for the analytics engine
//!
//! Wraps a `bevy::app::App` with `MinimalPlugins`, [`AnalyticsPlugin`] and an
//! overlay backed by [`RecordingTarget`], so system-level behaviour can be
//! driven frame by frame without a window.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::aggregation::{AggregationResults, CellKey, DomainUpdated};
use crate::data::{DataPoint, Dataset, Region};
use crate::overlay::{
    ChartHandle, ChartSeries, OverlayError, OverlayManager, OverlayPlugin, OverlayTarget,
};
use crate::picking::{LayerId, PickEvent, PickedObject, TooltipState};
use crate::settings::MapSettings;
use crate::time_filter::TimeFilterState;
use crate::AnalyticsPlugin;

// =============================================================================
// RecordingTarget
// =============================================================================

/// Overlay target that records every call instead of drawing.
#[derive(Debug)]
pub struct RecordingTarget {
    next_handle: u64,
    pub created: Vec<(CellKey, ChartHandle)>,
    pub disposed: Vec<ChartHandle>,
    pub errors: Vec<String>,
    pub visible: bool,
    pub position: Vec2,
    pub viewport: Rect,
    pub size: Vec2,
    /// Fail the next `create_chart` call with a target error.
    pub fail_next_create: bool,
}

impl Default for RecordingTarget {
    fn default() -> Self {
        Self {
            next_handle: 0,
            created: Vec::new(),
            disposed: Vec::new(),
            errors: Vec::new(),
            visible: false,
            position: Vec2::ZERO,
            viewport: Rect::new(0.0, 0.0, 800.0, 600.0),
            size: Vec2::new(220.0, 140.0),
            fail_next_create: false,
        }
    }
}

impl OverlayTarget for RecordingTarget {
    fn create_chart(
        &mut self,
        key: &CellKey,
        _series: &ChartSeries,
    ) -> Result<ChartHandle, OverlayError> {
        if std::mem::take(&mut self.fail_next_create) {
            return Err(OverlayError::Target("injected failure".into()));
        }
        let handle = ChartHandle(self.next_handle);
        self.next_handle += 1;
        self.created.push((key.clone(), handle));
        Ok(handle)
    }

    fn dispose_chart(&mut self, handle: ChartHandle) {
        self.disposed.push(handle);
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn overlay_size(&self) -> Vec2 {
        self.size
    }
}

// =============================================================================
// TestMap
// =============================================================================

/// A headless Bevy App wrapping `AnalyticsPlugin` for integration testing.
pub struct TestMap {
    app: App,
}

impl Default for TestMap {
    fn default() -> Self {
        Self::new()
    }
}

impl TestMap {
    /// Empty dataset, default settings, one frame already run.
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(AnalyticsPlugin);
        app.add_plugins(OverlayPlugin::<RecordingTarget>::default());
        app.update();
        Self { app }
    }

    pub fn with_settings(mut self, settings: MapSettings) -> Self {
        self.app.insert_resource(settings);
        self
    }

    pub fn with_data(mut self, points: Vec<DataPoint>, regions: Vec<Region>) -> Self {
        self.load(points, regions);
        self
    }

    /// Advance the virtual clock by a fixed step on every frame.
    pub fn with_frame_time(mut self, step: Duration) -> Self {
        self.app.insert_resource(TimeUpdateStrategy::ManualDuration(step));
        self
    }

    pub fn load(&mut self, points: Vec<DataPoint>, regions: Vec<Region>) {
        self.app
            .world_mut()
            .resource_mut::<Dataset>()
            .replace(points, regions);
    }

    /// Run `frames` app updates.
    pub fn tick(&mut self, frames: u32) {
        for _ in 0..frames {
            self.app.update();
        }
    }

    pub fn pick(&mut self, point: Option<PickedObject>, layer: LayerId, screen: Vec2) {
        self.app.world_mut().send_event(PickEvent {
            point,
            layer,
            screen,
            world: (0.0, 0.0),
        });
    }

    pub fn resource<R: Resource>(&self) -> &R {
        self.app.world().resource::<R>()
    }

    pub fn resource_mut<R: Resource>(&mut self) -> Mut<'_, R> {
        self.app.world_mut().resource_mut::<R>()
    }

    pub fn results(&self) -> &AggregationResults {
        self.resource::<AggregationResults>()
    }

    pub fn filter(&self) -> &TimeFilterState {
        self.resource::<TimeFilterState>()
    }

    pub fn tooltip(&self) -> &TooltipState {
        self.resource::<TooltipState>()
    }

    pub fn overlay(&self) -> &OverlayManager<RecordingTarget> {
        self.resource::<OverlayManager<RecordingTarget>>()
    }

    pub fn settings_mut(&mut self) -> Mut<'_, MapSettings> {
        self.resource_mut::<MapSettings>()
    }

    pub fn filter_mut(&mut self) -> Mut<'_, TimeFilterState> {
        self.resource_mut::<TimeFilterState>()
    }

    /// Every `DomainUpdated` event still buffered.
    pub fn drain_domain_events(&mut self) -> Vec<DomainUpdated> {
        self.app
            .world_mut()
            .resource_mut::<Events<DomainUpdated>>()
            .drain()
            .collect()
    }
}
