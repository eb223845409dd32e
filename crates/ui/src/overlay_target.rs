//! egui render target for the shared hover chart.
//!
//! [`EguiOverlayTarget`] keeps the chart series it was handed, keyed by
//! handle, and [`chart_overlay_ui`] paints whichever one is current.

use std::collections::HashMap;

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use analytics::aggregation::CellKey;
use analytics::overlay::{ChartHandle, ChartSeries, OverlayError, OverlayManager, OverlayTarget};

use crate::chart::draw_series_chart;
use crate::theme::PANEL_FILL;

/// Outer size of the chart overlay in screen pixels.
pub const OVERLAY_SIZE: Vec2 = Vec2::new(260.0, 160.0);

#[derive(Debug)]
pub struct EguiOverlayTarget {
    next_handle: u64,
    charts: HashMap<ChartHandle, (CellKey, ChartSeries)>,
    current: Option<ChartHandle>,
    error: Option<String>,
    visible: bool,
    position: Vec2,
    viewport: Rect,
}

impl Default for EguiOverlayTarget {
    fn default() -> Self {
        Self {
            next_handle: 0,
            charts: HashMap::new(),
            current: None,
            error: None,
            visible: false,
            position: Vec2::ZERO,
            viewport: Rect::new(0.0, 0.0, 1280.0, 720.0),
        }
    }
}

impl EguiOverlayTarget {
    /// Area the overlay is clamped to, in screen pixels.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    pub fn current_chart(&self) -> Option<&(CellKey, ChartSeries)> {
        self.current.and_then(|handle| self.charts.get(&handle))
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn chart_count(&self) -> usize {
        self.charts.len()
    }
}

impl OverlayTarget for EguiOverlayTarget {
    fn create_chart(
        &mut self,
        key: &CellKey,
        series: &ChartSeries,
    ) -> Result<ChartHandle, OverlayError> {
        let handle = ChartHandle(self.next_handle);
        self.next_handle += 1;
        self.charts.insert(handle, (key.clone(), series.clone()));
        self.current = Some(handle);
        self.error = None;
        Ok(handle)
    }

    fn dispose_chart(&mut self, handle: ChartHandle) {
        self.charts.remove(&handle);
        if self.current == Some(handle) {
            self.current = None;
        }
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn show_error(&mut self, message: &str) {
        self.current = None;
        self.error = Some(message.to_string());
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn overlay_size(&self) -> Vec2 {
        OVERLAY_SIZE
    }
}

pub fn chart_overlay_ui(
    mut contexts: EguiContexts,
    manager: Res<OverlayManager<EguiOverlayTarget>>,
) {
    let target = manager.target();
    if !target.is_visible() {
        return;
    }

    let pos = egui::pos2(target.position().x, target.position().y);
    egui::Area::new(egui::Id::new("chart_overlay"))
        .fixed_pos(pos)
        .order(egui::Order::Tooltip)
        .interactable(false)
        .show(contexts.ctx_mut(), |ui| {
            egui::Frame::new()
                .fill(PANEL_FILL)
                .corner_radius(egui::CornerRadius::same(6))
                .inner_margin(egui::Margin::same(8))
                .show(ui, |ui| {
                    ui.set_width(OVERLAY_SIZE.x - 16.0);
                    match (target.current_chart(), target.error()) {
                        (_, Some(message)) => {
                            ui.colored_label(egui::Color32::from_rgb(230, 110, 100), message);
                        }
                        (Some((_, series)), None) => {
                            ui.label(egui::RichText::new(&series.title).strong().size(13.0));
                            draw_series_chart(
                                ui,
                                series,
                                egui::vec2(OVERLAY_SIZE.x - 16.0, OVERLAY_SIZE.y - 48.0),
                            );
                        }
                        (None, None) => {}
                    }
                });
        });
}
