use bevy_egui::{egui, EguiContexts};

/// Fill used by floating panels drawn over the map (legend, tooltip, chart).
pub const PANEL_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(30, 32, 42, 225);

pub fn apply_map_theme(mut contexts: EguiContexts) {
    let ctx = contexts.ctx_mut();
    let mut style = (*ctx.style()).clone();

    let panel = egui::Color32::from_rgb(28, 30, 38);
    let inactive = egui::Color32::from_rgb(46, 50, 62);
    let hover = egui::Color32::from_rgb(64, 74, 96);
    let active = egui::Color32::from_rgb(72, 160, 140);

    style.visuals.widgets.noninteractive.bg_fill = panel;
    style.visuals.widgets.inactive.bg_fill = inactive;
    style.visuals.widgets.hovered.bg_fill = hover;
    style.visuals.widgets.active.bg_fill = active;
    style.visuals.widgets.inactive.weak_bg_fill = inactive;
    style.visuals.widgets.hovered.weak_bg_fill = hover;
    style.visuals.widgets.active.weak_bg_fill = active;

    style.visuals.window_fill = panel;
    style.visuals.panel_fill = egui::Color32::from_rgb(18, 20, 26);
    style.visuals.extreme_bg_color = egui::Color32::from_rgb(22, 24, 30);

    style.visuals.selection.bg_fill = active;
    style.visuals.selection.stroke = egui::Stroke::new(1.0, active);

    let rounding = egui::CornerRadius::same(4);
    style.visuals.window_corner_radius = egui::CornerRadius::same(6);
    style.visuals.widgets.inactive.corner_radius = rounding;
    style.visuals.widgets.hovered.corner_radius = rounding;
    style.visuals.widgets.active.corner_radius = rounding;

    ctx.set_style(style);
}
