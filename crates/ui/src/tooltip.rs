//! Inline summary tooltip for label mode.
//!
//! Nothing is drawn while the overlay chart owns the hover
//! ([`TooltipContent::Suppressed`]).

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use analytics::picking::{TooltipContent, TooltipState};

use crate::theme::PANEL_FILL;

/// Pixel offset from the cursor to the tooltip.
const TOOLTIP_OFFSET: f32 = 16.0;

pub fn tooltip_ui(mut contexts: EguiContexts, tooltip: Res<TooltipState>) {
    let Some(TooltipContent::Label(label)) = &tooltip.content else {
        return;
    };

    let pos = egui::pos2(
        tooltip.screen.x + TOOLTIP_OFFSET,
        tooltip.screen.y + TOOLTIP_OFFSET,
    );
    egui::Area::new(egui::Id::new("summary_tooltip"))
        .fixed_pos(pos)
        .order(egui::Order::Tooltip)
        .interactable(false)
        .show(contexts.ctx_mut(), |ui| {
            egui::Frame::new()
                .fill(PANEL_FILL)
                .corner_radius(egui::CornerRadius::same(4))
                .inner_margin(egui::Margin::same(6))
                .show(ui, |ui| {
                    ui.label(egui::RichText::new(&label.title).strong());
                    egui::Grid::new("summary_tooltip_rows")
                        .num_columns(2)
                        .show(ui, |ui| {
                            for (name, value) in &label.rows {
                                ui.label(egui::RichText::new(name).color(egui::Color32::GRAY));
                                ui.label(value);
                                ui.end_row();
                            }
                        });
                });
        });
}
