//! Color and elevation legend in the bottom-right corner.
//!
//! The legend never reads [`AggregationResults`] directly; it mirrors the
//! domains announced through [`DomainUpdated`] events.
//!
//! [`AggregationResults`]: analytics::aggregation::AggregationResults

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use analytics::aggregation::{Domain, DomainChannel, DomainUpdated};
use analytics::data::Dataset;
use analytics::settings::{ColorBy, MapSettings};

use crate::color_ramps::{category_color, VIRIDIS};
use crate::theme::PANEL_FILL;

const GRADIENT_WIDTH: f32 = 180.0;
const GRADIENT_HEIGHT: f32 = 12.0;
const GRADIENT_STEPS: usize = 48;
const MARGIN: f32 = 16.0;
/// Categorical legends list at most this many levels.
const MAX_LEVELS: usize = 8;

#[derive(Resource, Debug, Default, PartialEq)]
pub struct LegendState {
    pub color: Option<Domain>,
    pub elevation: Option<Domain>,
}

pub fn track_domain_updates(
    mut updates: EventReader<DomainUpdated>,
    mut legend: ResMut<LegendState>,
) {
    for update in updates.read() {
        match update.channel {
            DomainChannel::Color => legend.color = update.domain,
            DomainChannel::Elevation => legend.elevation = update.domain,
        }
    }
}

pub(crate) fn format_value(v: f64) -> String {
    if v.abs() >= 1000.0 || v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

/// Lower and upper labels of a numeric domain.
pub(crate) fn domain_labels(domain: &Domain) -> (String, String) {
    let (min, max) = domain.bounds();
    (format_value(min), format_value(max))
}

fn gradient_bar(ui: &mut egui::Ui) {
    let (rect, _) = ui.allocate_exact_size(
        egui::vec2(GRADIENT_WIDTH, GRADIENT_HEIGHT),
        egui::Sense::hover(),
    );
    let painter = ui.painter_at(rect);
    let step = rect.width() / GRADIENT_STEPS as f32;
    for i in 0..GRADIENT_STEPS {
        let t = i as f32 / (GRADIENT_STEPS - 1) as f32;
        let x = rect.min.x + i as f32 * step;
        painter.rect_filled(
            egui::Rect::from_min_max(egui::pos2(x, rect.min.y), egui::pos2(x + step + 0.5, rect.max.y)),
            0.0,
            VIRIDIS.sample(t),
        );
    }
}

fn swatch(ui: &mut egui::Ui, color: egui::Color32, text: &str) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
        ui.painter().rect_filled(rect, 2.0, color);
        ui.label(egui::RichText::new(text).size(11.0));
    });
}

pub fn legend_ui(
    mut contexts: EguiContexts,
    legend: Res<LegendState>,
    settings: Res<MapSettings>,
    dataset: Res<Dataset>,
) {
    if legend.color.is_none() && legend.elevation.is_none() {
        return;
    }

    egui::Area::new(egui::Id::new("map_legend"))
        .anchor(egui::Align2::RIGHT_BOTTOM, [-MARGIN, -MARGIN])
        .order(egui::Order::Foreground)
        .interactable(false)
        .show(contexts.ctx_mut(), |ui| {
            egui::Frame::new()
                .fill(PANEL_FILL)
                .corner_radius(egui::CornerRadius::same(6))
                .inner_margin(egui::Margin::same(8))
                .show(ui, |ui| {
                    if let Some(domain) = &legend.color {
                        let title = match settings.color_by {
                            ColorBy::Value => format!("Color: {}", settings.color.kind.label()),
                            ColorBy::Category => "Color: Category".to_string(),
                        };
                        ui.label(egui::RichText::new(title).strong().size(12.0));
                        match domain {
                            Domain::Categorical { level_count } => {
                                let levels = dataset.category_levels();
                                for (i, level) in levels.iter().take(MAX_LEVELS).enumerate() {
                                    swatch(ui, category_color(i), level);
                                }
                                if *level_count > MAX_LEVELS {
                                    ui.label(format!("+{} more", level_count - MAX_LEVELS));
                                }
                            }
                            Domain::Numeric { .. } => {
                                gradient_bar(ui);
                                let (lo, hi) = domain_labels(domain);
                                ui.horizontal(|ui| {
                                    ui.label(egui::RichText::new(lo).size(11.0));
                                    ui.add_space(GRADIENT_WIDTH - 80.0);
                                    ui.label(egui::RichText::new(hi).size(11.0));
                                });
                            }
                        }
                    }

                    if let Some(domain) = &legend.elevation {
                        let (lo, hi) = domain_labels(domain);
                        ui.label(
                            egui::RichText::new(format!(
                                "Elevation ({}): {lo} to {hi}",
                                settings.elevation.kind.label()
                            ))
                            .size(11.0),
                        );
                    }
                });
        });
}
