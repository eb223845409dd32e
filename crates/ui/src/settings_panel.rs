//! Left-hand panel editing [`MapSettings`].
//!
//! Widgets edit a copy; the resource is written back only when something
//! actually changed, so an idle panel never triggers an aggregation pass.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use analytics::aggregation::{AggregateSpec, AggregationKind, MissingValues, RepeatedPointsKind};
use analytics::data::Dataset;
use analytics::settings::{ColorBy, GroupingMode, MapSettings};

fn kind_combo(ui: &mut egui::Ui, id: &str, kind: &mut AggregationKind) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(kind.label())
        .show_ui(ui, |ui| {
            for option in AggregationKind::ALL {
                ui.selectable_value(kind, option, option.label());
            }
        });
}

fn repeated_combo(ui: &mut egui::Ui, id: &str, repeated: &mut Option<RepeatedPointsKind>) {
    let selected = repeated.map_or("Keep all", |k| k.label());
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected)
        .show_ui(ui, |ui| {
            ui.selectable_value(repeated, None, "Keep all");
            for option in RepeatedPointsKind::ALL {
                ui.selectable_value(repeated, Some(option), option.label());
            }
        });
}

fn spec_editor(ui: &mut egui::Ui, id: &str, spec: &mut AggregateSpec) {
    egui::Grid::new(id).num_columns(2).show(ui, |ui| {
        ui.label("Aggregate");
        kind_combo(ui, &format!("{id}_kind"), &mut spec.kind);
        ui.end_row();

        ui.label("Same timestamp");
        repeated_combo(ui, &format!("{id}_repeated"), &mut spec.repeated);
        ui.end_row();

        ui.label("Empty value");
        ui.add(egui::DragValue::new(&mut spec.default_value).speed(0.1));
        ui.end_row();

        ui.label("Skip missing");
        let mut skip = spec.missing == MissingValues::Skip;
        if ui.checkbox(&mut skip, "").changed() {
            spec.missing = if skip {
                MissingValues::Skip
            } else {
                MissingValues::AsZero
            };
        }
        ui.end_row();
    });
}

pub fn settings_panel_ui(
    mut contexts: EguiContexts,
    mut settings: ResMut<MapSettings>,
    dataset: Res<Dataset>,
) {
    let mut draft = settings.clone();

    egui::SidePanel::left("settings_panel")
        .resizable(false)
        .default_width(240.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.heading("Map");
            ui.label(format!(
                "{} points, {} regions",
                dataset.points.len(),
                dataset.regions.len()
            ));
            ui.separator();

            ui.label("Grouping");
            ui.horizontal(|ui| {
                for mode in [GroupingMode::Regions, GroupingMode::Grid, GroupingMode::Hex] {
                    ui.selectable_value(&mut draft.grouping, mode, mode.label());
                }
            });
            match draft.grouping {
                GroupingMode::Regions => {}
                GroupingMode::Grid => {
                    ui.add(
                        egui::Slider::new(&mut draft.cell_size, 0.005..=1.0)
                            .logarithmic(true)
                            .text("cell size"),
                    );
                }
                GroupingMode::Hex => {
                    ui.add(
                        egui::Slider::new(&mut draft.hex_radius, 0.005..=1.0)
                            .logarithmic(true)
                            .text("hex radius"),
                    );
                }
            }
            ui.separator();

            ui.label("Color");
            ui.horizontal(|ui| {
                ui.selectable_value(&mut draft.color_by, ColorBy::Value, "Value");
                ui.add_enabled_ui(!dataset.category_levels().is_empty(), |ui| {
                    ui.selectable_value(&mut draft.color_by, ColorBy::Category, "Category");
                });
            });
            if draft.color_by == ColorBy::Value {
                spec_editor(ui, "color_spec", &mut draft.color);
            }
            ui.separator();

            ui.label("Elevation");
            spec_editor(ui, "elevation_spec", &mut draft.elevation);
            ui.separator();

            ui.checkbox(&mut draft.preserve_domains, "Preserve domains");
            ui.checkbox(&mut draft.chart_mode, "Chart on hover");
            if draft.chart_mode {
                ui.horizontal(|ui| {
                    ui.label("Chart repeats");
                    repeated_combo(ui, "chart_repeated", &mut draft.chart_repeated);
                });
            }
            ui.separator();

            ui.label("Animation");
            let mut step_hours = draft.animation.step_ms as f64 / 3_600_000.0;
            if ui
                .add(
                    egui::Slider::new(&mut step_hours, 1.0..=24.0 * 30.0)
                        .logarithmic(true)
                        .text("step (h)"),
                )
                .changed()
            {
                draft.animation.step_ms = (step_hours * 3_600_000.0) as i64;
            }
            ui.add(
                egui::Slider::new(&mut draft.animation.interval_secs, 0.05..=2.0)
                    .text("interval (s)"),
            );
        });

    if draft != *settings {
        *settings = draft;
    }
}
