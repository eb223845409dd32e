//! Time filter controls, docked along the bottom edge.
//!
//! - View mode toggle (Historical / Seasonal)
//! - Duration presets valid for the dataset
//! - Start/end sliders for a custom window
//! - Play/pause for the animation (Space)

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use chrono::DateTime;

use analytics::time_filter::{AnimationClock, TimeFilterState, ViewMode};

/// Last rejection from the filter, shown until the next successful change.
#[derive(Resource, Default)]
pub struct TimePanelState {
    pub error: Option<String>,
}

/// Human-readable timestamp. Seasonal stamps all share the reference year,
/// so the year is dropped.
pub fn format_timestamp(ms: i64, mode: ViewMode) -> String {
    let Some(time) = DateTime::from_timestamp_millis(ms) else {
        return ms.to_string();
    };
    match mode {
        ViewMode::Historical => time.format("%Y-%m-%d %H:%M").to_string(),
        ViewMode::Seasonal => time.format("%b %d %H:%M").to_string(),
    }
}

pub fn time_panel_ui(
    mut contexts: EguiContexts,
    mut filter: ResMut<TimeFilterState>,
    mut clock: ResMut<AnimationClock>,
    mut panel: ResMut<TimePanelState>,
) {
    egui::TopBottomPanel::bottom("time_panel")
        .resizable(false)
        .show(contexts.ctx_mut(), |ui| {
            ui.add_space(4.0);
            let Some(bounds) = filter.bounds() else {
                ui.label("No timestamps in dataset");
                ui.add_space(4.0);
                return;
            };
            let mode = filter.view_mode();

            ui.horizontal(|ui| {
                for option in [ViewMode::Historical, ViewMode::Seasonal] {
                    if ui.selectable_label(mode == option, option.label()).clicked() {
                        filter.set_view_mode(option);
                        panel.error = None;
                    }
                }

                ui.separator();

                let active = filter.active_preset();
                for preset in filter.available_presets() {
                    if ui
                        .selectable_label(active == Some(preset), preset.label())
                        .clicked()
                    {
                        panel.error = filter.select_preset(preset).err().map(|e| e.to_string());
                    }
                }

                ui.separator();

                let play_label = if clock.playing { "Pause" } else { "Play" };
                if ui.button(play_label).clicked() {
                    clock.toggle();
                }
            });

            let window = filter.window();
            let (mut start, mut end) = (window.start, window.end);
            let formatter = |v: f64, _: std::ops::RangeInclusive<usize>| {
                format_timestamp(v as i64, mode)
            };
            let start_changed = ui
                .add(
                    egui::Slider::new(&mut start, bounds.start..=bounds.end)
                        .text("start")
                        .custom_formatter(formatter),
                )
                .changed();
            let end_changed = ui
                .add(
                    egui::Slider::new(&mut end, bounds.start..=bounds.end)
                        .text("end")
                        .custom_formatter(formatter),
                )
                .changed();
            if start_changed || end_changed {
                panel.error = filter
                    .set_custom_window(start, end)
                    .err()
                    .map(|e| e.to_string());
            }

            if let Some(message) = &panel.error {
                ui.colored_label(egui::Color32::from_rgb(230, 150, 80), message);
            }
            ui.add_space(4.0);
        });
}

/// Space toggles the animation.
pub fn animation_keybinds(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
    mut clock: ResMut<AnimationClock>,
) {
    if contexts.ctx_mut().wants_keyboard_input() {
        return;
    }
    if keyboard.just_pressed(KeyCode::Space) {
        clock.toggle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_historical_format_has_year() {
        // 2021-03-04 05:06 UTC
        let ms = 1_614_834_360_000;
        assert_eq!(format_timestamp(ms, ViewMode::Historical), "2021-03-04 05:06");
    }

    #[test]
    fn test_seasonal_format_drops_year() {
        let ms = 1_614_834_360_000;
        assert_eq!(format_timestamp(ms, ViewMode::Seasonal), "Mar 04 05:06");
    }

    #[test]
    fn test_out_of_range_falls_back_to_millis() {
        assert_eq!(format_timestamp(i64::MAX, ViewMode::Historical), i64::MAX.to_string());
    }
}
