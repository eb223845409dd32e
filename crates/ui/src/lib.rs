use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use analytics::overlay::OverlayPlugin;
use analytics::AnalyticsSet;

mod chart;
pub mod color_ramps;
pub mod legend;
pub mod map_canvas;
pub mod overlay_target;
pub mod settings_panel;
pub mod theme;
pub mod time_panel;
pub mod tooltip;

pub use overlay_target::EguiOverlayTarget;

/// egui front end: panels and map canvas feed the engine before it runs;
/// legend, tooltip and chart read its output afterwards.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .add_plugins(OverlayPlugin::<EguiOverlayTarget>::default())
            .init_resource::<map_canvas::MapView>()
            .init_resource::<map_canvas::HoverState>()
            .init_resource::<legend::LegendState>()
            .init_resource::<time_panel::TimePanelState>()
            .add_systems(Startup, theme::apply_map_theme)
            .add_systems(
                Update,
                (
                    time_panel::animation_keybinds,
                    settings_panel::settings_panel_ui,
                    time_panel::time_panel_ui,
                    map_canvas::map_canvas_ui,
                )
                    .chain()
                    .before(AnalyticsSet::Filter),
            )
            .add_systems(
                Update,
                (
                    legend::track_domain_updates,
                    legend::legend_ui,
                    tooltip::tooltip_ui,
                    overlay_target::chart_overlay_ui,
                )
                    .chain()
                    .after(AnalyticsSet::Interaction),
            );
    }
}
