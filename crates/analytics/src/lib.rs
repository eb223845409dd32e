use bevy::prelude::*;

pub mod aggregation;
pub mod data;
pub mod geometry;
pub mod ingest;
pub mod overlay;
pub mod picking;
pub mod sets;
pub mod settings;
pub mod time_filter;
pub mod trend;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use sets::AnalyticsSet;

use aggregation::{recompute_aggregates, AggregationResults, DomainTrackers, DomainUpdated};
use data::Dataset;
use overlay::PendingOverlayRender;
use picking::{handle_pick_events, refresh_hover_content, PickEvent, TooltipState};
use settings::MapSettings;
use time_filter::{
    advance_animation, rebuild_seasonal_index, refresh_time_bounds, AnimationClock, SeasonalIndex,
    TimeFilterState,
};

/// Engine plugin: resources, events and the per-frame system chain.
///
/// Render targets register separately through
/// [`overlay::OverlayPlugin`].
pub struct AnalyticsPlugin;

impl Plugin for AnalyticsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Dataset>()
            .init_resource::<MapSettings>()
            .init_resource::<SeasonalIndex>()
            .init_resource::<TimeFilterState>()
            .init_resource::<AnimationClock>()
            .init_resource::<AggregationResults>()
            .init_resource::<DomainTrackers>()
            .init_resource::<TooltipState>()
            .init_resource::<PendingOverlayRender>()
            .add_event::<DomainUpdated>()
            .add_event::<PickEvent>()
            .configure_sets(
                Update,
                (
                    AnalyticsSet::Filter,
                    AnalyticsSet::Aggregate,
                    AnalyticsSet::Interaction,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    (rebuild_seasonal_index, refresh_time_bounds, advance_animation)
                        .chain()
                        .in_set(AnalyticsSet::Filter),
                    recompute_aggregates.in_set(AnalyticsSet::Aggregate),
                    (handle_pick_events, refresh_hover_content)
                        .chain()
                        .in_set(AnalyticsSet::Interaction),
                ),
            );
    }
}
