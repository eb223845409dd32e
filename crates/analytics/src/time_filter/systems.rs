use bevy::prelude::*;

use crate::data::Dataset;
use crate::settings::MapSettings;

use super::animation::AnimationClock;
use super::seasonal::{point_views, SeasonalIndex};
use super::types::TimeFilterState;

/// Rebuild the seasonal projection when a new dataset arrives.
pub fn rebuild_seasonal_index(dataset: Res<Dataset>, mut seasonal: ResMut<SeasonalIndex>) {
    if !dataset.is_changed() || seasonal.is_current(&dataset) {
        return;
    }
    *seasonal = SeasonalIndex::build(&dataset);
}

/// Recompute filter bounds when the dataset or the view mode changed.
pub fn refresh_time_bounds(
    dataset: Res<Dataset>,
    seasonal: Res<SeasonalIndex>,
    mut state: ResMut<TimeFilterState>,
) {
    if !dataset.is_changed() && !seasonal.is_changed() && !state.bounds_stale() {
        return;
    }
    let timestamps: Vec<i64> = point_views(&dataset, &seasonal, state.view_mode())
        .iter()
        .filter_map(|p| p.timestamp)
        .collect();
    state.rebuild_bounds(&timestamps);
    if let Some(bounds) = state.bounds() {
        debug!(
            "Time bounds [{}, {}] ({:?}), min gap {:?} ms",
            bounds.start,
            bounds.end,
            state.view_mode(),
            state.min_gap()
        );
    }
}

/// Step the window on every elapsed animation interval.
pub fn advance_animation(
    time: Res<Time>,
    settings: Res<MapSettings>,
    mut clock: ResMut<AnimationClock>,
    mut state: ResMut<TimeFilterState>,
) {
    if settings.is_changed() {
        clock.set_interval(settings.animation.interval_secs);
    }
    if !clock.playing {
        return;
    }
    clock.timer.tick(time.delta());
    for _ in 0..clock.timer.times_finished_this_tick() {
        if state.step_animation(settings.animation.step_ms).is_none() {
            clock.playing = false;
            break;
        }
    }
}
