use std::marker::PhantomData;

use bevy::prelude::*;

use crate::aggregation::{AggregationResults, CellKey};
use crate::data::{Dataset, PointView};
use crate::settings::MapSettings;
use crate::time_filter::{point_view, SeasonalIndex, TimeFilterState};
use crate::trend::{series_for_bucket, smooth};

use super::manager::OverlayManager;
use super::pending::{OverlayRequest, PendingOverlayRender};
use super::target::{ChartSeries, OverlayError, OverlayTarget};

/// Chart description for one bucket of the latest aggregation pass.
pub fn build_chart_series(
    key: &CellKey,
    results: &AggregationResults,
    dataset: &Dataset,
    seasonal: &SeasonalIndex,
    filter: &TimeFilterState,
    settings: &MapSettings,
) -> Result<ChartSeries, OverlayError> {
    let record = results
        .get(key)
        .ok_or_else(|| OverlayError::UnknownKey(key.clone()))?;
    let members: Vec<PointView<'_>> = record
        .members
        .iter()
        .filter_map(|&i| point_view(dataset, seasonal, filter.view_mode(), i))
        .collect();
    let points = series_for_bucket(&members, settings.chart_repeated);
    let trend = smooth(&points).samples;
    Ok(ChartSeries {
        title: key.to_string(),
        points,
        trend,
    })
}

/// Fire the pending overlay request against the current state.
pub fn fire_pending_overlay<T: OverlayTarget>(
    mut pending: ResMut<PendingOverlayRender>,
    mut manager: ResMut<OverlayManager<T>>,
    results: Res<AggregationResults>,
    dataset: Res<Dataset>,
    seasonal: Res<SeasonalIndex>,
    filter: Res<TimeFilterState>,
    settings: Res<MapSettings>,
) {
    if settings.is_changed() {
        manager.set_padding(settings.overlay_padding);
    }
    if !pending.is_pending() {
        return;
    }
    match pending.take() {
        Some(OverlayRequest::Show { key, pointer }) => {
            manager.show(key.clone(), pointer, || {
                build_chart_series(&key, &results, &dataset, &seasonal, &filter, &settings)
            });
        }
        Some(OverlayRequest::Hide) => manager.hide(),
        None => {}
    }
}

/// Tear the overlay down when the app exits.
pub fn dispose_overlay_on_exit<T: OverlayTarget>(
    mut exits: EventReader<AppExit>,
    mut manager: ResMut<OverlayManager<T>>,
) {
    if exits.read().next().is_some() {
        manager.dispose();
    }
}

/// Registers the shared overlay for a render target type.
///
/// The manager is initialised from `T::default()`; its chart table is created
/// on the first `show`.
pub struct OverlayPlugin<T> {
    _target: PhantomData<fn() -> T>,
}

impl<T> Default for OverlayPlugin<T> {
    fn default() -> Self {
        Self {
            _target: PhantomData,
        }
    }
}

impl<T: OverlayTarget + Default> Plugin for OverlayPlugin<T> {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingOverlayRender>()
            .init_resource::<OverlayManager<T>>()
            .add_systems(PreUpdate, fire_pending_overlay::<T>)
            .add_systems(Last, dispose_overlay_on_exit::<T>);
    }
}
