use std::collections::HashMap;

use bevy::prelude::*;

use crate::data::{Dataset, PointView, Region};
use crate::settings::{ColorBy, GroupingMode, MapSettings};
use crate::time_filter::{point_views, SeasonalIndex, TimeFilterState};

use super::buckets::{bucket_points, cell_center, summarize, BucketSummary, CellKey, Grouping};
use super::domain::{CycleSignature, Domain, DomainTracker};
use super::kinds::{aggregate_with, reduce, AggregationKind, TimeWindow};

// =============================================================================
// Resources and events
// =============================================================================

/// One bucket of the latest pass, detached from the borrowed point set.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketRecord {
    pub key: CellKey,
    /// Indices into `Dataset::points`.
    pub members: Vec<usize>,
    pub color_value: f64,
    pub elevation_value: f64,
    pub summary: BucketSummary,
    /// Center of grid and hex cells; `None` for regions.
    pub center: Option<(f64, f64)>,
}

/// Output of the latest aggregation pass.
#[derive(Resource, Debug, Default)]
pub struct AggregationResults {
    buckets: Vec<BucketRecord>,
    index: HashMap<CellKey, usize>,
    pub color_domain: Option<Domain>,
    pub elevation_domain: Option<Domain>,
    /// Number of completed passes.
    pub passes: u64,
}

impl AggregationResults {
    pub fn buckets(&self) -> &[BucketRecord] {
        &self.buckets
    }

    pub fn get(&self, key: &CellKey) -> Option<&BucketRecord> {
        self.index.get(key).and_then(|&i| self.buckets.get(i))
    }

    pub fn summary(&self, key: &CellKey) -> Option<BucketSummary> {
        self.get(key).map(|b| b.summary)
    }

    fn publish(
        &mut self,
        buckets: Vec<BucketRecord>,
        color_domain: Option<Domain>,
        elevation_domain: Option<Domain>,
    ) {
        self.index = buckets
            .iter()
            .enumerate()
            .map(|(i, b)| (b.key.clone(), i))
            .collect();
        self.buckets = buckets;
        self.color_domain = color_domain;
        self.elevation_domain = elevation_domain;
        self.passes += 1;
    }
}

/// Domain trackers for both encoding channels.
#[derive(Resource, Debug, Default)]
pub struct DomainTrackers {
    pub color: DomainTracker,
    pub elevation: DomainTracker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainChannel {
    Color,
    Elevation,
}

/// Pushed once per channel on every aggregation pass.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DomainUpdated {
    pub channel: DomainChannel,
    /// `None` when the pass had nothing to measure.
    pub domain: Option<Domain>,
}

// =============================================================================
// Pure pass
// =============================================================================

/// Grouping selected by the settings. Region grouping borrows `regions`.
pub fn grouping_for<'r>(settings: &MapSettings, regions: &'r [Region]) -> Grouping<'r> {
    match settings.grouping {
        GroupingMode::Regions => Grouping::Regions(regions),
        GroupingMode::Grid => Grouping::Grid {
            cell_size: settings.cell_size,
        },
        GroupingMode::Hex => Grouping::Hex {
            radius: settings.hex_radius,
        },
    }
}

/// Bucket `points` and reduce every bucket to its color and elevation value.
///
/// `category_levels` must be sorted; a member's level is its position there.
pub fn aggregate_buckets(
    points: &[PointView<'_>],
    grouping: &Grouping<'_>,
    window: TimeWindow,
    settings: &MapSettings,
    category_levels: &[String],
) -> Vec<BucketRecord> {
    bucket_points(points, grouping, window)
        .into_iter()
        .map(|bucket| {
            let color_value = match settings.color_by {
                ColorBy::Value => aggregate_with(&bucket.members, window, &settings.color),
                ColorBy::Category => dominant_level(&bucket.members, category_levels)
                    .unwrap_or(settings.color.default_value),
            };
            let elevation_value = aggregate_with(&bucket.members, window, &settings.elevation);
            BucketRecord {
                center: cell_center(&bucket.key, grouping),
                summary: summarize(&bucket.members),
                members: bucket.members.iter().map(|p| p.index).collect(),
                key: bucket.key,
                color_value,
                elevation_value,
            }
        })
        .collect()
}

/// Most frequent category level among `members`.
fn dominant_level(members: &[PointView<'_>], levels: &[String]) -> Option<f64> {
    let indices: Vec<f64> = members
        .iter()
        .filter_map(|p| p.point.category.as_deref())
        .filter_map(|c| levels.binary_search_by(|l| l.as_str().cmp(c)).ok())
        .map(|i| i as f64)
        .collect();
    reduce(&indices, AggregationKind::Mode)
}

fn fresh_extent(buckets: &[BucketRecord], value: impl Fn(&BucketRecord) -> f64) -> Option<Domain> {
    Domain::from_values(buckets.iter().filter(|b| !b.members.is_empty()).map(value))
}

// =============================================================================
// System
// =============================================================================

/// Re-run the aggregation pass when any of its inputs changed.
pub fn recompute_aggregates(
    dataset: Res<Dataset>,
    seasonal: Res<SeasonalIndex>,
    filter: Res<TimeFilterState>,
    settings: Res<MapSettings>,
    mut trackers: ResMut<DomainTrackers>,
    mut results: ResMut<AggregationResults>,
    mut events: EventWriter<DomainUpdated>,
) {
    if !dataset.is_changed()
        && !seasonal.is_changed()
        && !filter.is_changed()
        && !settings.is_changed()
    {
        return;
    }

    let grouping = grouping_for(&settings, &dataset.regions);
    let views = point_views(&dataset, &seasonal, filter.view_mode());
    let window = filter.window();
    let levels = dataset.category_levels();
    let buckets = aggregate_buckets(&views, &grouping, window, &settings, &levels);

    let color_fresh = match settings.color_by {
        ColorBy::Value => fresh_extent(&buckets, |b| b.color_value),
        ColorBy::Category => (!levels.is_empty()).then_some(Domain::Categorical {
            level_count: levels.len(),
        }),
    };
    let elevation_fresh = fresh_extent(&buckets, |b| b.elevation_value);

    let grouping_key = settings.grouping_key();
    trackers.color.begin_pass(CycleSignature {
        dataset_version: dataset.version,
        window,
        kind: settings.color.kind,
        repeated: settings.color.repeated,
        categorical: settings.color_by == ColorBy::Category,
        grouping_key: grouping_key.clone(),
    });
    trackers.elevation.begin_pass(CycleSignature {
        dataset_version: dataset.version,
        window,
        kind: settings.elevation.kind,
        repeated: settings.elevation.repeated,
        categorical: false,
        grouping_key,
    });
    let color_domain = trackers.color.update(color_fresh, settings.preserve_domains);
    let elevation_domain = trackers
        .elevation
        .update(elevation_fresh, settings.preserve_domains);

    debug!(
        "Aggregation pass: {} buckets, color {:?}, elevation {:?}",
        buckets.len(),
        color_domain,
        elevation_domain
    );
    results.publish(buckets, color_domain, elevation_domain);

    events.send(DomainUpdated {
        channel: DomainChannel::Color,
        domain: color_domain,
    });
    events.send(DomainUpdated {
        channel: DomainChannel::Elevation,
        domain: elevation_domain,
    });
}
