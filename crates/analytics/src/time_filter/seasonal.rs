//! Seasonal projection onto the reference year.

use bevy::prelude::*;
use chrono::{DateTime, Datelike, Utc};

use crate::data::{Dataset, PointView};

use super::types::ViewMode;

/// Leap year, so February 29 always has a target.
pub const REFERENCE_YEAR: i32 = 2020;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonalStamp {
    /// Same month, day and time of day in [`REFERENCE_YEAR`].
    pub projected: i64,
    /// Year of the raw timestamp, kept for display.
    pub original_year: i32,
}

/// Project epoch milliseconds onto [`REFERENCE_YEAR`]. Projecting a
/// projected timestamp returns it unchanged.
pub fn project_to_reference_year(timestamp: i64) -> Option<SeasonalStamp> {
    let dt: DateTime<Utc> = DateTime::from_timestamp_millis(timestamp)?;
    let projected = dt.with_year(REFERENCE_YEAR)?;
    Some(SeasonalStamp {
        projected: projected.timestamp_millis(),
        original_year: dt.year(),
    })
}

/// Projected timestamps for every point of the current dataset, by index.
#[derive(Resource, Debug, Default)]
pub struct SeasonalIndex {
    dataset_version: Option<u64>,
    stamps: Vec<Option<SeasonalStamp>>,
}

impl SeasonalIndex {
    pub fn build(dataset: &Dataset) -> Self {
        Self {
            dataset_version: Some(dataset.version),
            stamps: dataset
                .points
                .iter()
                .map(|p| p.timestamp.and_then(project_to_reference_year))
                .collect(),
        }
    }

    pub fn is_current(&self, dataset: &Dataset) -> bool {
        self.dataset_version == Some(dataset.version)
    }

    pub fn stamp(&self, index: usize) -> Option<SeasonalStamp> {
        self.stamps.get(index).copied().flatten()
    }
}

/// Borrow every point with its effective timestamp for `mode`.
pub fn point_views<'a>(
    dataset: &'a Dataset,
    seasonal: &SeasonalIndex,
    mode: ViewMode,
) -> Vec<PointView<'a>> {
    (0..dataset.points.len())
        .filter_map(|index| point_view(dataset, seasonal, mode, index))
        .collect()
}

/// One point with its effective timestamp for `mode`.
pub fn point_view<'a>(
    dataset: &'a Dataset,
    seasonal: &SeasonalIndex,
    mode: ViewMode,
    index: usize,
) -> Option<PointView<'a>> {
    let point = dataset.points.get(index)?;
    let timestamp = match mode {
        ViewMode::Historical => point.timestamp,
        ViewMode::Seasonal if seasonal.is_current(dataset) => {
            seasonal.stamp(index).map(|s| s.projected)
        }
        ViewMode::Seasonal => point
            .timestamp
            .and_then(project_to_reference_year)
            .map(|s| s.projected),
    };
    Some(PointView {
        index,
        point,
        timestamp,
    })
}
