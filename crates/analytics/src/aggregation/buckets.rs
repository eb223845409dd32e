//! Spatial bucketing of filtered points.
//!
//! A bucket is the set of points attributed to one spatial cell: a region, a
//! square grid cell, or a pointy-top hexagon. Buckets borrow their members
//! and live for a single aggregation pass.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::{PointView, Region};
use crate::geometry::is_point_in_region;

use super::kinds::{filter_window, TimeWindow};

/// Identity of a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CellKey {
    Region(String),
    Grid { col: i64, row: i64 },
    Hex { q: i64, r: i64 },
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellKey::Region(id) => write!(f, "{id}"),
            CellKey::Grid { col, row } => write!(f, "Cell {col},{row}"),
            CellKey::Hex { q, r } => write!(f, "Hex {q},{r}"),
        }
    }
}

/// How points are assigned to cells.
#[derive(Debug, Clone, Copy)]
pub enum Grouping<'r> {
    Regions(&'r [Region]),
    Grid { cell_size: f64 },
    Hex { radius: f64 },
}

impl Grouping<'_> {
    /// Cell key for a location under grid or hex grouping. Region grouping
    /// needs a containment test instead, so it returns `None`.
    pub fn cell_for(&self, lng: f64, lat: f64) -> Option<CellKey> {
        match *self {
            Grouping::Regions(_) => None,
            Grouping::Grid { cell_size } => grid_cell(lng, lat, cell_size),
            Grouping::Hex { radius } => hex_cell(lng, lat, radius),
        }
    }
}

pub fn grid_cell(lng: f64, lat: f64, cell_size: f64) -> Option<CellKey> {
    if cell_size <= 0.0 || !lng.is_finite() || !lat.is_finite() {
        return None;
    }
    Some(CellKey::Grid {
        col: (lng / cell_size).floor() as i64,
        row: (lat / cell_size).floor() as i64,
    })
}

/// Axial coordinates of the pointy-top hexagon of circumradius `radius`
/// containing the point, using cube rounding.
pub fn hex_cell(lng: f64, lat: f64, radius: f64) -> Option<CellKey> {
    if radius <= 0.0 || !lng.is_finite() || !lat.is_finite() {
        return None;
    }
    let q = (3f64.sqrt() / 3.0 * lng - lat / 3.0) / radius;
    let r = (2.0 / 3.0 * lat) / radius;
    let s = -q - r;

    let (mut rq, mut rr, rs) = (q.round(), r.round(), s.round());
    let (dq, dr, ds) = ((rq - q).abs(), (rr - r).abs(), (rs - s).abs());
    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }
    Some(CellKey::Hex {
        q: rq as i64,
        r: rr as i64,
    })
}

/// Center of a grid or hex cell in map coordinates.
pub fn cell_center(key: &CellKey, grouping: &Grouping<'_>) -> Option<(f64, f64)> {
    match (key, grouping) {
        (CellKey::Grid { col, row }, Grouping::Grid { cell_size }) => Some((
            (*col as f64 + 0.5) * cell_size,
            (*row as f64 + 0.5) * cell_size,
        )),
        (CellKey::Hex { q, r }, Grouping::Hex { radius }) => {
            let (q, r) = (*q as f64, *r as f64);
            Some((
                radius * 3f64.sqrt() * (q + r / 2.0),
                radius * 1.5 * r,
            ))
        }
        _ => None,
    }
}

/// Transient bucket for one aggregation pass.
#[derive(Debug, Clone)]
pub struct AggregationBucket<'a> {
    pub key: CellKey,
    pub members: Vec<PointView<'a>>,
    pub color_value: f64,
    pub elevation_value: f64,
}

impl<'a> AggregationBucket<'a> {
    fn new(key: CellKey) -> Self {
        Self {
            key,
            members: Vec::new(),
            color_value: 0.0,
            elevation_value: 0.0,
        }
    }
}

/// Assign points inside the window to buckets.
///
/// Region grouping yields one bucket per region in host order, including
/// regions with no members (their values fall back to the caller's default).
/// A point inside several overlapping regions is a member of each. Grid and
/// hex grouping yield only occupied cells, ordered by key.
pub fn bucket_points<'a>(
    points: &[PointView<'a>],
    grouping: &Grouping<'_>,
    window: TimeWindow,
) -> Vec<AggregationBucket<'a>> {
    let active = filter_window(points, window);
    match grouping {
        Grouping::Regions(regions) => regions
            .iter()
            .map(|region| {
                let mut bucket = AggregationBucket::new(CellKey::Region(region.id.clone()));
                bucket.members = active
                    .iter()
                    .filter(|p| is_point_in_region(p.point.lng, p.point.lat, region))
                    .map(|p| **p)
                    .collect();
                bucket
            })
            .collect(),
        Grouping::Grid { .. } | Grouping::Hex { .. } => {
            let mut cells: BTreeMap<CellKey, AggregationBucket<'a>> = BTreeMap::new();
            for p in active {
                let Some(key) = grouping.cell_for(p.point.lng, p.point.lat) else {
                    continue;
                };
                cells
                    .entry(key.clone())
                    .or_insert_with(|| AggregationBucket::new(key))
                    .members
                    .push(*p);
            }
            cells.into_values().collect()
        }
    }
}

/// Per-bucket summary handed to collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BucketSummary {
    /// Every member, numeric or not.
    pub count: usize,
    pub sum: f64,
    /// Mean over numeric members only.
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

pub fn summarize(members: &[PointView<'_>]) -> BucketSummary {
    let values: Vec<f64> = members.iter().filter_map(|p| p.point.value).collect();
    if values.is_empty() {
        return BucketSummary {
            count: members.len(),
            ..Default::default()
        };
    }
    let sum: f64 = values.iter().sum();
    BucketSummary {
        count: members.len(),
        sum,
        avg: sum / values.len() as f64,
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}
