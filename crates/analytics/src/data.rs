//! Host-owned point and region data.
//!
//! The [`Dataset`] resource owns every ingested [`DataPoint`] and [`Region`].
//! Engine passes never copy points: they borrow them through [`PointView`],
//! which pairs a point with the timestamp that is effective for the current
//! view mode (raw or seasonally projected).

use std::collections::BTreeSet;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// A single observation. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub lng: f64,
    pub lat: f64,
    /// Epoch milliseconds (UTC). `None` for untimed datasets.
    pub timestamp: Option<i64>,
    /// `None` when the host value was not numeric.
    pub value: Option<f64>,
    pub category: Option<String>,
}

impl DataPoint {
    pub fn new(lng: f64, lat: f64, timestamp: Option<i64>, value: Option<f64>) -> Self {
        Self {
            lng,
            lat,
            timestamp,
            value,
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// An ordered ring of `(lng, lat)` vertices.
pub type Ring = Vec<(f64, f64)>;

/// Boundary geometry of a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegionGeometry {
    /// Rings of one polygon. Only ring 0 is used for membership.
    Polygon(Vec<Ring>),
    /// Ring groups, one per polygon. Every ring is additive.
    MultiPolygon(Vec<Vec<Ring>>),
    /// The host sent no usable coordinates.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub geometry: RegionGeometry,
}

impl Region {
    pub fn polygon(id: impl Into<String>, rings: Vec<Ring>) -> Self {
        Self {
            id: id.into(),
            geometry: RegionGeometry::Polygon(rings),
        }
    }

    pub fn multi_polygon(id: impl Into<String>, polygons: Vec<Vec<Ring>>) -> Self {
        Self {
            id: id.into(),
            geometry: RegionGeometry::MultiPolygon(polygons),
        }
    }

    /// Rings that take part in membership tests.
    pub fn membership_rings(&self) -> Vec<&Ring> {
        match &self.geometry {
            RegionGeometry::Polygon(rings) => rings.first().into_iter().collect(),
            RegionGeometry::MultiPolygon(polygons) => polygons.iter().flatten().collect(),
            RegionGeometry::Missing => Vec::new(),
        }
    }

    /// Bounding box `(min_lng, min_lat, max_lng, max_lat)` of the membership rings.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut iter = self.membership_rings().into_iter().flatten();
        let &(x0, y0) = iter.next()?;
        Some(iter.fold((x0, y0, x0, y0), |(a, b, c, d), &(x, y)| {
            (a.min(x), b.min(y), c.max(x), d.max(y))
        }))
    }
}

/// Anything the aggregation engine can read a time and a value from.
pub trait TimedValue {
    fn timestamp(&self) -> Option<i64>;
    fn value(&self) -> Option<f64>;
}

impl TimedValue for DataPoint {
    fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }

    fn value(&self) -> Option<f64> {
        self.value
    }
}

impl<T: TimedValue> TimedValue for &T {
    fn timestamp(&self) -> Option<i64> {
        (**self).timestamp()
    }

    fn value(&self) -> Option<f64> {
        (**self).value()
    }
}

/// A borrowed point with its view-mode timestamp.
#[derive(Debug, Clone, Copy)]
pub struct PointView<'a> {
    pub index: usize,
    pub point: &'a DataPoint,
    pub timestamp: Option<i64>,
}

impl TimedValue for PointView<'_> {
    fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }

    fn value(&self) -> Option<f64> {
        self.point.value
    }
}

/// Resource holding the host's current points and regions.
///
/// `version` increases on every replacement so passes can detect a new
/// dataset without comparing contents.
#[derive(Resource, Debug, Default)]
pub struct Dataset {
    pub points: Vec<DataPoint>,
    pub regions: Vec<Region>,
    pub version: u64,
}

impl Dataset {
    pub fn replace(&mut self, points: Vec<DataPoint>, regions: Vec<Region>) {
        self.points = points;
        self.regions = regions;
        self.version += 1;
        info!(
            "Dataset v{}: {} points, {} regions",
            self.version,
            self.points.len(),
            self.regions.len()
        );
    }

    pub fn has_timestamps(&self) -> bool {
        self.points.iter().any(|p| p.timestamp.is_some())
    }

    /// Sorted distinct category labels. A point's level is its index here.
    pub fn category_levels(&self) -> Vec<String> {
        self.points
            .iter()
            .filter_map(|p| p.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }
}
