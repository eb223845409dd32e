//! Data-driven map settings.
//!
//! Every tunable the engine reads lives in the [`MapSettings`] resource so a
//! host can ship a JSON file instead of recompiling. Missing fields fall back
//! to their defaults.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aggregation::{AggregateSpec, AggregationKind, MissingValues, RepeatedPointsKind};
use crate::ingest::IngestError;

/// Spatial grouping used for buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GroupingMode {
    #[default]
    Regions,
    Grid,
    Hex,
}

impl GroupingMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Regions => "Regions",
            Self::Grid => "Grid",
            Self::Hex => "Hexagons",
        }
    }
}

/// What drives the color channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorBy {
    #[default]
    Value,
    /// Most frequent category level per bucket; categorical domain.
    Category,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Milliseconds both window edges advance per tick.
    pub step_ms: i64,
    /// Seconds between ticks.
    pub interval_secs: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            step_ms: 86_400_000,
            interval_secs: 0.25,
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub grouping: GroupingMode,
    /// Grid cell edge in degrees.
    pub cell_size: f64,
    /// Hexagon circumradius in degrees.
    pub hex_radius: f64,
    pub color: AggregateSpec,
    /// Elevation defaults to 1 for empty buckets so flat cells stay visible.
    pub elevation: AggregateSpec,
    pub color_by: ColorBy,
    pub preserve_domains: bool,
    /// Show an overlay chart on hover instead of an inline label.
    pub chart_mode: bool,
    /// Collapse rule for chart series that repeat a timestamp.
    pub chart_repeated: Option<RepeatedPointsKind>,
    /// Pixel gap between pointer and overlay.
    pub overlay_padding: f32,
    pub animation: AnimationSettings,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            grouping: GroupingMode::Regions,
            cell_size: 0.05,
            hex_radius: 0.03,
            color: AggregateSpec::new(AggregationKind::Sum, 0.0),
            elevation: AggregateSpec {
                kind: AggregationKind::Count,
                repeated: None,
                default_value: 1.0,
                missing: MissingValues::AsZero,
            },
            color_by: ColorBy::Value,
            preserve_domains: false,
            chart_mode: true,
            chart_repeated: Some(RepeatedPointsKind::Mean),
            overlay_padding: 15.0,
            animation: AnimationSettings::default(),
        }
    }
}

impl MapSettings {
    /// Identity of the grouping for domain cycles.
    pub fn grouping_key(&self) -> String {
        match self.grouping {
            GroupingMode::Regions => "regions".to_string(),
            GroupingMode::Grid => format!("grid:{}", self.cell_size),
            GroupingMode::Hex => format!("hex:{}", self.hex_radius),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, IngestError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, IngestError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Load from `path`, logging and falling back to defaults on failure.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => {
                info!("Loaded map settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!(
                    "Map settings {}: {}, falling back to defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_call_site_defaults_distinct() {
        let s = MapSettings::default();
        assert_eq!(s.color.default_value, 0.0);
        assert_eq!(s.elevation.default_value, 1.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s = MapSettings::from_json(r#"{"grouping":"Hex","preserve_domains":true}"#)
            .expect("valid settings");
        assert_eq!(s.grouping, GroupingMode::Hex);
        assert!(s.preserve_domains);
        assert_eq!(s.overlay_padding, 15.0);
        assert_eq!(s.animation, AnimationSettings::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut s = MapSettings::default();
        s.color.kind = AggregationKind::Mode;
        s.color.missing = MissingValues::Skip;
        let text = serde_json::to_string(&s).expect("serialize");
        assert_eq!(MapSettings::from_json(&text).expect("parse"), s);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = MapSettings::from_json("{not json").unwrap_err();
        assert!(matches!(err, IngestError::Json(_)));
    }

    #[test]
    fn test_grouping_key_tracks_cell_size() {
        let mut s = MapSettings {
            grouping: GroupingMode::Grid,
            ..Default::default()
        };
        let before = s.grouping_key();
        s.cell_size = 0.1;
        assert_ne!(before, s.grouping_key());
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let s = MapSettings::load_or_default(Path::new("/nonexistent/timescape.json"));
        assert_eq!(s, MapSettings::default());
    }
}
