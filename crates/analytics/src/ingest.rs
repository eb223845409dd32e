// ---------------------------------------------------------------------------
// Ingestion of host payloads (GeoJSON-style regions, JSON point arrays)
// ---------------------------------------------------------------------------

use std::fmt;
use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;
use serde_json::Value;

use crate::data::{DataPoint, Region, RegionGeometry, Ring};

/// Errors raised while reading host payloads or settings.
#[derive(Debug)]
pub enum IngestError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// The payload parsed but does not have the expected shape.
    Shape(String),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::Io(e) => write!(f, "I/O error: {e}"),
            IngestError::Json(e) => write!(f, "JSON error: {e}"),
            IngestError::Shape(msg) => write!(f, "Unexpected payload shape: {msg}"),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::Io(e) => Some(e),
            IngestError::Json(e) => Some(e),
            IngestError::Shape(_) => None,
        }
    }
}

impl From<std::io::Error> for IngestError {
    fn from(e: std::io::Error) -> Self {
        IngestError::Io(e)
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(e: serde_json::Error) -> Self {
        IngestError::Json(e)
    }
}

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Option<Value>,
    #[serde(default)]
    geometry: Option<Value>,
}

/// Parse a FeatureCollection of Polygon / MultiPolygon features.
///
/// A feature without usable `coordinates` becomes a region with
/// [`RegionGeometry::Missing`] rather than an error, so it simply has no
/// members. Ids come from `properties.id`, then the feature id, then the
/// feature's position.
pub fn parse_regions(text: &str) -> Result<Vec<Region>, IngestError> {
    Ok(regions_from_collection(serde_json::from_str(text)?))
}

fn regions_from_collection(collection: FeatureCollection) -> Vec<Region> {
    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(i, feature)| {
            let id = feature_id(&feature).unwrap_or_else(|| i.to_string());
            let geometry = feature
                .geometry
                .as_ref()
                .and_then(parse_geometry)
                .unwrap_or(RegionGeometry::Missing);
            if geometry == RegionGeometry::Missing {
                warn!("Region '{}' has no usable coordinates; it will have no members", id);
            }
            Region { id, geometry }
        })
        .collect()
}

fn feature_id(feature: &Feature) -> Option<String> {
    let from_props = feature.properties.as_ref().and_then(|p| p.get("id"));
    from_props
        .or(feature.id.as_ref())
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

fn parse_geometry(geometry: &Value) -> Option<RegionGeometry> {
    let kind = geometry.get("type")?.as_str()?;
    let coordinates = geometry.get("coordinates")?;
    match kind {
        "Polygon" => Some(RegionGeometry::Polygon(parse_rings(coordinates)?)),
        "MultiPolygon" => Some(RegionGeometry::MultiPolygon(
            coordinates
                .as_array()?
                .iter()
                .map(parse_rings)
                .collect::<Option<Vec<_>>>()?,
        )),
        _ => None,
    }
}

fn parse_rings(value: &Value) -> Option<Vec<Ring>> {
    value
        .as_array()?
        .iter()
        .map(|ring| {
            ring.as_array()?
                .iter()
                .map(|vertex| {
                    let pair = vertex.as_array()?;
                    Some((pair.first()?.as_f64()?, pair.get(1)?.as_f64()?))
                })
                .collect::<Option<Ring>>()
        })
        .collect()
}

#[derive(Deserialize)]
struct RawPoint {
    lng: f64,
    lat: f64,
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    category: Option<String>,
}

/// Parse a JSON array of points. Numbers and numeric strings become values;
/// anything else is kept as a non-numeric (`None`) value.
pub fn parse_points(text: &str) -> Result<Vec<DataPoint>, IngestError> {
    Ok(points_from_raw(serde_json::from_str(text)?))
}

fn points_from_raw(raw: Vec<RawPoint>) -> Vec<DataPoint> {
    raw.into_iter()
        .map(|p| DataPoint {
            lng: p.lng,
            lat: p.lat,
            timestamp: p.timestamp,
            value: p.value.as_ref().and_then(numeric_value),
            category: p.category,
        })
        .collect()
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Host bundle: `{"points": [...], "regions": {FeatureCollection}}`.
pub fn load_bundle(path: &Path) -> Result<(Vec<DataPoint>, Vec<Region>), IngestError> {
    let text = std::fs::read_to_string(path)?;
    parse_bundle(&text)
}

/// Parse a host bundle. The `regions` member is optional.
pub fn parse_bundle(text: &str) -> Result<(Vec<DataPoint>, Vec<Region>), IngestError> {
    let mut root: Value = serde_json::from_str(text)?;
    let points = root
        .get_mut("points")
        .map(Value::take)
        .ok_or_else(|| IngestError::Shape("missing \"points\"".to_string()))?;
    let points = points_from_raw(serde_json::from_value(points)?);
    let regions = match root.get_mut("regions").map(Value::take) {
        Some(regions) => regions_from_collection(serde_json::from_value(regions)?),
        None => Vec::new(),
    };
    Ok((points, regions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_polygon_and_multipolygon() {
        let text = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"id":"north"},
             "geometry":{"type":"Polygon","coordinates":[[[0,0],[2,0],[1,2],[0,0]]]}},
            {"type":"Feature","id":7,
             "geometry":{"type":"MultiPolygon","coordinates":[[[[5,5],[6,5],[6,6]]],[[[8,8],[9,8],[9,9]]]]}}
        ]}"#;
        let regions = parse_regions(text).expect("valid collection");
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].id, "north");
        assert!(matches!(regions[0].geometry, RegionGeometry::Polygon(ref r) if r[0].len() == 4));
        assert_eq!(regions[1].id, "7");
        assert!(matches!(regions[1].geometry, RegionGeometry::MultiPolygon(ref p) if p.len() == 2));
    }

    #[test]
    fn test_missing_coordinates_becomes_missing_geometry() {
        let text = r#"{"features":[{"properties":{"id":"ghost"},"geometry":{"type":"Polygon"}}]}"#;
        let regions = parse_regions(text).expect("collection parses");
        assert_eq!(regions[0].geometry, RegionGeometry::Missing);
    }

    #[test]
    fn test_feature_without_id_uses_position() {
        let text = r#"{"features":[{"geometry":null},{"geometry":null}]}"#;
        let regions = parse_regions(text).expect("collection parses");
        assert_eq!(regions[1].id, "1");
    }

    #[test]
    fn test_point_values_numeric_string_and_garbage() {
        let text = r#"[
            {"lng":1,"lat":2,"timestamp":100,"value":3.5},
            {"lng":1,"lat":2,"value":"4.25","category":"a"},
            {"lng":1,"lat":2,"value":"n/a"},
            {"lng":1,"lat":2}
        ]"#;
        let points = parse_points(text).expect("valid points");
        assert_eq!(points[0].value, Some(3.5));
        assert_eq!(points[0].timestamp, Some(100));
        assert_eq!(points[1].value, Some(4.25));
        assert_eq!(points[1].category.as_deref(), Some("a"));
        assert_eq!(points[2].value, None);
        assert_eq!(points[3].value, None);
    }

    #[test]
    fn test_bundle_points_and_regions() {
        let text = r#"{
            "points": [{"lng":0.5,"lat":0.5,"timestamp":10,"value":"2"}],
            "regions": {"features":[{"properties":{"id":"a"},
                "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1]]]}}]}
        }"#;
        let (points, regions) = parse_bundle(text).expect("valid bundle");
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, Some(2.0));
        assert_eq!(regions[0].id, "a");
    }

    #[test]
    fn test_bundle_without_regions() {
        let (points, regions) = parse_bundle(r#"{"points":[]}"#).expect("valid bundle");
        assert!(points.is_empty());
        assert!(regions.is_empty());
    }

    #[test]
    fn test_bundle_shape_errors() {
        assert!(matches!(
            parse_bundle(r#"{"regions":{"features":[]}}"#),
            Err(IngestError::Shape(_))
        ));
        assert!(matches!(
            parse_bundle(r#"{"points":{"lng":1}}"#),
            Err(IngestError::Json(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(parse_points("[{"), Err(IngestError::Json(_))));
    }

    #[test]
    fn test_error_display_and_source() {
        let err = IngestError::Shape("missing points".to_string());
        assert!(format!("{err}").contains("missing points"));
        assert!(std::error::Error::source(&err).is_none());
        let io: IngestError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(std::error::Error::source(&io).is_some());
    }
}
