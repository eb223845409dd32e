//! Pointer picks and tooltip content.
//!
//! The renderer reports what lies under the pointer as [`PickEvent`]s. Each
//! pick is attributed to a bucket key; the tooltip then either shows an
//! inline summary label or is suppressed while the overlay chart takes over.

use bevy::prelude::*;

use crate::aggregation::{grouping_for, AggregationResults, BucketSummary, CellKey};
use crate::data::Dataset;
use crate::geometry::region_for_point;
use crate::overlay::{OverlayRequest, PendingOverlayRender};
use crate::settings::{GroupingMode, MapSettings};

/// Rendered layer a pick came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerId {
    Regions,
    Cells,
    Points,
}

/// The object under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum PickedObject {
    Region(String),
    Cell(CellKey),
    /// Index into `Dataset::points`.
    Point(usize),
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct PickEvent {
    /// `None` when the pointer left every pickable object.
    pub point: Option<PickedObject>,
    pub layer: LayerId,
    /// Pointer position in screen pixels.
    pub screen: Vec2,
    /// Pointer position as `(lng, lat)`.
    pub world: (f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipLabel {
    pub title: String,
    pub rows: Vec<(String, String)>,
}

impl TooltipLabel {
    /// Inline markup for hosts that render HTML-like labels.
    pub fn to_markup(&self) -> String {
        let mut markup = format!("<b>{}</b>", self.title);
        for (name, value) in &self.rows {
            markup.push_str(&format!("<br/>{name}: {value}"));
        }
        markup
    }
}

/// What the tooltip should show for the current pick.
#[derive(Debug, Clone, PartialEq)]
pub enum TooltipContent {
    Label(TooltipLabel),
    /// A chart is delegated to the overlay instead.
    Suppressed,
}

#[derive(Resource, Debug, Default)]
pub struct TooltipState {
    pub content: Option<TooltipContent>,
    pub key: Option<CellKey>,
    pub layer: Option<LayerId>,
    pub screen: Vec2,
}

impl TooltipState {
    pub fn clear(&mut self) {
        self.content = None;
        self.key = None;
        self.layer = None;
    }
}

/// Bucket key a picked object belongs to under the current grouping.
///
/// A picked point resolves to the first region containing it under region
/// grouping, or to its grid or hex cell otherwise.
pub fn resolve_key(
    picked: &PickedObject,
    dataset: &Dataset,
    settings: &MapSettings,
) -> Option<CellKey> {
    match picked {
        PickedObject::Region(id) => Some(CellKey::Region(id.clone())),
        PickedObject::Cell(key) => Some(key.clone()),
        PickedObject::Point(index) => {
            let point = dataset.points.get(*index)?;
            match settings.grouping {
                GroupingMode::Regions => region_for_point(point.lng, point.lat, &dataset.regions)
                    .map(|region| CellKey::Region(region.id.clone())),
                GroupingMode::Grid | GroupingMode::Hex => {
                    grouping_for(settings, &dataset.regions).cell_for(point.lng, point.lat)
                }
            }
        }
    }
}

/// Summary label for a bucket. A key without a bucket reads as empty.
pub fn summary_label(key: &CellKey, summary: Option<BucketSummary>) -> TooltipLabel {
    let summary = summary.unwrap_or_default();
    let mut rows = vec![("Count".to_string(), summary.count.to_string())];
    if summary.count > 0 {
        rows.extend([
            ("Sum".to_string(), format!("{:.2}", summary.sum)),
            ("Avg".to_string(), format!("{:.2}", summary.avg)),
            ("Min".to_string(), format!("{:.2}", summary.min)),
            ("Max".to_string(), format!("{:.2}", summary.max)),
        ]);
    }
    TooltipLabel {
        title: key.to_string(),
        rows,
    }
}

/// Turn picks into tooltip content and overlay requests.
pub fn handle_pick_events(
    mut picks: EventReader<PickEvent>,
    dataset: Res<Dataset>,
    settings: Res<MapSettings>,
    results: Res<AggregationResults>,
    mut tooltip: ResMut<TooltipState>,
    mut pending: ResMut<PendingOverlayRender>,
) {
    for pick in picks.read() {
        tooltip.screen = pick.screen;
        let key = pick
            .point
            .as_ref()
            .and_then(|picked| resolve_key(picked, &dataset, &settings));
        let Some(key) = key else {
            tooltip.clear();
            pending.schedule(OverlayRequest::Hide);
            continue;
        };

        let content = if settings.chart_mode {
            pending.schedule(OverlayRequest::Show {
                key: key.clone(),
                pointer: pick.screen,
            });
            TooltipContent::Suppressed
        } else {
            pending.schedule(OverlayRequest::Hide);
            TooltipContent::Label(summary_label(&key, results.summary(&key)))
        };
        tooltip.content = Some(content);
        tooltip.key = Some(key);
        tooltip.layer = Some(pick.layer);
    }
}

/// Re-derive the hover content for the current key after every aggregation
/// pass, so a still pointer follows filter changes and animation ticks.
///
/// A request already pending this frame came from a newer pick and wins.
pub fn refresh_hover_content(
    settings: Res<MapSettings>,
    results: Res<AggregationResults>,
    mut tooltip: ResMut<TooltipState>,
    mut pending: ResMut<PendingOverlayRender>,
) {
    if !results.is_changed() || pending.is_pending() {
        return;
    }
    let Some(key) = tooltip.key.clone() else {
        return;
    };

    if settings.chart_mode {
        pending.schedule(OverlayRequest::Show {
            key,
            pointer: tooltip.screen,
        });
        tooltip.content = Some(TooltipContent::Suppressed);
    } else {
        if tooltip.content == Some(TooltipContent::Suppressed) {
            pending.schedule(OverlayRequest::Hide);
        }
        tooltip.content = Some(TooltipContent::Label(summary_label(
            &key,
            results.summary(&key),
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataPoint, Region};

    fn dataset() -> Dataset {
        let mut dataset = Dataset::default();
        dataset.replace(
            vec![
                DataPoint::new(1.0, 1.0, None, Some(2.0)),
                DataPoint::new(9.0, 9.0, None, Some(4.0)),
            ],
            vec![
                Region::polygon("left", vec![vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]]),
                Region::polygon("big", vec![vec![(0.0, 0.0), (5.0, 0.0), (5.0, 5.0), (0.0, 5.0)]]),
            ],
        );
        dataset
    }

    #[test]
    fn test_point_attributed_to_first_containing_region() {
        let key = resolve_key(&PickedObject::Point(0), &dataset(), &MapSettings::default());
        assert_eq!(key, Some(CellKey::Region("left".into())));
    }

    #[test]
    fn test_point_outside_every_region_has_no_key() {
        let key = resolve_key(&PickedObject::Point(1), &dataset(), &MapSettings::default());
        assert_eq!(key, None);
    }

    #[test]
    fn test_point_uses_grid_cell_under_grid_grouping() {
        let settings = MapSettings {
            grouping: GroupingMode::Grid,
            cell_size: 5.0,
            ..Default::default()
        };
        let key = resolve_key(&PickedObject::Point(1), &dataset(), &settings);
        assert_eq!(key, Some(CellKey::Grid { col: 1, row: 1 }));
    }

    #[test]
    fn test_unknown_point_index_has_no_key() {
        let key = resolve_key(&PickedObject::Point(99), &dataset(), &MapSettings::default());
        assert_eq!(key, None);
    }

    #[test]
    fn test_summary_label_markup() {
        let label = summary_label(
            &CellKey::Region("left".into()),
            Some(BucketSummary {
                count: 2,
                sum: 6.0,
                avg: 3.0,
                min: 2.0,
                max: 4.0,
            }),
        );
        let markup = label.to_markup();
        assert!(markup.starts_with("<b>left</b>"));
        assert!(markup.contains("Count: 2"));
        assert!(markup.contains("Avg: 3.00"));
    }

    #[test]
    fn test_empty_bucket_label_has_only_count() {
        let label = summary_label(&CellKey::Grid { col: 0, row: 0 }, None);
        assert_eq!(label.rows, vec![("Count".to_string(), "0".to_string())]);
    }
}
