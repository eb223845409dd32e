//! The map itself: bucket layers, points, pan/zoom and hover picking.
//!
//! Buckets are painted from the latest [`AggregationResults`]. Color comes
//! from the color domain; elevation has no third dimension on a flat map, so
//! it drives fill opacity instead.
//!
//! Hover picks go out as [`PickEvent`]s only when the object under the
//! pointer changes. Moving over the same object just drags the overlay along.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use analytics::aggregation::{grouping_for, AggregationResults, BucketRecord, CellKey};
use analytics::data::{Dataset, Ring};
use analytics::geometry::region_for_point;
use analytics::overlay::OverlayManager;
use analytics::picking::{LayerId, PickEvent, PickedObject, TooltipState};
use analytics::settings::{GroupingMode, MapSettings};

use crate::color_ramps::{color_for, NO_DATA};
use crate::overlay_target::EguiOverlayTarget;

/// Screen radius within which a point wins the pick over its bucket.
const POINT_PICK_RADIUS: f32 = 6.0;

const MIN_SCALE: f64 = 1.0;
const MAX_SCALE: f64 = 1.0e6;

// =============================================================================
// Resources
// =============================================================================

/// Pan/zoom state. `scale` is screen pixels per degree.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct MapView {
    pub center: (f64, f64),
    pub scale: f64,
    /// Dataset version the view was last fitted to.
    pub fitted_version: Option<u64>,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: (0.0, 0.0),
            scale: 400.0,
            fitted_version: None,
        }
    }
}

impl MapView {
    pub fn to_screen(&self, (lng, lat): (f64, f64), rect: egui::Rect) -> egui::Pos2 {
        let c = rect.center();
        egui::pos2(
            c.x + ((lng - self.center.0) * self.scale) as f32,
            c.y - ((lat - self.center.1) * self.scale) as f32,
        )
    }

    pub fn to_world(&self, pos: egui::Pos2, rect: egui::Rect) -> (f64, f64) {
        let c = rect.center();
        (
            self.center.0 + (pos.x - c.x) as f64 / self.scale,
            self.center.1 - (pos.y - c.y) as f64 / self.scale,
        )
    }

    /// Center on `extent` and zoom so it fills 90% of `rect`.
    pub fn fit(&mut self, extent: (f64, f64, f64, f64), rect: egui::Rect) {
        let (x0, y0, x1, y1) = extent;
        self.center = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
        let span = (x1 - x0).max(y1 - y0);
        if span > 0.0 {
            let px = rect.width().min(rect.height()) as f64 * 0.9;
            self.scale = (px / span).clamp(MIN_SCALE, MAX_SCALE);
        }
    }

    pub fn zoom(&mut self, factor: f64) {
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
    }
}

/// What the pointer was over last frame.
#[derive(Resource, Debug, Default)]
pub struct HoverState {
    pub picked: Option<PickedObject>,
    pub screen: Option<Vec2>,
}

// =============================================================================
// Helpers
// =============================================================================

/// Bounding box of every region and point.
pub fn dataset_extent(dataset: &Dataset) -> Option<(f64, f64, f64, f64)> {
    let region_corners = dataset.regions.iter().filter_map(|r| r.bounds()).flat_map(
        |(x0, y0, x1, y1)| [(x0, y0), (x1, y1)],
    );
    let points = dataset.points.iter().map(|p| (p.lng, p.lat));
    region_corners
        .chain(points)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .fold(None, |acc, (x, y)| {
            Some(match acc {
                None => (x, y, x, y),
                Some((a, b, c, d)) => (a.min(x), b.min(y), c.max(x), d.max(y)),
            })
        })
}

/// Nearest projected point within `radius` pixels of `pointer`.
pub fn nearest_point(
    pointer: egui::Pos2,
    points: &[(usize, egui::Pos2)],
    radius: f32,
) -> Option<usize> {
    points
        .iter()
        .map(|(index, pos)| (*index, pos.distance(pointer)))
        .filter(|(_, d)| *d <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

/// Object under the pointer: a nearby point first, then the bucket below.
pub fn pick_at(
    pointer: egui::Pos2,
    world: (f64, f64),
    projected: &[(usize, egui::Pos2)],
    dataset: &Dataset,
    results: &AggregationResults,
    settings: &MapSettings,
) -> Option<(PickedObject, LayerId)> {
    if let Some(index) = nearest_point(pointer, projected, POINT_PICK_RADIUS) {
        return Some((PickedObject::Point(index), LayerId::Points));
    }
    match settings.grouping {
        GroupingMode::Regions => region_for_point(world.0, world.1, &dataset.regions)
            .map(|region| (PickedObject::Region(region.id.clone()), LayerId::Regions)),
        GroupingMode::Grid | GroupingMode::Hex => grouping_for(settings, &dataset.regions)
            .cell_for(world.0, world.1)
            .filter(|key| results.get(key).is_some())
            .map(|key| (PickedObject::Cell(key), LayerId::Cells)),
    }
}

/// Points taking part in the latest pass, each once.
fn visible_members(results: &AggregationResults) -> Vec<usize> {
    let mut members: Vec<usize> = results
        .buckets()
        .iter()
        .flat_map(|b| b.members.iter().copied())
        .collect();
    members.sort_unstable();
    members.dedup();
    members
}

fn hexagon(center: egui::Pos2, radius: f32) -> Vec<egui::Pos2> {
    (0..6)
        .map(|i| {
            let angle = std::f32::consts::FRAC_PI_3 * i as f32 + std::f32::consts::FRAC_PI_6;
            egui::pos2(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect()
}

fn bucket_fill(
    bucket: Option<&BucketRecord>,
    results: &AggregationResults,
) -> egui::Color32 {
    let Some(bucket) = bucket else {
        return NO_DATA;
    };
    let base = color_for(bucket.color_value, results.color_domain.as_ref());
    let weight = results
        .elevation_domain
        .map_or(1.0, |d| d.normalize(bucket.elevation_value));
    base.gamma_multiply(0.35 + 0.65 * weight)
}

// =============================================================================
// Painting
// =============================================================================

fn paint_ring(
    painter: &egui::Painter,
    ring: &Ring,
    view: &MapView,
    rect: egui::Rect,
    fill: egui::Color32,
    stroke: egui::Stroke,
) {
    let outline: Vec<egui::Pos2> = ring.iter().map(|&p| view.to_screen(p, rect)).collect();
    if outline.len() < 3 {
        return;
    }
    // Concave rings still get a correct outline; only the fill approximates.
    painter.add(egui::Shape::convex_polygon(outline, fill, stroke));
}

fn paint_buckets(
    painter: &egui::Painter,
    view: &MapView,
    rect: egui::Rect,
    dataset: &Dataset,
    results: &AggregationResults,
    settings: &MapSettings,
    hovered: Option<&CellKey>,
) {
    let outline = egui::Stroke::new(0.8, egui::Color32::from_gray(20));
    let highlight = egui::Stroke::new(2.0, egui::Color32::WHITE);

    match settings.grouping {
        GroupingMode::Regions => {
            for region in &dataset.regions {
                let key = CellKey::Region(region.id.clone());
                let fill = bucket_fill(results.get(&key), results);
                let stroke = if hovered == Some(&key) { highlight } else { outline };
                for ring in region.membership_rings() {
                    paint_ring(painter, ring, view, rect, fill, stroke);
                }
            }
        }
        GroupingMode::Grid => {
            let half = settings.cell_size / 2.0;
            for bucket in results.buckets() {
                let Some((cx, cy)) = bucket.center else {
                    continue;
                };
                let min = view.to_screen((cx - half, cy + half), rect);
                let max = view.to_screen((cx + half, cy - half), rect);
                let stroke = if hovered == Some(&bucket.key) { highlight } else { outline };
                let cell = egui::Rect::from_min_max(min, max);
                painter.rect_filled(cell, 0.0, bucket_fill(Some(bucket), results));
                painter.rect_stroke(cell, 0.0, stroke, egui::StrokeKind::Inside);
            }
        }
        GroupingMode::Hex => {
            let radius = (settings.hex_radius * view.scale) as f32;
            for bucket in results.buckets() {
                let Some(center) = bucket.center else {
                    continue;
                };
                let stroke = if hovered == Some(&bucket.key) { highlight } else { outline };
                painter.add(egui::Shape::convex_polygon(
                    hexagon(view.to_screen(center, rect), radius),
                    bucket_fill(Some(bucket), results),
                    stroke,
                ));
            }
        }
    }
}

// =============================================================================
// System
// =============================================================================

/// Draw the map, handle pan/zoom and report hover picks.
#[allow(clippy::too_many_arguments)]
pub fn map_canvas_ui(
    mut contexts: EguiContexts,
    mut view: ResMut<MapView>,
    mut hover: ResMut<HoverState>,
    mut overlay: ResMut<OverlayManager<EguiOverlayTarget>>,
    mut tooltip: ResMut<TooltipState>,
    mut picks: EventWriter<PickEvent>,
    dataset: Res<Dataset>,
    results: Res<AggregationResults>,
    settings: Res<MapSettings>,
) {
    egui::CentralPanel::default()
        .frame(egui::Frame::new().fill(egui::Color32::from_rgb(14, 16, 22)))
        .show(contexts.ctx_mut(), |ui| {
            let rect = ui.max_rect();
            let response = ui.allocate_rect(rect, egui::Sense::drag());
            overlay
                .target_mut()
                .set_viewport(Rect::new(rect.min.x, rect.min.y, rect.max.x, rect.max.y));

            if view.fitted_version != Some(dataset.version) {
                if let Some(extent) = dataset_extent(&dataset) {
                    view.fit(extent, rect);
                }
                view.fitted_version = Some(dataset.version);
            }

            if response.dragged() {
                let delta = response.drag_delta();
                let scale = view.scale;
                view.center.0 -= delta.x as f64 / scale;
                view.center.1 += delta.y as f64 / scale;
            }
            if response.hovered() {
                let scroll = ui.input(|i| i.smooth_scroll_delta.y);
                if scroll != 0.0 {
                    view.zoom((1.0 + scroll as f64 * 0.002).max(0.1));
                }
            }

            let painter = ui.painter_at(rect);
            paint_buckets(
                &painter,
                &view,
                rect,
                &dataset,
                &results,
                &settings,
                tooltip.key.as_ref(),
            );

            let projected: Vec<(usize, egui::Pos2)> = visible_members(&results)
                .into_iter()
                .filter_map(|index| {
                    let p = dataset.points.get(index)?;
                    Some((index, view.to_screen((p.lng, p.lat), rect)))
                })
                .collect();
            for (_, pos) in &projected {
                painter.circle_filled(*pos, 2.0, egui::Color32::from_gray(220));
            }

            let Some(pointer) = response.hover_pos() else {
                if hover.picked.is_some() {
                    picks.send(PickEvent {
                        point: None,
                        layer: LayerId::Regions,
                        screen: hover.screen.unwrap_or_default(),
                        world: (0.0, 0.0),
                    });
                }
                *hover = HoverState::default();
                return;
            };

            let screen = Vec2::new(pointer.x, pointer.y);
            let world = view.to_world(pointer, rect);
            let picked = pick_at(pointer, world, &projected, &dataset, &results, &settings);
            let object = picked.as_ref().map(|(object, _)| object.clone());

            if object != hover.picked {
                picks.send(PickEvent {
                    point: object.clone(),
                    layer: picked.map_or(LayerId::Regions, |(_, layer)| layer),
                    screen,
                    world,
                });
            } else if object.is_some() && hover.screen != Some(screen) {
                overlay.pointer_moved(screen);
                tooltip.screen = screen;
            }
            hover.picked = object;
            hover.screen = Some(screen);
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::data::{DataPoint, Region};

    fn rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0))
    }

    #[test]
    fn test_screen_world_round_trip() {
        let view = MapView {
            center: (10.0, 50.0),
            scale: 200.0,
            fitted_version: None,
        };
        let pos = view.to_screen((10.5, 49.5), rect());
        let (lng, lat) = view.to_world(pos, rect());
        assert!((lng - 10.5).abs() < 1e-3);
        assert!((lat - 49.5).abs() < 1e-3);
    }

    #[test]
    fn test_north_is_up() {
        let view = MapView::default();
        let north = view.to_screen((0.0, 1.0), rect());
        let south = view.to_screen((0.0, -1.0), rect());
        assert!(north.y < south.y);
    }

    #[test]
    fn test_fit_centers_extent() {
        let mut view = MapView::default();
        view.fit((0.0, 0.0, 2.0, 1.0), rect());
        assert_eq!(view.center, (1.0, 0.5));
        assert!((view.scale - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_nearest_point_within_radius() {
        let points = vec![
            (0, egui::pos2(100.0, 100.0)),
            (1, egui::pos2(103.0, 100.0)),
            (2, egui::pos2(300.0, 300.0)),
        ];
        assert_eq!(nearest_point(egui::pos2(102.5, 100.0), &points, 6.0), Some(1));
        assert_eq!(nearest_point(egui::pos2(200.0, 200.0), &points, 6.0), None);
    }

    #[test]
    fn test_pick_prefers_point_then_region() {
        let mut dataset = Dataset::default();
        dataset.replace(
            vec![DataPoint::new(0.5, 0.5, None, Some(1.0))],
            vec![Region::polygon(
                "A",
                vec![vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]],
            )],
        );
        let results = AggregationResults::default();
        let settings = MapSettings::default();
        let projected = vec![(0, egui::pos2(50.0, 50.0))];

        let on_point = pick_at(
            egui::pos2(51.0, 50.0),
            (0.5, 0.5),
            &projected,
            &dataset,
            &results,
            &settings,
        );
        assert_eq!(on_point, Some((PickedObject::Point(0), LayerId::Points)));

        let on_region = pick_at(
            egui::pos2(90.0, 90.0),
            (0.2, 0.2),
            &projected,
            &dataset,
            &results,
            &settings,
        );
        assert_eq!(
            on_region,
            Some((PickedObject::Region("A".into()), LayerId::Regions))
        );
    }

    #[test]
    fn test_pick_ignores_empty_grid_cells() {
        let dataset = Dataset::default();
        let results = AggregationResults::default();
        let settings = MapSettings {
            grouping: GroupingMode::Grid,
            ..Default::default()
        };
        let picked = pick_at(egui::Pos2::ZERO, (0.01, 0.01), &[], &dataset, &results, &settings);
        assert_eq!(picked, None);
    }

    #[test]
    fn test_dataset_extent_covers_points_and_regions() {
        let mut dataset = Dataset::default();
        dataset.replace(
            vec![DataPoint::new(-3.0, 4.0, None, None)],
            vec![Region::polygon(
                "A",
                vec![vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]],
            )],
        );
        assert_eq!(dataset_extent(&dataset), Some((-3.0, 0.0, 1.0, 4.0)));
    }
}
