use bevy::prelude::*;

use super::*;
use crate::aggregation::CellKey;
use crate::test_harness::RecordingTarget;

fn region(id: &str) -> CellKey {
    CellKey::Region(id.to_string())
}

fn series(title: &str, y: f64) -> ChartSeries {
    ChartSeries {
        title: title.to_string(),
        points: vec![(0.0, y), (1.0, y + 1.0)],
        trend: Vec::new(),
    }
}

fn manager() -> OverlayManager<RecordingTarget> {
    OverlayManager::new(RecordingTarget::default())
}

// -------------------------------------------------------------------------
// show / hide / dispose
// -------------------------------------------------------------------------

#[test]
fn test_state_is_created_lazily() {
    let mut m = manager();
    assert!(m.active_key().is_none());
    m.hide();
    assert_eq!(m.handle_count(), 0);
    assert!(m.target().created.is_empty());
}

#[test]
fn test_switching_keys_disposes_previous_once() {
    let mut m = manager();
    m.show(region("A"), Vec2::ZERO, || Ok(series("A", 1.0)));
    let creates_before = m.target().created.len();

    let outcome = m.show(region("B"), Vec2::ZERO, || Ok(series("B", 2.0)));

    assert_eq!(outcome, ShowOutcome::Built);
    assert_eq!(m.target().created.len() - creates_before, 1);
    assert_eq!(m.target().disposed.len(), 1);
    assert_eq!(m.target().disposed[0], m.target().created[0].1);
    assert_eq!(m.active_key(), Some(&region("B")));
    assert_eq!(m.handle_count(), 1);
}

#[test]
fn test_same_key_same_series_only_repositions() {
    let mut m = manager();
    m.show(region("A"), Vec2::new(10.0, 10.0), || Ok(series("A", 1.0)));
    let first_position = m.target().position;

    let outcome = m.show(region("A"), Vec2::new(50.0, 40.0), || Ok(series("A", 1.0)));

    assert_eq!(outcome, ShowOutcome::Reused);
    assert_eq!(m.target().created.len(), 1);
    assert!(m.target().disposed.is_empty());
    assert_ne!(m.target().position, first_position);
}

#[test]
fn test_same_key_changed_series_rebuilds() {
    let mut m = manager();
    m.show(region("A"), Vec2::ZERO, || Ok(series("A", 1.0)));
    let outcome = m.show(region("A"), Vec2::ZERO, || Ok(series("A", 5.0)));
    assert_eq!(outcome, ShowOutcome::Built);
    assert_eq!(m.target().created.len(), 2);
    assert_eq!(m.target().disposed.len(), 1);
    assert_eq!(m.handle_count(), 1);
}

#[test]
fn test_builder_failure_shows_placeholder_and_keeps_table_consistent() {
    let mut m = manager();
    m.show(region("A"), Vec2::ZERO, || Ok(series("A", 1.0)));
    let outcome = m.show(region("B"), Vec2::ZERO, || {
        Err(OverlayError::Build("malformed chart".into()))
    });

    assert_eq!(outcome, ShowOutcome::Failed);
    assert_eq!(m.active_key(), Some(&region("B")));
    assert_eq!(m.handle_count(), 0);
    assert!(m.target().visible);
    assert!(m.target().errors[0].contains("malformed chart"));

    // Recovers on the next valid series.
    let outcome = m.show(region("B"), Vec2::ZERO, || Ok(series("B", 1.0)));
    assert_eq!(outcome, ShowOutcome::Built);
    assert_eq!(m.handle_count(), 1);
}

#[test]
fn test_target_failure_drops_stale_handle() {
    let mut m = manager();
    m.show(region("A"), Vec2::ZERO, || Ok(series("A", 1.0)));
    m.target_mut().fail_next_create = true;
    let outcome = m.show(region("A"), Vec2::ZERO, || Ok(series("A", 2.0)));
    assert_eq!(outcome, ShowOutcome::Failed);
    assert_eq!(m.handle_count(), 0);
    assert_eq!(m.target().disposed.len(), 1);
}

#[test]
fn test_hide_keeps_handles_and_stops_tracking() {
    let mut m = manager();
    m.show(region("A"), Vec2::ZERO, || Ok(series("A", 1.0)));
    m.hide();
    assert!(!m.target().visible);
    assert!(!m.is_tracking());
    assert_eq!(m.handle_count(), 1);

    let parked = m.target().position;
    m.pointer_moved(Vec2::new(300.0, 300.0));
    assert_eq!(m.target().position, parked);

    let outcome = m.show(region("A"), Vec2::ZERO, || Ok(series("A", 1.0)));
    assert_eq!(outcome, ShowOutcome::Reused);
    assert!(m.target().visible);
}

#[test]
fn test_dispose_releases_everything() {
    let mut m = manager();
    m.show(region("A"), Vec2::ZERO, || Ok(series("A", 1.0)));
    m.dispose();
    assert_eq!(m.target().disposed.len(), 1);
    assert_eq!(m.handle_count(), 0);
    assert!(m.active_key().is_none());
    // A second dispose is a no-op.
    m.dispose();
    assert_eq!(m.target().disposed.len(), 1);
}

// -------------------------------------------------------------------------
// Positioning
// -------------------------------------------------------------------------

#[test]
fn test_position_offsets_by_padding() {
    let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
    let pos = overlay_position(Vec2::new(100.0, 100.0), Vec2::new(200.0, 100.0), viewport, 15.0);
    assert_eq!(pos, Vec2::new(115.0, 115.0));
}

#[test]
fn test_position_flips_on_overflow() {
    let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
    let pos = overlay_position(Vec2::new(700.0, 550.0), Vec2::new(200.0, 100.0), viewport, 15.0);
    assert_eq!(pos, Vec2::new(485.0, 435.0));
}

#[test]
fn test_position_clamps_inside_viewport() {
    let viewport = Rect::new(0.0, 0.0, 300.0, 200.0);
    let pos = overlay_position(Vec2::new(150.0, 100.0), Vec2::new(250.0, 150.0), viewport, 15.0);
    assert!(pos.x >= 0.0 && pos.x + 250.0 <= 300.0);
    assert!(pos.y >= 0.0 && pos.y + 150.0 <= 200.0);
}

// -------------------------------------------------------------------------
// Deferred rendering
// -------------------------------------------------------------------------

#[test]
fn test_pending_slot_overwrites() {
    let mut pending = PendingOverlayRender::default();
    pending.schedule(OverlayRequest::Show {
        key: region("A"),
        pointer: Vec2::ZERO,
    });
    pending.schedule(OverlayRequest::Show {
        key: region("B"),
        pointer: Vec2::ONE,
    });
    assert_eq!(pending.overwritten(), 1);
    assert_eq!(
        pending.take(),
        Some(OverlayRequest::Show {
            key: region("B"),
            pointer: Vec2::ONE
        })
    );
    assert!(pending.take().is_none());
}
