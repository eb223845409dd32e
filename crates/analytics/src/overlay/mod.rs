//! The single shared chart overlay.
//!
//! [`OverlayManager`] owns the overlay state and talks to an injectable
//! [`OverlayTarget`]. Pointer events never render directly: they schedule an
//! [`OverlayRequest`] in [`PendingOverlayRender`], and `fire_pending_overlay`
//! executes the latest request at the start of the next frame.

mod manager;
mod pending;
mod systems;
mod target;

#[cfg(test)]
mod tests;

pub use manager::{overlay_position, OverlayManager, ShowOutcome, DEFAULT_OVERLAY_PADDING};
pub use pending::{OverlayRequest, PendingOverlayRender};
pub use systems::{build_chart_series, dispose_overlay_on_exit, fire_pending_overlay, OverlayPlugin};
pub use target::{ChartHandle, ChartSeries, OverlayError, OverlayTarget};
