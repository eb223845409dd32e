use std::fmt;

use bevy::prelude::*;

use crate::aggregation::CellKey;

/// Opaque handle to a chart built by an [`OverlayTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartHandle(pub u64);

/// Everything a chart needs. Compared deeply to skip redundant rebuilds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    pub title: String,
    /// Raw `(timestamp, value)` pairs.
    pub points: Vec<(f64, f64)>,
    /// Smoothed trend samples.
    pub trend: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayError {
    /// No bucket exists for the requested key.
    UnknownKey(CellKey),
    /// The chart description could not be built.
    Build(String),
    /// The render target refused the chart.
    Target(String),
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayError::UnknownKey(key) => write!(f, "No data for {key}"),
            OverlayError::Build(msg) => write!(f, "Chart build failed: {msg}"),
            OverlayError::Target(msg) => write!(f, "Overlay target error: {msg}"),
        }
    }
}

impl std::error::Error for OverlayError {}

/// The surface the shared overlay is drawn on.
///
/// Implementations own the actual chart objects; the manager only keeps
/// their handles.
pub trait OverlayTarget: Send + Sync + 'static {
    fn create_chart(
        &mut self,
        key: &CellKey,
        series: &ChartSeries,
    ) -> Result<ChartHandle, OverlayError>;

    fn dispose_chart(&mut self, handle: ChartHandle);

    fn set_visible(&mut self, visible: bool);

    /// Top-left corner of the overlay in screen pixels.
    fn set_position(&mut self, position: Vec2);

    /// Replace the overlay content with an error placeholder.
    fn show_error(&mut self, message: &str);

    fn viewport(&self) -> Rect;

    fn overlay_size(&self) -> Vec2;
}
