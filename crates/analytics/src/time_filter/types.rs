use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aggregation::TimeWindow;

use super::animation::step_window;
use super::presets::{self, preset_window, DurationPreset};

/// Which timestamps the filter operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    Historical,
    /// Every timestamp projected onto the reference year.
    Seasonal,
}

impl ViewMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Historical => "Historical",
            Self::Seasonal => "Seasonal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFilter {
    pub start: i64,
    pub end: i64,
    pub view_mode: ViewMode,
}

impl Default for TimeFilter {
    fn default() -> Self {
        Self {
            start: TimeWindow::UNBOUNDED.start,
            end: TimeWindow::UNBOUNDED.end,
            view_mode: ViewMode::Historical,
        }
    }
}

impl TimeFilter {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimeFilterError {
    /// The dataset has no timestamps to filter on.
    NoTimestamps,
    /// `end` lies before `start`.
    InvalidRange { start: i64, end: i64 },
    /// The window is narrower than the smallest gap between observations.
    WindowTooNarrow { requested: i64, min_gap: i64 },
}

impl fmt::Display for TimeFilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeFilterError::NoTimestamps => write!(f, "Dataset has no timestamps"),
            TimeFilterError::InvalidRange { start, end } => {
                write!(f, "Window end {end} is before start {start}")
            }
            TimeFilterError::WindowTooNarrow { requested, min_gap } => write!(
                f,
                "Window of {requested} ms is narrower than the minimum gap of {min_gap} ms"
            ),
        }
    }
}

impl std::error::Error for TimeFilterError {}

/// Smallest strictly-positive difference between consecutive sorted
/// timestamps. `None` with fewer than two distinct timestamps.
pub fn min_positive_gap(timestamps: impl IntoIterator<Item = i64>) -> Option<i64> {
    let mut sorted: Vec<i64> = timestamps.into_iter().collect();
    sorted.sort_unstable();
    sorted
        .windows(2)
        .map(|w| w[1].saturating_sub(w[0]))
        .filter(|gap| *gap > 0)
        .min()
}

/// Current filter plus the bounds it is constrained to.
#[derive(Resource, Debug, Clone, Default)]
pub struct TimeFilterState {
    filter: TimeFilter,
    bounds: Option<TimeWindow>,
    min_gap: Option<i64>,
    active_preset: Option<DurationPreset>,
    bounds_stale: bool,
}

impl TimeFilterState {
    pub fn filter(&self) -> TimeFilter {
        self.filter
    }

    /// Active window, or [`TimeWindow::UNBOUNDED`] for an untimed dataset.
    pub fn window(&self) -> TimeWindow {
        match self.bounds {
            Some(_) => self.filter.window(),
            None => TimeWindow::UNBOUNDED,
        }
    }

    pub fn bounds(&self) -> Option<TimeWindow> {
        self.bounds
    }

    pub fn min_gap(&self) -> Option<i64> {
        self.min_gap
    }

    pub fn view_mode(&self) -> ViewMode {
        self.filter.view_mode
    }

    pub fn active_preset(&self) -> Option<DurationPreset> {
        self.active_preset
    }

    pub fn bounds_stale(&self) -> bool {
        self.bounds_stale
    }

    /// Recompute bounds and minimum gap from the effective timestamps and
    /// reset the window to span the full bounds.
    pub fn rebuild_bounds(&mut self, timestamps: &[i64]) {
        let min = timestamps.iter().copied().min();
        let max = timestamps.iter().copied().max();
        self.bounds = min.zip(max).map(|(lo, hi)| TimeWindow::new(lo, hi));
        self.min_gap = min_positive_gap(timestamps.iter().copied());
        let full = self.bounds.unwrap_or(TimeWindow::UNBOUNDED);
        self.filter.start = full.start;
        self.filter.end = full.end;
        self.active_preset = self.bounds.map(|_| DurationPreset::All);
        self.bounds_stale = false;
    }

    /// Switch view mode. Bounds are rebuilt by `refresh_time_bounds`.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.filter.view_mode != mode {
            info!("Time filter view mode: {}", mode.label());
            self.filter.view_mode = mode;
            self.bounds_stale = true;
        }
    }

    pub fn available_presets(&self) -> Vec<DurationPreset> {
        presets::available_presets(self.min_gap)
    }

    pub fn select_preset(&mut self, preset: DurationPreset) -> Result<TimeWindow, TimeFilterError> {
        let bounds = self.bounds.ok_or(TimeFilterError::NoTimestamps)?;
        if !self.available_presets().contains(&preset) {
            let err = TimeFilterError::WindowTooNarrow {
                requested: preset.width().unwrap_or(0),
                min_gap: self.min_gap.unwrap_or(0),
            };
            warn!("Preset {} rejected: {}", preset.label(), err);
            return Err(err);
        }
        let window = preset_window(preset, self.filter.start, bounds);
        self.filter.start = window.start;
        self.filter.end = window.end;
        self.active_preset = Some(preset);
        Ok(window)
    }

    /// Apply a user-chosen window. On rejection the filter is unchanged.
    pub fn set_custom_window(&mut self, start: i64, end: i64) -> Result<(), TimeFilterError> {
        if self.bounds.is_none() {
            return Err(TimeFilterError::NoTimestamps);
        }
        if end < start {
            let err = TimeFilterError::InvalidRange { start, end };
            warn!("Custom window rejected: {}", err);
            return Err(err);
        }
        let requested = end.saturating_sub(start);
        if let Some(min_gap) = self.min_gap {
            if requested < min_gap {
                let err = TimeFilterError::WindowTooNarrow { requested, min_gap };
                warn!("Custom window rejected: {}", err);
                return Err(err);
            }
        }
        self.filter.start = start;
        self.filter.end = end;
        self.active_preset = None;
        Ok(())
    }

    /// Advance the window one animation tick. No-op without bounds.
    pub fn step_animation(&mut self, step: i64) -> Option<TimeWindow> {
        let bounds = self.bounds?;
        let next = step_window(self.filter.window(), bounds, step);
        self.filter.start = next.start;
        self.filter.end = next.end;
        Some(next)
    }
}
