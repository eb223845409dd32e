use serde::{Deserialize, Serialize};

use crate::aggregation::TimeWindow;

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Named fixed-width windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationPreset {
    All,
    Minute,
    Hour,
    Day,
    Week,
    /// 30 days.
    Month,
    /// 365 days.
    Year,
}

impl DurationPreset {
    pub const ALL: [DurationPreset; 7] = [
        DurationPreset::All,
        DurationPreset::Minute,
        DurationPreset::Hour,
        DurationPreset::Day,
        DurationPreset::Week,
        DurationPreset::Month,
        DurationPreset::Year,
    ];

    /// Width in milliseconds; `None` for [`DurationPreset::All`].
    pub fn width(self) -> Option<i64> {
        match self {
            Self::All => None,
            Self::Minute => Some(MINUTE_MS),
            Self::Hour => Some(HOUR_MS),
            Self::Day => Some(DAY_MS),
            Self::Week => Some(7 * DAY_MS),
            Self::Month => Some(30 * DAY_MS),
            Self::Year => Some(365 * DAY_MS),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Minute => "Minute",
            Self::Hour => "Hour",
            Self::Day => "Day",
            Self::Week => "Week",
            Self::Month => "Month",
            Self::Year => "Year",
        }
    }
}

/// Presets at least as wide as `min_gap`. `All` is always offered.
pub fn available_presets(min_gap: Option<i64>) -> Vec<DurationPreset> {
    DurationPreset::ALL
        .into_iter()
        .filter(|preset| match (preset.width(), min_gap) {
            (Some(width), Some(gap)) => width >= gap,
            _ => true,
        })
        .collect()
}

/// Window for `preset` anchored at `start`.
///
/// A window that would overrun the domain maximum slides back so it keeps the
/// preset's width; a preset wider than the whole domain spans the bounds.
pub fn preset_window(preset: DurationPreset, start: i64, bounds: TimeWindow) -> TimeWindow {
    match preset.width() {
        Some(width) if width < bounds.width() => {
            let start = start.clamp(bounds.start, bounds.end.saturating_sub(width));
            TimeWindow::new(start, start.saturating_add(width))
        }
        _ => bounds,
    }
}
