//! Time filter: active window, view mode, presets and animation.
//!
//! The [`TimeFilterState`] resource narrows the point set before bucketing.
//! Bounds come from the effective timestamps of the current view mode: raw
//! epoch milliseconds in historical mode, or timestamps projected onto the
//! 2020 reference year in seasonal mode. Bounds are rebuilt whenever the
//! dataset or the view mode changes, and the window is reset to span them.
//!
//! Windows narrower than the smallest gap between two distinct timestamps
//! are never applied: such presets are hidden and such custom windows are
//! rejected with a warning.

pub mod animation;
pub mod presets;
pub mod seasonal;
mod systems;
pub mod types;


pub use animation::{step_window, AnimationClock};
pub use presets::{available_presets, preset_window, DurationPreset};
pub use seasonal::{
    point_view, point_views, project_to_reference_year, SeasonalIndex, SeasonalStamp,
    REFERENCE_YEAR,
};
pub use systems::{advance_animation, rebuild_seasonal_index, refresh_time_bounds};
pub use types::{min_positive_gap, TimeFilter, TimeFilterError, TimeFilterState, ViewMode};
