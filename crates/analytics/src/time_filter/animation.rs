use std::time::Duration;

use bevy::prelude::*;

use crate::aggregation::TimeWindow;

/// Share of the domain above which stepping restarts instead of sliding.
const RESTART_FRACTION: f64 = 0.8;
/// Width of the restarted window as a share of the domain.
const RESTART_WIDTH_FRACTION: f64 = 0.2;

/// Next animation window.
///
/// A window wider than 80% of the domain restarts at the domain minimum with
/// 20% of the range. Otherwise both edges advance by `step`; overrunning the
/// maximum wraps to the minimum keeping the width.
pub fn step_window(window: TimeWindow, bounds: TimeWindow, step: i64) -> TimeWindow {
    let range = bounds.width();
    if range <= 0 {
        return bounds;
    }
    if window.width() as f64 > range as f64 * RESTART_FRACTION {
        let width = (range as f64 * RESTART_WIDTH_FRACTION).round() as i64;
        return TimeWindow::new(bounds.start, bounds.start.saturating_add(width));
    }
    let next = TimeWindow::new(
        window.start.saturating_add(step),
        window.end.saturating_add(step),
    );
    if next.end > bounds.end {
        return TimeWindow::new(bounds.start, bounds.start.saturating_add(window.width()));
    }
    next
}

/// Play state of the time animation.
#[derive(Resource, Debug)]
pub struct AnimationClock {
    pub playing: bool,
    pub timer: Timer,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self {
            playing: false,
            timer: Timer::from_seconds(0.25, TimerMode::Repeating),
        }
    }
}

impl AnimationClock {
    pub fn toggle(&mut self) {
        self.playing = !self.playing;
        self.timer.reset();
    }

    pub fn set_interval(&mut self, secs: f32) {
        let secs = secs.max(0.01);
        if self.timer.duration().as_secs_f32() != secs {
            self.timer.set_duration(Duration::from_secs_f32(secs));
        }
    }
}
