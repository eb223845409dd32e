//! Frame ordering for the analytics systems.
//!
//! ```text
//! Filter  →  Aggregate  →  Interaction
//! ```
//!
//! * **Filter** – seasonal index, time bounds, animation stepping.
//! * **Aggregate** – bucketing, aggregate values and domains.
//! * **Interaction** – pick handling and hover refresh; reads the current
//!   pass and schedules overlay work for the next frame.
//!
//! Front-end systems that change the dataset, settings or filter should run
//! before `Filter` so their changes are aggregated in the same frame.

use bevy::prelude::*;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnalyticsSet {
    Filter,
    Aggregate,
    Interaction,
}
