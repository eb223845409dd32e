//! Windowed scalar aggregation.
//!
//! [`aggregate`] filters to the time window, optionally collapses points that
//! share an exact timestamp, then reduces the remaining values with the outer
//! aggregation kind. Every empty path resolves to the caller's default value.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::TimedValue;

/// Inclusive time window in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub const UNBOUNDED: TimeWindow = TimeWindow {
        start: i64::MIN,
        end: i64::MAX,
    };

    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, ts: i64) -> bool {
        self.start <= ts && ts <= self.end
    }

    pub fn width(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }
}

/// Outer reduction applied to the (possibly collapsed) values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AggregationKind {
    #[default]
    Sum,
    Mean,
    Count,
    Min,
    Max,
    Mode,
}

impl AggregationKind {
    pub const ALL: [AggregationKind; 6] = [
        AggregationKind::Sum,
        AggregationKind::Mean,
        AggregationKind::Count,
        AggregationKind::Min,
        AggregationKind::Max,
        AggregationKind::Mode,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Sum => "Sum",
            Self::Mean => "Mean",
            Self::Count => "Count",
            Self::Min => "Min",
            Self::Max => "Max",
            Self::Mode => "Mode",
        }
    }
}

/// How points sharing one timestamp collapse to a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepeatedPointsKind {
    Sum,
    Mean,
    Min,
    Max,
    Mode,
    Count,
    /// Keep the first point seen at that timestamp.
    First,
}

impl RepeatedPointsKind {
    pub const ALL: [RepeatedPointsKind; 7] = [
        RepeatedPointsKind::Sum,
        RepeatedPointsKind::Mean,
        RepeatedPointsKind::Min,
        RepeatedPointsKind::Max,
        RepeatedPointsKind::Mode,
        RepeatedPointsKind::Count,
        RepeatedPointsKind::First,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Sum => "Sum",
            Self::Mean => "Mean",
            Self::Min => "Min",
            Self::Max => "Max",
            Self::Mode => "Mode",
            Self::Count => "Count",
            Self::First => "First",
        }
    }
}

/// Treatment of non-numeric point values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissingValues {
    /// Count as 0 (summation-style aggregates).
    #[default]
    AsZero,
    /// Drop from numerators and denominators.
    Skip,
}

impl MissingValues {
    fn resolve(self, value: Option<f64>) -> Option<f64> {
        match (value, self) {
            (Some(v), _) => Some(v),
            (None, MissingValues::AsZero) => Some(0.0),
            (None, MissingValues::Skip) => None,
        }
    }
}

/// Full per-call aggregation request. The default value is deliberately
/// part of the request: different call sites want different defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateSpec {
    pub kind: AggregationKind,
    pub repeated: Option<RepeatedPointsKind>,
    pub default_value: f64,
    #[serde(default)]
    pub missing: MissingValues,
}

impl AggregateSpec {
    pub fn new(kind: AggregationKind, default_value: f64) -> Self {
        Self {
            kind,
            repeated: None,
            default_value,
            missing: MissingValues::AsZero,
        }
    }
}

/// Aggregate with non-numeric values counted as zero.
pub fn aggregate<P: TimedValue>(
    points: &[P],
    window: TimeWindow,
    kind: AggregationKind,
    repeated: Option<RepeatedPointsKind>,
    default_value: f64,
) -> f64 {
    aggregate_with(
        points,
        window,
        &AggregateSpec {
            kind,
            repeated,
            default_value,
            missing: MissingValues::AsZero,
        },
    )
}

pub fn aggregate_with<P: TimedValue>(points: &[P], window: TimeWindow, spec: &AggregateSpec) -> f64 {
    let active = filter_window(points, window);
    if active.is_empty() {
        return spec.default_value;
    }

    let values: Vec<f64> = match spec.repeated {
        Some(repeated) => collapse_repeated(&active, repeated, spec.missing),
        None => active
            .iter()
            .filter_map(|p| spec.missing.resolve(p.value()))
            .collect(),
    };

    reduce(&values, spec.kind).unwrap_or(spec.default_value)
}

/// Keep points inside the window. Only applies when the set carries
/// timestamps; then untimed points are dropped as well.
pub fn filter_window<P: TimedValue>(points: &[P], window: TimeWindow) -> Vec<&P> {
    let timed = points.iter().any(|p| p.timestamp().is_some());
    if !timed {
        return points.iter().collect();
    }
    points
        .iter()
        .filter(|p| p.timestamp().is_some_and(|ts| window.contains(ts)))
        .collect()
}

/// Collapse each exact-timestamp group to one value. Groups keep the order in
/// which their timestamp was first seen.
pub fn collapse_repeated<P: TimedValue>(
    points: &[&P],
    kind: RepeatedPointsKind,
    missing: MissingValues,
) -> Vec<f64> {
    let mut order: Vec<Option<i64>> = Vec::new();
    let mut groups: HashMap<Option<i64>, Vec<Option<f64>>> = HashMap::new();
    for p in points {
        let ts = p.timestamp();
        groups
            .entry(ts)
            .or_insert_with(|| {
                order.push(ts);
                Vec::new()
            })
            .push(p.value());
    }

    order
        .iter()
        .filter_map(|ts| {
            let raw = groups.get(ts)?;
            if kind == RepeatedPointsKind::Count {
                return Some(raw.len() as f64);
            }
            let values: Vec<f64> = raw.iter().filter_map(|v| missing.resolve(*v)).collect();
            match kind {
                RepeatedPointsKind::Sum => reduce(&values, AggregationKind::Sum),
                RepeatedPointsKind::Mean => reduce(&values, AggregationKind::Mean),
                RepeatedPointsKind::Min => reduce(&values, AggregationKind::Min),
                RepeatedPointsKind::Max => reduce(&values, AggregationKind::Max),
                RepeatedPointsKind::Mode => reduce(&values, AggregationKind::Mode),
                RepeatedPointsKind::First => values.first().copied(),
                RepeatedPointsKind::Count => None,
            }
        })
        .collect()
}

/// Reduce a value list. `None` when there is nothing to reduce.
pub fn reduce(values: &[f64], kind: AggregationKind) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    match kind {
        AggregationKind::Sum => Some(values.iter().sum()),
        AggregationKind::Mean => Some(values.iter().sum::<f64>() / values.len() as f64),
        AggregationKind::Count => Some(values.len() as f64),
        AggregationKind::Min => values.iter().copied().reduce(f64::min),
        AggregationKind::Max => values.iter().copied().reduce(f64::max),
        AggregationKind::Mode => mode(values),
    }
}

/// Most frequent value. On ties the value that reached the winning count
/// first wins. Values are compared by exact bit pattern, so `0.0` and `-0.0`
/// are distinct and no tolerance is applied.
pub fn mode(values: &[f64]) -> Option<f64> {
    let mut counts: HashMap<u64, usize> = HashMap::new();
    let mut best: Option<(f64, usize)> = None;
    for &v in values {
        let count = counts.entry(v.to_bits()).or_insert(0);
        *count += 1;
        if best.map_or(true, |(_, n)| *count > n) {
            best = Some((v, *count));
        }
    }
    best.map(|(v, _)| v)
}
