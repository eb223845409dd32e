//! Color/elevation domains and the preserve-domains rule.
//!
//! With preservation off a domain always tracks the fresh extent. With it on,
//! the first pass of each cycle unions the stored domain with the fresh
//! extent and later passes in the same cycle leave it alone. A cycle ends
//! whenever the dataset, filter bounds, aggregation kind, or grouping key
//! changes. Categorical domains ignore preservation entirely.

use serde::{Deserialize, Serialize};

use super::kinds::{AggregationKind, RepeatedPointsKind, TimeWindow};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Domain {
    Numeric { min: f64, max: f64 },
    /// Levels `0..level_count`, scaled as `{0, level_count - 1}`.
    Categorical { level_count: usize },
}

impl Domain {
    /// Extent of a value list. `None` for an empty or all-non-finite list.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Domain> {
        let mut extent: Option<(f64, f64)> = None;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            extent = Some(match extent {
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
                None => (v, v),
            });
        }
        extent.map(|(min, max)| Domain::Numeric { min, max })
    }

    pub fn bounds(&self) -> (f64, f64) {
        match *self {
            Domain::Numeric { min, max } => (min, max),
            Domain::Categorical { level_count } => (0.0, level_count.saturating_sub(1) as f64),
        }
    }

    /// Position of `value` inside the domain, clamped to `[0, 1]`.
    pub fn normalize(&self, value: f64) -> f32 {
        let (min, max) = self.bounds();
        if max <= min {
            return 0.0;
        }
        ((value - min) / (max - min)).clamp(0.0, 1.0) as f32
    }

    fn union(self, other: Domain) -> Domain {
        let (a_min, a_max) = self.bounds();
        let (b_min, b_max) = other.bounds();
        Domain::Numeric {
            min: a_min.min(b_min),
            max: a_max.max(b_max),
        }
    }
}

/// Apply the preserve-domains rule to one fresh extent.
///
/// An empty fresh extent yields an unset domain.
pub fn update_domain(
    stored: Option<Domain>,
    fresh: Option<Domain>,
    preserve: bool,
    already_initialized: bool,
) -> Option<Domain> {
    let fresh = fresh?;
    if matches!(fresh, Domain::Categorical { .. }) || !preserve {
        return Some(fresh);
    }
    // A categorical domain never carries over into a numeric one.
    let prior = stored.filter(|d| matches!(d, Domain::Numeric { .. }));
    if already_initialized {
        return prior.or(Some(fresh));
    }
    Some(match prior {
        Some(prior) => prior.union(fresh),
        None => fresh,
    })
}

/// Everything whose change starts a new preservation cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSignature {
    pub dataset_version: u64,
    pub window: TimeWindow,
    pub kind: AggregationKind,
    pub repeated: Option<RepeatedPointsKind>,
    /// Category coloring instead of aggregated values.
    pub categorical: bool,
    pub grouping_key: String,
}

/// Stored domain for one encoding channel plus its cycle bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct DomainTracker {
    stored: Option<Domain>,
    initialized: bool,
    signature: Option<CycleSignature>,
}

impl DomainTracker {
    /// Start a pass. A changed signature resets the cycle.
    pub fn begin_pass(&mut self, signature: CycleSignature) {
        if self.signature.as_ref() != Some(&signature) {
            self.initialized = false;
            self.signature = Some(signature);
        }
    }

    pub fn update(&mut self, fresh: Option<Domain>, preserve: bool) -> Option<Domain> {
        let result = update_domain(self.stored, fresh, preserve, self.initialized);
        if let Some(domain) = result {
            self.stored = Some(domain);
            self.initialized = preserve;
        }
        result
    }

    pub fn stored(&self) -> Option<Domain> {
        self.stored
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}
