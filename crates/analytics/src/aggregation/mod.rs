//! Spatiotemporal aggregation engine.
//!
//! Each pass narrows the dataset to the active time window, groups the
//! remaining points into buckets (regions, grid cells or hexagons), reduces
//! every bucket to a color value and an elevation value, and feeds the fresh
//! extents through the domain-preservation rule. Results are published in
//! [`AggregationResults`] and as [`DomainUpdated`] events for the legend.

pub mod buckets;
pub mod domain;
pub mod kinds;
mod system;


pub use buckets::{
    bucket_points, cell_center, grid_cell, hex_cell, summarize, AggregationBucket,
    BucketSummary, CellKey, Grouping,
};
pub use domain::{update_domain, CycleSignature, Domain, DomainTracker};
pub use kinds::{
    aggregate, aggregate_with, collapse_repeated, filter_window, mode, reduce, AggregateSpec,
    AggregationKind, MissingValues, RepeatedPointsKind, TimeWindow,
};
pub use system::{
    aggregate_buckets, grouping_for, recompute_aggregates, AggregationResults, BucketRecord,
    DomainChannel, DomainTrackers, DomainUpdated,
};
