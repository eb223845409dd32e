//! Tri-cube kernel smoothing for ad-hoc time series.
//!
//! [`smooth`] evaluates a locally weighted mean at evenly spaced sample
//! positions across the series. A sample whose neighbourhood carries no
//! weight is skipped rather than emitted as zero, so sparse series yield
//! fewer samples.

use crate::aggregation::{collapse_repeated, MissingValues, RepeatedPointsKind};
use crate::data::PointView;

/// Maximum number of samples in a trend line.
pub const TREND_SAMPLES: usize = 100;

/// Kernel half-width as a fraction of the series' x range.
pub const TREND_BANDWIDTH: f64 = 0.3;

/// Minimum series length worth smoothing.
const MIN_POINTS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendLine {
    pub samples: Vec<(f64, f64)>,
}

impl TrendLine {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

fn tricube(d: f64) -> f64 {
    if d > TREND_BANDWIDTH {
        return 0.0;
    }
    let u = d / TREND_BANDWIDTH;
    (1.0 - u * u * u).powi(3)
}

/// Smooth a series ordered by x.
pub fn smooth(series: &[(f64, f64)]) -> TrendLine {
    if series.len() < MIN_POINTS {
        return TrendLine::default();
    }
    let x0 = series[0].0;
    let x1 = series[series.len() - 1].0;
    let range = x1 - x0;
    if range <= 0.0 || !range.is_finite() {
        return TrendLine::default();
    }

    let step = range / (TREND_SAMPLES - 1) as f64;
    let samples = (0..TREND_SAMPLES)
        .filter_map(|i| {
            let x = x0 + step * i as f64;
            let (weighted, total) = series.iter().fold((0.0, 0.0), |(acc, w_sum), &(xj, yj)| {
                let w = tricube((x - xj).abs() / range);
                (acc + w * yj, w_sum + w)
            });
            (total > 0.0).then(|| (x, weighted / total))
        })
        .collect();
    TrendLine { samples }
}

/// Raw `(timestamp, value)` series of a bucket, sorted by timestamp.
///
/// Untimed and non-numeric members are left out. With `repeated` set, members
/// sharing a timestamp collapse to one value.
pub fn series_for_bucket(
    members: &[PointView<'_>],
    repeated: Option<RepeatedPointsKind>,
) -> Vec<(f64, f64)> {
    let mut timed: Vec<&PointView<'_>> = members.iter().filter(|p| p.timestamp.is_some()).collect();
    timed.sort_by_key(|p| p.timestamp);

    let Some(kind) = repeated else {
        return timed
            .iter()
            .filter_map(|p| Some((p.timestamp? as f64, p.point.value?)))
            .collect();
    };

    timed
        .chunk_by(|a, b| a.timestamp == b.timestamp)
        .filter_map(|group| {
            let ts = group.first()?.timestamp?;
            let value = collapse_repeated(group, kind, MissingValues::Skip)
                .first()
                .copied()?;
            Some((ts as f64, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataPoint;

    #[test]
    fn test_fewer_than_three_points_is_empty() {
        assert!(smooth(&[]).is_empty());
        assert!(smooth(&[(0.0, 1.0), (1.0, 2.0)]).is_empty());
    }

    #[test]
    fn test_zero_range_is_empty() {
        assert!(smooth(&[(5.0, 1.0), (5.0, 2.0), (5.0, 3.0)]).is_empty());
    }

    #[test]
    fn test_samples_span_series_and_are_bounded() {
        let series: Vec<(f64, f64)> = (0..20).map(|i| (i as f64, (i % 3) as f64)).collect();
        let line = smooth(&series);
        assert_eq!(line.samples.len(), TREND_SAMPLES);
        assert_eq!(line.samples[0].0, 0.0);
        assert!((line.samples[TREND_SAMPLES - 1].0 - 19.0).abs() < 1e-9);
        assert!(line.samples.iter().all(|&(_, y)| (0.0..=2.0).contains(&y)));
    }

    #[test]
    fn test_constant_series_stays_constant() {
        let series = [(0.0, 4.0), (1.0, 4.0), (2.0, 4.0), (3.0, 4.0)];
        let line = smooth(&series);
        assert!(line.samples.iter().all(|&(_, y)| (y - 4.0).abs() < 1e-12));
    }

    #[test]
    fn test_zero_weight_samples_are_skipped() {
        // Two clusters far apart: samples in the gap see no input within
        // the bandwidth and are dropped.
        let series = [(0.0, 1.0), (0.01, 1.0), (99.99, 2.0), (100.0, 2.0)];
        let line = smooth(&series);
        assert!(!line.is_empty());
        assert!(line.samples.len() < TREND_SAMPLES);
        assert!(line.samples.iter().all(|&(x, _)| x <= 30.0 || x >= 70.0));
    }

    #[test]
    fn test_series_for_bucket_sorts_and_collapses() {
        let points = vec![
            DataPoint::new(0.0, 0.0, Some(300), Some(9.0)),
            DataPoint::new(0.0, 0.0, Some(100), Some(1.0)),
            DataPoint::new(0.0, 0.0, Some(100), Some(3.0)),
            DataPoint::new(0.0, 0.0, None, Some(50.0)),
            DataPoint::new(0.0, 0.0, Some(200), None),
        ];
        let members: Vec<PointView<'_>> = points
            .iter()
            .enumerate()
            .map(|(index, point)| PointView {
                index,
                point,
                timestamp: point.timestamp,
            })
            .collect();

        let raw = series_for_bucket(&members, None);
        assert_eq!(raw, vec![(100.0, 1.0), (100.0, 3.0), (300.0, 9.0)]);

        let collapsed = series_for_bucket(&members, Some(RepeatedPointsKind::Mean));
        assert_eq!(collapsed, vec![(100.0, 2.0), (300.0, 9.0)]);
    }
}
