//! Seeded demo dataset used when no bundle is supplied.
//!
//! Nine square districts plus one concave and one two-part region over a
//! small patch of map, and two years of daily observations with a seasonal
//! signal, a few missing values and repeated timestamps.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use analytics::data::{DataPoint, Region};

const DAY_MS: i64 = 86_400_000;
/// 2022-01-01T00:00:00Z
const START_MS: i64 = 1_640_995_200_000;
const DAYS: i64 = 730;

const ORIGIN: (f64, f64) = (13.30, 52.45);
const DISTRICT_SIZE: f64 = 0.05;

const CATEGORIES: [&str; 3] = ["bike", "car", "foot"];

fn square(id: String, x0: f64, y0: f64, size: f64) -> Region {
    Region::polygon(
        id,
        vec![vec![
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
        ]],
    )
}

pub fn demo_regions() -> Vec<Region> {
    let (ox, oy) = ORIGIN;
    let mut regions = Vec::new();
    for row in 0..3 {
        for col in 0..3 {
            regions.push(square(
                format!("district-{}", row * 3 + col + 1),
                ox + col as f64 * DISTRICT_SIZE,
                oy + row as f64 * DISTRICT_SIZE,
                DISTRICT_SIZE,
            ));
        }
    }

    let east = ox + 3.0 * DISTRICT_SIZE;
    regions.push(Region::polygon(
        "harbour",
        vec![vec![
            (east, oy),
            (east + 0.08, oy),
            (east + 0.08, oy + 0.03),
            (east + 0.03, oy + 0.03),
            (east + 0.03, oy + 0.10),
            (east, oy + 0.10),
        ]],
    ));
    regions.push(Region::multi_polygon(
        "islands",
        vec![
            vec![vec![
                (east + 0.05, oy + 0.06),
                (east + 0.08, oy + 0.06),
                (east + 0.08, oy + 0.09),
                (east + 0.05, oy + 0.09),
            ]],
            vec![vec![
                (east + 0.05, oy + 0.11),
                (east + 0.07, oy + 0.11),
                (east + 0.07, oy + 0.14),
            ]],
        ],
    ));
    regions
}

pub fn demo_points(count: usize, seed: u64) -> Vec<DataPoint> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (ox, oy) = ORIGIN;
    (0..count)
        .map(|_| {
            let lng = ox + rng.gen_range(0.0..4.0 * DISTRICT_SIZE);
            let lat = oy + rng.gen_range(0.0..3.0 * DISTRICT_SIZE);
            let day = rng.gen_range(0..DAYS);
            // Half the observations land on the hour so timestamps repeat.
            let offset = if rng.gen_bool(0.5) {
                rng.gen_range(0..24) * 3_600_000
            } else {
                rng.gen_range(0..DAY_MS)
            };
            let season = (day as f64 / 365.0 * std::f64::consts::TAU).sin();
            let value = (!rng.gen_bool(0.02))
                .then(|| (50.0 + 30.0 * season + rng.gen_range(-10.0..10.0)).max(0.0));
            let category = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
            DataPoint::new(lng, lat, Some(START_MS + day * DAY_MS + offset), value)
                .with_category(category)
        })
        .collect()
}

pub fn demo_dataset(seed: u64) -> (Vec<DataPoint>, Vec<Region>) {
    (demo_points(2_000, seed), demo_regions())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_points() {
        assert_eq!(demo_points(50, 7), demo_points(50, 7));
        assert_ne!(demo_points(50, 7), demo_points(50, 8));
    }

    #[test]
    fn test_timestamps_within_two_years() {
        for p in demo_points(500, 1) {
            let ts = p.timestamp.expect("demo points are timed");
            assert!((START_MS..START_MS + DAYS * DAY_MS).contains(&ts));
        }
    }

    #[test]
    fn test_some_values_missing() {
        let points = demo_points(2_000, 3);
        assert!(points.iter().any(|p| p.value.is_none()));
        assert!(points.iter().filter(|p| p.value.is_some()).count() > 1_900);
    }

    #[test]
    fn test_region_ids_unique() {
        let regions = demo_regions();
        let mut ids: Vec<&str> = regions.iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), regions.len());
    }
}
