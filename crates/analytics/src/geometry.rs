//! Point-in-region classification by ray casting.
//!
//! Rings are never treated as holes: a MultiPolygon contains a point when any
//! ring of any polygon does, and a Polygon is tested against its outer ring
//! only. Malformed geometry classifies everything as outside.

use crate::data::{Region, Ring};

/// Classic even-odd ray cast against a single ring.
///
/// An edge `(i-1, i)` counts as a crossing when exactly one endpoint lies
/// strictly above the point and the edge's x-intercept at the point's y lies
/// to the right of the point.
pub fn point_in_ring(lng: f64, lat: f64, ring: &Ring) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut prev = ring[ring.len() - 1];
    for &(xi, yi) in ring {
        let (xj, yj) = prev;
        if (yi > lat) != (yj > lat) {
            let x_cross = (xj - xi) * (lat - yi) / (yj - yi) + xi;
            if lng < x_cross {
                inside = !inside;
            }
        }
        prev = (xi, yi);
    }
    inside
}

pub fn is_point_in_region(lng: f64, lat: f64, region: &Region) -> bool {
    let Some((min_x, min_y, max_x, max_y)) = region.bounds() else {
        return false;
    };
    if lng < min_x || lng > max_x || lat < min_y || lat > max_y {
        return false;
    }
    region
        .membership_rings()
        .into_iter()
        .any(|ring| point_in_ring(lng, lat, ring))
}

/// First region, in host order, that contains the point.
pub fn region_for_point(lng: f64, lat: f64, regions: &[Region]) -> Option<&Region> {
    regions.iter().find(|r| is_point_in_region(lng, lat, r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RegionGeometry;

    fn triangle() -> Region {
        Region::polygon("tri", vec![vec![(0.0, 0.0), (2.0, 0.0), (1.0, 2.0)]])
    }

    fn square(x0: f64, y0: f64, size: f64) -> Ring {
        vec![
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
        ]
    }

    #[test]
    fn test_triangle_interior_point() {
        assert!(is_point_in_region(1.0, 1.0, &triangle()));
    }

    #[test]
    fn test_point_far_outside_bbox() {
        assert!(!is_point_in_region(5.0, 5.0, &triangle()));
    }

    #[test]
    fn test_point_inside_bbox_but_outside_triangle() {
        assert!(!is_point_in_region(0.1, 1.9, &triangle()));
    }

    #[test]
    fn test_polygon_ignores_inner_rings() {
        // Inner ring is a hole in GeoJSON terms but membership only reads ring 0.
        let region = Region::polygon(
            "donut",
            vec![square(0.0, 0.0, 10.0), square(4.0, 4.0, 2.0)],
        );
        assert!(is_point_in_region(5.0, 5.0, &region));
    }

    #[test]
    fn test_polygon_only_outer_ring_counts() {
        // A second ring outside the first is not part of a Polygon's membership.
        let region = Region::polygon(
            "p",
            vec![square(0.0, 0.0, 1.0), square(5.0, 5.0, 1.0)],
        );
        assert!(!is_point_in_region(5.5, 5.5, &region));
    }

    #[test]
    fn test_multi_polygon_inner_ring_is_additive() {
        let region = Region::multi_polygon(
            "mp",
            vec![
                vec![square(0.0, 0.0, 10.0), square(4.0, 4.0, 2.0)],
                vec![square(20.0, 20.0, 1.0)],
            ],
        );
        // Inside the "hole": the outer ring still contains it, and the inner
        // ring contains it too. Either ring is enough.
        assert!(is_point_in_region(5.0, 5.0, &region));
        assert!(is_point_in_region(20.5, 20.5, &region));
        assert!(!is_point_in_region(15.0, 15.0, &region));
    }

    #[test]
    fn test_degenerate_ring_is_outside() {
        let region = Region::polygon("line", vec![vec![(0.0, 0.0), (1.0, 1.0)]]);
        assert!(!is_point_in_region(0.5, 0.5, &region));
        let empty = Region::polygon("empty", vec![]);
        assert!(!is_point_in_region(0.0, 0.0, &empty));
    }

    #[test]
    fn test_missing_geometry_is_outside() {
        let region = Region {
            id: "broken".into(),
            geometry: RegionGeometry::Missing,
        };
        assert!(!is_point_in_region(0.0, 0.0, &region));
    }

    #[test]
    fn test_region_for_point_returns_first_match() {
        let regions = vec![
            Region::polygon("west", vec![square(0.0, 0.0, 5.0)]),
            Region::polygon("overlap", vec![square(3.0, 0.0, 5.0)]),
        ];
        assert_eq!(region_for_point(4.0, 1.0, &regions).map(|r| r.id.as_str()), Some("west"));
        assert_eq!(region_for_point(7.0, 1.0, &regions).map(|r| r.id.as_str()), Some("overlap"));
        assert!(region_for_point(-1.0, 1.0, &regions).is_none());
    }
}
