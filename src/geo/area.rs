//! Geodesic polygon area.
//!
//! Spherical-excess (Chamberlain-Duquette) area over a closed ring on a
//! sphere with the WGS84 equatorial radius, the same formulation web map
//! drawing tools report.

use super::coords::{ring_to_polygon, LatLng};
use super::normalize::{distinct_count, MIN_DISTINCT_VERTICES};
use geo::{Area, BoundingRect, ChamberlainDuquetteArea};

/// Planar area, relative to the squared extent, under which a ring is
/// treated as collinear.
const COLLINEAR_EPSILON: f64 = 1e-12;

/// Area of the ring in square meters, rounded to the nearest whole meter.
///
/// The ring may be open or closed. Degenerate rings (fewer than three
/// distinct vertices, or all vertices on one line) yield 0.
pub fn geodesic_area(ring: &[LatLng]) -> u64 {
    if is_degenerate(ring) {
        return 0;
    }
    ring_to_polygon(ring)
        .chamberlain_duquette_unsigned_area()
        .round() as u64
}

/// True when the ring cannot enclose any area.
pub fn is_degenerate(ring: &[LatLng]) -> bool {
    if distinct_count(ring) < MIN_DISTINCT_VERTICES {
        return true;
    }

    let polygon = ring_to_polygon(ring);
    let Some(bounds) = polygon.bounding_rect() else {
        return true;
    };
    let extent = bounds.width().max(bounds.height());
    polygon.unsigned_area() <= COLLINEAR_EPSILON * extent * extent
}

#[cfg(test)]
mod tests {
    use super::*;

    const METERS_PER_DEG_LAT: f64 = 111_320.0;

    fn square(lat: f64, lng: f64, side_m: f64) -> Vec<LatLng> {
        let dlat = side_m / METERS_PER_DEG_LAT;
        let dlng = side_m / (METERS_PER_DEG_LAT * lat.to_radians().cos());
        vec![
            LatLng::new(lat, lng),
            LatLng::new(lat, lng + dlng),
            LatLng::new(lat + dlat, lng + dlng),
            LatLng::new(lat + dlat, lng),
            LatLng::new(lat, lng),
        ]
    }

    #[test]
    fn test_small_square_matches_planar() {
        for &lat in &[0.0, 46.5, 60.0] {
            let ring = square(lat, 11.3, 100.0);
            let area = geodesic_area(&ring) as f64;
            let planar = 100.0 * 100.0;
            assert!(
                (area - planar).abs() / planar < 0.01,
                "lat {}: {} vs {}",
                lat,
                area,
                planar
            );
        }
    }

    #[test]
    fn test_open_and_closed_agree() {
        let closed = square(46.5, 11.3, 250.0);
        let open = &closed[..closed.len() - 1];
        assert_eq!(geodesic_area(&closed), geodesic_area(open));
    }

    #[test]
    fn test_winding_does_not_matter() {
        let ring = square(46.5, 11.3, 50.0);
        let mut reversed = ring.clone();
        reversed.reverse();
        assert_eq!(geodesic_area(&ring), geodesic_area(&reversed));
    }

    #[test]
    fn test_concave_ring() {
        // L shape: a 200 m square with its upper right quarter removed
        let d = 100.0 / METERS_PER_DEG_LAT;
        let e = 100.0 / (METERS_PER_DEG_LAT * 46.5_f64.to_radians().cos());
        let (lat, lng) = (46.5, 11.3);
        let ring = vec![
            LatLng::new(lat, lng),
            LatLng::new(lat, lng + 2.0 * e),
            LatLng::new(lat + d, lng + 2.0 * e),
            LatLng::new(lat + d, lng + e),
            LatLng::new(lat + 2.0 * d, lng + e),
            LatLng::new(lat + 2.0 * d, lng),
        ];
        let area = geodesic_area(&ring) as f64;
        assert!((area - 30_000.0).abs() / 30_000.0 < 0.01, "{}", area);
    }

    #[test]
    fn test_degenerate_rings_are_zero() {
        assert_eq!(geodesic_area(&[]), 0);
        assert_eq!(
            geodesic_area(&[LatLng::new(1.0, 1.0), LatLng::new(2.0, 2.0)]),
            0
        );
        let collinear = vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(1.0, 1.0),
            LatLng::new(2.0, 2.0),
            LatLng::new(0.0, 0.0),
        ];
        assert!(is_degenerate(&collinear));
        assert_eq!(geodesic_area(&collinear), 0);
    }

    #[test]
    fn test_triangle_is_not_degenerate() {
        let tri = vec![
            LatLng::new(46.0, 11.0),
            LatLng::new(46.0, 11.001),
            LatLng::new(46.001, 11.0),
        ];
        assert!(!is_degenerate(&tri));
        assert!(geodesic_area(&tri) > 0);
    }
}
