//! Boundary normalization.
//!
//! Turns a list of [`RawPoint`]s into a closed, validated
//! [`NormalizedPolygon`], or rejects it so the caller can treat the record
//! as boundary-less.

use super::coords::{ring_to_polygon, LatLng, RawPoint, MAX_LAT};
use super::projection::BoundingBox;
use geo::{BoundingRect, Contains};
use geo_types::{Coord, Point, Polygon};
use serde::Serialize;

/// Minimum number of distinct vertices a boundary needs.
pub const MIN_DISTINCT_VERTICES: usize = 3;

/// A closed ring of `(lat, lng)` vertices.
///
/// Always holds at least four points and the first point equals the last
/// exactly. Only [`normalize`] constructs one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedPolygon(Vec<LatLng>);

impl NormalizedPolygon {
    /// All vertices including the closing point.
    pub fn vertices(&self) -> &[LatLng] {
        &self.0
    }

    /// Vertices without the closing duplicate.
    pub fn open_ring(&self) -> &[LatLng] {
        &self.0[..self.0.len() - 1]
    }

    pub fn first(&self) -> LatLng {
        self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// The ring as a `geo` polygon, x = lng and y = lat.
    pub fn to_geo(&self) -> Polygon<f64> {
        ring_to_polygon(&self.0)
    }

    /// Whether `p` lies strictly inside the ring. Concave rings are handled.
    pub fn contains(&self, p: LatLng) -> bool {
        self.to_geo().contains(&Point::from(Coord::from(p)))
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let first = self.first();
        match self.to_geo().bounding_rect() {
            Some(rect) => BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y),
            None => BoundingBox::new(first.lng, first.lat, first.lng, first.lat),
        }
    }

    /// Converts back into raw points, e.g. to re-run normalization.
    pub fn to_raw(&self) -> Vec<RawPoint> {
        self.0.iter().copied().map(RawPoint::from).collect()
    }

    pub fn into_vertices(self) -> Vec<LatLng> {
        self.0
    }
}

/// Resolves a single raw point to a valid `(lat, lng)`.
///
/// If the first component cannot be a latitude (`|first| > 90`) the pair is
/// taken to be `(lng, lat)` and swapped. Points that are still out of range
/// afterwards are dropped.
pub fn resolve_point(raw: &RawPoint) -> Option<LatLng> {
    let (first, second) = raw.components()?;
    let point = if first.abs() > MAX_LAT {
        LatLng::new(second, first)
    } else {
        LatLng::new(first, second)
    };
    point.is_valid().then_some(point)
}

/// Normalizes a raw boundary into a closed polygon.
///
/// Returns `None` when fewer than [`MIN_DISTINCT_VERTICES`] distinct valid
/// points remain. Already-closed input is returned unchanged.
pub fn normalize(raw: &[RawPoint]) -> Option<NormalizedPolygon> {
    let mut points: Vec<LatLng> = raw.iter().filter_map(resolve_point).collect();

    let dropped = raw.len() - points.len();
    if dropped > 0 {
        log::debug!("Dropped {} unusable boundary point(s)", dropped);
    }

    if distinct_count(&points) < MIN_DISTINCT_VERTICES {
        return None;
    }

    let first = points[0];
    if points.last() != Some(&first) {
        points.push(first);
    }

    Some(NormalizedPolygon(points))
}

/// Distinct points, counted up to [`MIN_DISTINCT_VERTICES`].
pub(crate) fn distinct_count(points: &[LatLng]) -> usize {
    let mut distinct: Vec<LatLng> = Vec::with_capacity(MIN_DISTINCT_VERTICES);
    for p in points {
        if !distinct.contains(p) {
            distinct.push(*p);
            if distinct.len() >= MIN_DISTINCT_VERTICES {
                break;
            }
        }
    }
    distinct.len()
}
