//! Coordinate primitives and the raw boundary point union.
//!
//! Boundary data arrives from the record store in whatever shape the
//! capturing client happened to write: `[a, b]` pairs, `{lat, lng}` objects,
//! `{latitude, longitude}` objects, sometimes with numbers serialized as
//! strings. [`RawPoint`] is the single place that shape is interpreted.

use geo_types::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum absolute latitude in degrees.
pub const MAX_LAT: f64 = 90.0;
/// Maximum absolute longitude in degrees.
pub const MAX_LNG: f64 = 180.0;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both components are finite and inside the WGS84 range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= MAX_LAT
            && self.lng.abs() <= MAX_LNG
    }
}

impl From<LatLng> for Coord<f64> {
    fn from(p: LatLng) -> Self {
        Coord { x: p.lng, y: p.lat }
    }
}

impl From<Coord<f64>> for LatLng {
    fn from(c: Coord<f64>) -> Self {
        Self { lat: c.y, lng: c.x }
    }
}

/// Builds a `geo` polygon (x = lng, y = lat) from an open or closed ring.
pub fn ring_to_polygon(ring: &[LatLng]) -> Polygon<f64> {
    let exterior: LineString<f64> = ring.iter().copied().map(Coord::from).collect();
    Polygon::new(exterior, Vec::new())
}

/// One boundary point as found in a stored record.
///
/// Parsing is attempted as a pair first, then as named fields. Anything else
/// is kept as `Unrecognized` so the normalizer can drop it without failing
/// the whole polygon.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum RawPoint {
    /// `[a, b]` with no guaranteed axis order.
    Pair(f64, f64),
    /// `{lat|latitude, lng|longitude}`.
    Named { lat: f64, lng: f64 },
    Unrecognized,
}

impl RawPoint {
    /// Interprets a JSON value as a boundary point.
    pub fn from_value(value: &Value) -> Self {
        if let Some((a, b)) = pair_from_value(value) {
            return RawPoint::Pair(a, b);
        }
        if let Some((lat, lng)) = named_from_value(value) {
            return RawPoint::Named { lat, lng };
        }
        RawPoint::Unrecognized
    }

    /// The `(first, second)` numbers this point carries, in stored order.
    pub fn components(&self) -> Option<(f64, f64)> {
        match *self {
            RawPoint::Pair(a, b) => Some((a, b)),
            RawPoint::Named { lat, lng } => Some((lat, lng)),
            RawPoint::Unrecognized => None,
        }
    }
}

impl From<Value> for RawPoint {
    fn from(value: Value) -> Self {
        RawPoint::from_value(&value)
    }
}

impl From<LatLng> for RawPoint {
    fn from(p: LatLng) -> Self {
        RawPoint::Named {
            lat: p.lat,
            lng: p.lng,
        }
    }
}

fn pair_from_value(value: &Value) -> Option<(f64, f64)> {
    let items = value.as_array()?;
    if items.len() < 2 {
        return None;
    }
    Some((number_like(&items[0])?, number_like(&items[1])?))
}

fn named_from_value(value: &Value) -> Option<(f64, f64)> {
    let obj = value.as_object()?;
    let lat = obj
        .get("lat")
        .and_then(number_like)
        .or_else(|| obj.get("latitude").and_then(number_like))?;
    let lng = obj
        .get("lng")
        .and_then(number_like)
        .or_else(|| obj.get("longitude").and_then(number_like))?;
    Some((lat, lng))
}

/// Reads a number or a numeric string. Non-finite results are rejected.
pub(crate) fn number_like(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pair_parsing() {
        assert_eq!(
            RawPoint::from_value(&json!([46.5, 11.3])),
            RawPoint::Pair(46.5, 11.3)
        );
        assert_eq!(
            RawPoint::from_value(&json!(["46.5", " 11.3 "])),
            RawPoint::Pair(46.5, 11.3)
        );
        assert_eq!(RawPoint::from_value(&json!([46.5])), RawPoint::Unrecognized);
    }

    #[test]
    fn test_named_parsing() {
        assert_eq!(
            RawPoint::from_value(&json!({"lat": 46.5, "lng": 11.3})),
            RawPoint::Named {
                lat: 46.5,
                lng: 11.3
            }
        );
        assert_eq!(
            RawPoint::from_value(&json!({"latitude": "46.5", "longitude": 11.3})),
            RawPoint::Named {
                lat: 46.5,
                lng: 11.3
            }
        );
        // Short names win when both spellings are present
        assert_eq!(
            RawPoint::from_value(&json!({"lat": 1.0, "latitude": 2.0, "lng": 3.0})),
            RawPoint::Named { lat: 1.0, lng: 3.0 }
        );
    }

    #[test]
    fn test_garbage_is_unrecognized() {
        assert_eq!(RawPoint::from_value(&json!(null)), RawPoint::Unrecognized);
        assert_eq!(
            RawPoint::from_value(&json!({"lat": "north", "lng": 3.0})),
            RawPoint::Unrecognized
        );
        assert_eq!(
            RawPoint::from_value(&json!(["NaN", 3.0])),
            RawPoint::Unrecognized
        );
    }

    #[test]
    fn test_deserialize_mixed_list() {
        let points: Vec<RawPoint> =
            serde_json::from_str(r#"[[1, 2], {"lat": "3", "lng": 4}, "x"]"#).unwrap();
        assert_eq!(
            points,
            vec![
                RawPoint::Pair(1.0, 2.0),
                RawPoint::Named { lat: 3.0, lng: 4.0 },
                RawPoint::Unrecognized,
            ]
        );
    }
}
