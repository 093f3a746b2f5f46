//! Geographic primitives for the habitat map.
//!
//! This module provides boundary normalization, geodesic area and the map
//! projection used by the canvas.

pub mod area;
pub mod coords;
pub mod normalize;
pub mod projection;

pub use area::geodesic_area;
pub use coords::{LatLng, RawPoint};
pub use normalize::{normalize, NormalizedPolygon};
pub use projection::{BoundingBox, MapProjection};
