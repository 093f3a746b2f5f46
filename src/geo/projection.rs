//! Map projection and coordinate transformation.
//!
//! Handles converting between geographic coordinates (lat/lng) and screen
//! coordinates using spherical Web Mercator with slippy-map zoom levels,
//! so zoom values mean the same thing as on any tiled web map.

use super::coords::LatLng;
use eframe::egui::{Pos2, Rect, Vec2};
use geo_types::Coord;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Size of one map tile in screen points.
pub const TILE_SIZE: f64 = 256.0;
/// Most zoomed-out level the map allows.
pub const MIN_ZOOM: f64 = 2.0;
/// Most zoomed-in level the map allows.
pub const MAX_ZOOM: f64 = 20.0;
/// Web Mercator latitude limit.
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// Geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Self {
        Self {
            min_lng,
            min_lat,
            max_lng,
            max_lat,
        }
    }

    pub fn contains(&self, p: LatLng) -> bool {
        p.lng >= self.min_lng && p.lng <= self.max_lng && p.lat >= self.min_lat && p.lat <= self.max_lat
    }

    /// Checks if another box overlaps this one.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !(other.max_lng < self.min_lng
            || other.min_lng > self.max_lng
            || other.max_lat < self.min_lat
            || other.min_lat > self.max_lat)
    }

    /// Grows the box by `margin` degrees on every side.
    pub fn expanded(&self, margin: f64) -> Self {
        Self::new(
            self.min_lng - margin,
            self.min_lat - margin,
            self.max_lng + margin,
            self.max_lat + margin,
        )
    }

    /// Query parameter form: "min_lng,min_lat,max_lng,max_lat".
    pub fn to_param(&self) -> String {
        format!(
            "{:.6},{:.6},{:.6},{:.6}",
            self.min_lng, self.min_lat, self.max_lng, self.max_lat
        )
    }
}

/// Map projection for converting geographic to screen coordinates.
#[derive(Debug, Clone)]
pub struct MapProjection {
    /// Center of the view
    pub center: LatLng,
    /// Current zoom level (fractional levels allowed)
    pub zoom: f64,
    /// Screen rectangle for the canvas
    pub screen_rect: Rect,
}

impl Default for MapProjection {
    fn default() -> Self {
        Self {
            // South Tyrol
            center: LatLng::new(46.65, 11.35),
            zoom: 9.0,
            screen_rect: Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0)),
        }
    }
}

impl MapProjection {
    /// Creates a new projection centered on the given position.
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            ..Default::default()
        }
    }

    /// Updates the screen rectangle (the canvas may resize every frame).
    pub fn set_screen_rect(&mut self, screen_rect: Rect) {
        self.screen_rect = screen_rect;
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    /// Projects to world pixel coordinates at the current zoom.
    fn to_world(&self, p: LatLng) -> (f64, f64) {
        let lat = p.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
        let size = self.world_size();
        let x = (p.lng + 180.0) / 360.0 * size;
        let y = (1.0 - ((PI / 4.0 + lat / 2.0).tan()).ln() / PI) / 2.0 * size;
        (x, y)
    }

    fn from_world(&self, x: f64, y: f64) -> LatLng {
        let size = self.world_size();
        let lng = x / size * 360.0 - 180.0;
        let n = PI * (1.0 - 2.0 * y / size);
        let lat = n.sinh().atan().to_degrees();
        LatLng::new(lat, lng)
    }

    /// Converts a geographic position to a screen position.
    pub fn geo_to_screen(&self, p: LatLng) -> Pos2 {
        let (cx, cy) = self.to_world(self.center);
        let (x, y) = self.to_world(p);
        let center = self.screen_rect.center();
        Pos2::new(center.x + (x - cx) as f32, center.y + (y - cy) as f32)
    }

    /// Same as [`geo_to_screen`](Self::geo_to_screen) for `geo_types` coordinates.
    pub fn coord_to_screen(&self, coord: Coord<f64>) -> Pos2 {
        self.geo_to_screen(coord.into())
    }

    /// Converts a screen position to a geographic position.
    pub fn screen_to_geo(&self, pos: Pos2) -> LatLng {
        let (cx, cy) = self.to_world(self.center);
        let center = self.screen_rect.center();
        self.from_world(
            cx + (pos.x - center.x) as f64,
            cy + (pos.y - center.y) as f64,
        )
    }

    /// Returns the visible geographic bounds.
    pub fn visible_bounds(&self) -> BoundingBox {
        let top_left = self.screen_to_geo(self.screen_rect.left_top());
        let bottom_right = self.screen_to_geo(self.screen_rect.right_bottom());

        BoundingBox::new(
            top_left.lng.min(bottom_right.lng),
            top_left.lat.min(bottom_right.lat),
            top_left.lng.max(bottom_right.lng),
            top_left.lat.max(bottom_right.lat),
        )
    }

    /// Checks if a position is within the visible bounds (with margin).
    pub fn is_visible(&self, p: LatLng, margin_deg: f64) -> bool {
        self.visible_bounds().expanded(margin_deg).contains(p)
    }

    /// Moves the view by a screen-space drag delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        let center = self.screen_rect.center();
        self.center = self.screen_to_geo(center - delta);
    }

    /// Sets the zoom, clamped to the allowed range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Zooms while keeping the geographic point under `anchor` stationary.
    pub fn zoom_around(&mut self, anchor: Pos2, new_zoom: f64) {
        let geo_before = self.screen_to_geo(anchor);
        self.set_zoom(new_zoom);
        let drift = self.geo_to_screen(geo_before) - anchor;
        self.pan_by(-drift);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_maps_to_screen_center() {
        let proj = MapProjection::new(LatLng::new(46.5, 11.3), 12.0);
        let pos = proj.geo_to_screen(LatLng::new(46.5, 11.3));
        assert!((pos - proj.screen_rect.center()).length() < 1e-3);
    }

    #[test]
    fn test_screen_geo_roundtrip() {
        let proj = MapProjection::new(LatLng::new(46.5, 11.3), 14.0);
        let p = LatLng::new(46.51, 11.29);
        let back = proj.screen_to_geo(proj.geo_to_screen(p));
        assert!((back.lat - p.lat).abs() < 1e-5);
        assert!((back.lng - p.lng).abs() < 1e-5);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut proj = MapProjection::new(LatLng::new(0.0, 0.0), 50.0);
        assert_eq!(proj.zoom, MAX_ZOOM);
        proj.set_zoom(-3.0);
        assert_eq!(proj.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_zoom_around_keeps_anchor() {
        let mut proj = MapProjection::new(LatLng::new(46.5, 11.3), 10.0);
        let anchor = Pos2::new(600.0, 200.0);
        let before = proj.screen_to_geo(anchor);
        proj.zoom_around(anchor, 12.0);
        let after = proj.screen_to_geo(anchor);
        assert!((before.lat - after.lat).abs() < 1e-4);
        assert!((before.lng - after.lng).abs() < 1e-4);
    }

    #[test]
    fn test_visibility_margin() {
        let proj = MapProjection::new(LatLng::new(46.5, 11.3), 12.0);
        let far = LatLng::new(46.5, 13.3);
        assert!(proj.is_visible(LatLng::new(46.5, 11.3), 0.0));
        assert!(!proj.is_visible(far, 0.0));
        assert!(proj.is_visible(far, 3.0));

        let pos = proj.coord_to_screen(Coord { x: 11.3, y: 46.5 });
        assert!((pos - proj.screen_rect.center()).length() < 1e-3);
    }

    #[test]
    fn test_bbox_intersection() {
        let a = BoundingBox::new(10.0, 46.0, 12.0, 47.0);
        assert!(a.intersects(&BoundingBox::new(11.5, 46.5, 13.0, 48.0)));
        assert!(!a.intersects(&BoundingBox::new(12.5, 46.5, 13.0, 48.0)));
        assert_eq!(a.to_param(), "10.000000,46.000000,12.000000,47.000000");
    }
}
