//! URL state encoding/decoding for shareable URLs.
//!
//! Encodes the map center and zoom in the URL query string so reloading
//! restores the view and URLs can be shared. Also performs the navigation
//! to a habitat's detail page.

use habitat_map::geo::LatLng;
use habitat_map::habitat::HabitatId;

/// Parsed URL parameters.
#[derive(Debug, Default, PartialEq)]
pub struct UrlParams {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub zoom: Option<f64>,
}

impl UrlParams {
    /// Center from the URL, if both components are present and valid.
    pub fn center(&self) -> Option<LatLng> {
        let center = LatLng::new(self.lat?, self.lng?);
        center.is_valid().then_some(center)
    }
}

/// Parses a query string, with or without the leading `?`.
pub fn parse_query(query: &str) -> UrlParams {
    let mut params = UrlParams::default();
    let query = query.trim_start_matches('?');

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let number = value.parse::<f64>().ok().filter(|v| v.is_finite());
        match key.as_ref() {
            "lat" => params.lat = number,
            "lng" | "lon" => params.lng = number,
            "z" => params.zoom = number,
            _ => {}
        }
    }

    params
}

/// Query string for a map view.
pub fn view_query(center: LatLng, zoom: f64) -> String {
    format!("?lat={:.5}&lng={:.5}&z={:.1}", center.lat, center.lng, zoom)
}

/// Path of a habitat's detail page.
pub fn habitat_detail_path(id: &HabitatId) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(id.as_str().as_bytes()).collect();
    format!("/habitats/{}", encoded)
}

/// Parse URL query parameters from the current browser URL.
#[cfg(target_arch = "wasm32")]
pub fn parse_from_url() -> UrlParams {
    let Some(window) = web_sys::window() else {
        return UrlParams::default();
    };
    match window.location().search() {
        Ok(search) => parse_query(&search),
        Err(_) => UrlParams::default(),
    }
}

/// No-op stub for native builds.
#[cfg(not(target_arch = "wasm32"))]
pub fn parse_from_url() -> UrlParams {
    UrlParams::default()
}

/// Push current view to the URL query string using `replaceState`.
#[cfg(target_arch = "wasm32")]
pub fn push_to_url(center: LatLng, zoom: f64) {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return;
    };
    let _ = history.replace_state_with_url(
        &wasm_bindgen::JsValue::NULL,
        "",
        Some(&view_query(center, zoom)),
    );
}

/// Native builds have no address bar; the view is only traced.
#[cfg(not(target_arch = "wasm32"))]
pub fn push_to_url(center: LatLng, zoom: f64) {
    log::trace!("View {}", view_query(center, zoom));
}

/// Opens the detail page of a habitat.
#[cfg(target_arch = "wasm32")]
pub fn navigate_to_habitat(id: &HabitatId) {
    let path = habitat_detail_path(id);
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(e) = window.location().set_href(&path) {
        log::error!("Failed to navigate to {}: {:?}", path, e);
    }
}

/// Native builds have no detail page; the navigation is only logged.
#[cfg(not(target_arch = "wasm32"))]
pub fn navigate_to_habitat(id: &HabitatId) {
    log::info!("Would open {}", habitat_detail_path(id));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        let params = parse_query("?lat=46.5&lon=11.35&z=12&site=x");
        assert_eq!(params.center(), Some(LatLng::new(46.5, 11.35)));
        assert_eq!(params.zoom, Some(12.0));
    }

    #[test]
    fn test_invalid_center_is_ignored() {
        assert_eq!(parse_query("lat=146&lng=11").center(), None);
        assert_eq!(parse_query("lat=abc&lng=11").center(), None);
        assert_eq!(parse_query("").center(), None);
    }

    #[test]
    fn test_view_query_round_trips() {
        let params = parse_query(&view_query(LatLng::new(46.12345, 11.54321), 13.0));
        assert_eq!(params.center(), Some(LatLng::new(46.12345, 11.54321)));
        assert_eq!(params.zoom, Some(13.0));
    }

    #[test]
    fn test_detail_path_is_encoded() {
        assert_eq!(habitat_detail_path(&HabitatId::from("hab-001")), "/habitats/hab-001");
        assert_eq!(habitat_detail_path(&HabitatId::from("a/b c")), "/habitats/a%2Fb+c");
    }
}
