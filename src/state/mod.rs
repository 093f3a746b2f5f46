//! Application state management.
//!
//! Everything the panels read and edit lives here. The overview renderer,
//! boundary editor and map canvas are owned by the app itself.

pub mod url_state;

use habitat_map::geo::{LatLng, NormalizedPolygon};
use habitat_map::overview::{HabitatFilters, Viewer};
use habitat_map::settings::MapSettings;
use std::cell::RefCell;
use std::rc::Rc;

/// What the boundary editor last reported.
#[derive(Debug, Default)]
pub struct CaptureResults {
    /// Current boundary, empty when nothing is staged.
    pub points: Vec<LatLng>,
    pub area_m2: u64,
    /// Last saved boundary.
    pub saved: Option<NormalizedPolygon>,
    /// Last rejected operation, shown under the capture section.
    pub error: Option<String>,
}

/// Shared with the editor callbacks.
pub type SharedCapture = Rc<RefCell<CaptureResults>>;

/// Root application state.
pub struct AppState {
    pub settings: MapSettings,

    /// Filters edited in the left panel
    pub filters: HabitatFilters,

    /// Restrict loads to the map area visible when this was switched on
    pub limit_to_view: bool,

    pub viewer: Viewer,

    pub capture: SharedCapture,

    /// Application status message displayed in top bar
    pub status_message: String,

    /// Where habitats are loaded from
    pub source_label: String,
}

impl AppState {
    pub fn new(settings: MapSettings) -> Self {
        Self {
            settings,
            filters: HabitatFilters::default(),
            limit_to_view: false,
            viewer: Viewer::default(),
            capture: Rc::new(RefCell::new(CaptureResults::default())),
            status_message: "Ready".to_string(),
            source_label: String::new(),
        }
    }
}

/// Formats an area for display.
pub fn format_area(square_meters: u64) -> String {
    if square_meters >= 10_000 {
        format!("{:.2} ha", square_meters as f64 / 10_000.0)
    } else {
        format!("{} m²", square_meters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_area() {
        assert_eq!(format_area(0), "0 m²");
        assert_eq!(format_area(9_999), "9999 m²");
        assert_eq!(format_area(12_345), "1.23 ha");
    }
}
