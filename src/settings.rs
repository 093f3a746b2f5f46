//! Map settings.
//!
//! Settings are persisted to localStorage so they survive page reloads.
//! Native builds always start from defaults.

use crate::geo::LatLng;
use crate::habitat::EntityStyle;
use crate::overview::MAX_ENTITIES_PER_LOAD;
use serde::{Deserialize, Serialize};

/// Tunables for the overview and the boundary editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// At or below this zoom habitats are drawn as markers.
    pub marker_zoom_threshold: f64,
    /// Entities requested per overview load. Clamped to the API cap.
    pub max_entities: usize,
    pub verified_opacity: f32,
    pub unverified_opacity: f32,
    /// Zoom levels to back out after a vertex edit.
    pub edit_zoom_out_levels: u8,
    /// Query API base URL. Empty means built-in sample data.
    pub api_base_url: String,
    pub initial_center: LatLng,
    pub initial_zoom: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            marker_zoom_threshold: 13.0,
            max_entities: MAX_ENTITIES_PER_LOAD,
            verified_opacity: 0.85,
            unverified_opacity: 0.45,
            edit_zoom_out_levels: 2,
            api_base_url: String::new(),
            initial_center: LatLng::new(46.65, 11.35),
            initial_zoom: 9.0,
        }
    }
}

impl MapSettings {
    /// localStorage key for persisting settings.
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    const STORAGE_KEY: &'static str = "habitat_map_settings";

    pub fn new() -> Self {
        Self::default()
    }

    /// Brings out-of-range values back into range.
    pub fn sanitized(mut self) -> Self {
        self.max_entities = self.max_entities.clamp(1, MAX_ENTITIES_PER_LOAD);
        if !self.marker_zoom_threshold.is_finite() {
            self.marker_zoom_threshold = Self::default().marker_zoom_threshold;
        }
        if !self.initial_center.is_valid() {
            self.initial_center = Self::default().initial_center;
        }
        self
    }

    pub fn entity_style(&self) -> EntityStyle {
        EntityStyle::new(self.verified_opacity, self.unverified_opacity)
    }

    /// Load settings from localStorage.
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let window = match web_sys::window() {
            Some(w) => w,
            None => return Self::default(),
        };

        let storage = match window.local_storage() {
            Ok(Some(s)) => s,
            _ => return Self::default(),
        };

        let json = match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(s)) => s,
            _ => return Self::default(),
        };

        Self::from_json(&json)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    /// Parses stored settings, falling back to defaults.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Self>(json) {
            Ok(settings) => {
                log::info!("Loaded map settings from localStorage");
                settings.sanitized()
            }
            Err(e) => {
                log::warn!("Failed to parse map settings: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings to localStorage.
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let window = match web_sys::window() {
            Some(w) => w,
            None => return,
        };

        let storage = match window.local_storage() {
            Ok(Some(s)) => s,
            _ => return,
        };

        let json = match serde_json::to_string(self) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("Failed to serialize map settings: {}", e);
                return;
            }
        };

        if let Err(e) = storage.set_item(Self::STORAGE_KEY, &json) {
            log::warn!("Failed to save map settings: {:?}", e);
        } else {
            log::info!("Saved map settings to localStorage");
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        log::debug!("Settings persistence is only available in the browser");
    }
}
