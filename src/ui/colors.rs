//! Centralized color constants for the UI.
//!
//! This module provides consistent colors across all UI panels.

use eframe::egui::Color32;

/// General UI colors for labels and values.
pub mod ui {
    use super::Color32;

    /// Muted gray for stat labels.
    pub const LABEL: Color32 = Color32::from_rgb(100, 100, 100);
    /// Slightly brighter for stat values.
    pub const VALUE: Color32 = Color32::from_rgb(160, 160, 160);
    /// Emphasized color for active states.
    pub const ACTIVE: Color32 = Color32::from_rgb(100, 180, 255);
    /// Success/positive indicator.
    pub const SUCCESS: Color32 = Color32::from_rgb(100, 200, 100);
    /// Error banner text.
    pub const ERROR: Color32 = Color32::from_rgb(255, 110, 110);
    /// Error banner background.
    pub const ERROR_BG: Color32 = Color32::from_rgb(70, 28, 28);
}

/// Colors for the map canvas.
pub mod map {
    use super::Color32;

    pub const BACKGROUND: Color32 = Color32::from_rgb(22, 28, 30);
    pub const GRATICULE: Color32 = Color32::from_rgba_premultiplied(50, 60, 62, 120);
    pub const GRATICULE_LABEL: Color32 = Color32::from_rgb(90, 100, 104);
    pub const OVERLAY_TEXT: Color32 = Color32::from_rgb(200, 200, 220);
    /// Outline of the selected entity.
    pub const SELECTION: Color32 = Color32::from_rgb(255, 255, 255);
    pub const MARKER_OUTLINE: Color32 = Color32::from_rgb(15, 15, 20);
}

/// Colors for boundary capture.
pub mod capture {
    use super::Color32;

    /// Stroke of the shape being drawn freehand.
    pub const SKETCH: Color32 = Color32::from_rgb(255, 200, 60);
    /// Staged shape fill.
    pub const FILL: Color32 = Color32::from_rgba_premultiplied(40, 90, 140, 90);
    pub const OUTLINE: Color32 = Color32::from_rgb(90, 170, 255);
    pub const VERTEX: Color32 = Color32::from_rgb(255, 255, 255);
    pub const VERTEX_ACTIVE: Color32 = Color32::from_rgb(255, 200, 60);
}
