//! Caller-supplied hooks.
//!
//! All hooks are invoked synchronously from the handler that produced the
//! change. Unset hooks are skipped.

use crate::geo::LatLng;
use crate::habitat::HabitatId;

type PointsHook = Box<dyn FnMut(&[LatLng])>;
type AreaHook = Box<dyn FnMut(u64)>;
type HabitatHook = Box<dyn FnMut(&HabitatId)>;
type ZoomHook = Box<dyn FnMut(f64)>;

/// Hooks fired by the boundary editor.
#[derive(Default)]
pub struct EditorCallbacks {
    on_polygon_change: Option<PointsHook>,
    on_area_change: Option<AreaHook>,
}

impl EditorCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_polygon_change(mut self, hook: impl FnMut(&[LatLng]) + 'static) -> Self {
        self.on_polygon_change = Some(Box::new(hook));
        self
    }

    pub fn on_area_change(mut self, hook: impl FnMut(u64) + 'static) -> Self {
        self.on_area_change = Some(Box::new(hook));
        self
    }

    pub(crate) fn polygon_changed(&mut self, points: &[LatLng]) {
        if let Some(hook) = self.on_polygon_change.as_mut() {
            hook(points);
        }
    }

    pub(crate) fn area_changed(&mut self, square_meters: u64) {
        if let Some(hook) = self.on_area_change.as_mut() {
            hook(square_meters);
        }
    }
}

/// Hooks fired by the overview renderer.
#[derive(Default)]
pub struct OverviewCallbacks {
    on_habitat_click: Option<HabitatHook>,
    on_zoom_change: Option<ZoomHook>,
}

impl OverviewCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_habitat_click(mut self, hook: impl FnMut(&HabitatId) + 'static) -> Self {
        self.on_habitat_click = Some(Box::new(hook));
        self
    }

    pub fn on_zoom_change(mut self, hook: impl FnMut(f64) + 'static) -> Self {
        self.on_zoom_change = Some(Box::new(hook));
        self
    }

    pub(crate) fn habitat_clicked(&mut self, id: &HabitatId) {
        if let Some(hook) = self.on_habitat_click.as_mut() {
            hook(id);
        }
    }

    pub(crate) fn zoom_changed(&mut self, zoom: f64) {
        if let Some(hook) = self.on_zoom_change.as_mut() {
            hook(zoom);
        }
    }
}
