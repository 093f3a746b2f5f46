//! Boundary capture on the map.
//!
//! The editor owns at most one staged layer. Every operation receives the
//! map widget as a borrowed handle, mutates it synchronously and reports
//! the resulting points and area through [`EditorCallbacks`].

use super::state::{EditorAction, EditorError, EditorState};
use super::widget::{ControlAction, LayerId, MapWidget};
use crate::callbacks::EditorCallbacks;
use crate::geo::normalize::{distinct_count, resolve_point};
use crate::geo::projection::MIN_ZOOM;
use crate::geo::{geodesic_area, normalize, LatLng, NormalizedPolygon, RawPoint};

/// Draw/edit state machine for a single habitat boundary.
pub struct PolygonEditor {
    state: EditorState,
    staged: Option<LayerId>,
    points: Vec<LatLng>,
    area_m2: u64,
    /// Zoom levels to back out after each vertex edit.
    zoom_out_levels: f64,
    callbacks: EditorCallbacks,
}

impl PolygonEditor {
    pub fn new(zoom_out_levels: u8, callbacks: EditorCallbacks) -> Self {
        Self {
            state: EditorState::Idle,
            staged: None,
            points: Vec::new(),
            area_m2: 0,
            zoom_out_levels: zoom_out_levels as f64,
            callbacks,
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    /// Current boundary vertices (closed ring once normalized).
    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    /// Current area in square meters.
    pub fn area(&self) -> u64 {
        self.area_m2
    }

    pub fn staged_layer(&self) -> Option<LayerId> {
        self.staged
    }

    /// Validates `action` against the current state without applying it.
    fn check(&self, action: EditorAction) -> Result<EditorState, EditorError> {
        self.state.transition(action).inspect_err(|e| {
            log::warn!("Boundary editor: {}", e);
        })
    }

    fn enter(&mut self, next: EditorState) {
        if next != self.state {
            log::debug!("Boundary editor: {} -> {}", self.state.label(), next.label());
        }
        self.state = next;
    }

    fn clear_staged(&mut self, map: &mut impl MapWidget) {
        if let Some(layer) = self.staged.take() {
            map.set_vertex_editing(layer, false);
            map.remove_layer(layer);
        }
        self.points.clear();
        self.area_m2 = 0;
    }

    fn emit(&mut self) {
        self.callbacks.polygon_changed(&self.points);
        self.callbacks.area_changed(self.area_m2);
    }

    /// Idle -> Drawing. Clears any staged layer and starts a freehand draw.
    pub fn start_drawing(&mut self, map: &mut impl MapWidget) -> Result<(), EditorError> {
        let next = self.check(EditorAction::Start)?;
        self.clear_staged(map);
        map.begin_freehand();
        self.enter(next);
        Ok(())
    }

    /// Stages the layer the widget just drew and switches to vertex editing.
    ///
    /// A shape with fewer than three distinct vertices is removed again and
    /// the editor stays in Drawing with a fresh freehand draw.
    pub fn finish_drawing(
        &mut self,
        map: &mut impl MapWidget,
        layer: LayerId,
        points: &[LatLng],
    ) -> Result<(), EditorError> {
        let next = self.check(EditorAction::FinishDrawing)?;

        if let Some(previous) = self.staged.take() {
            if previous != layer {
                map.remove_layer(previous);
            }
        }

        let raw: Vec<RawPoint> = points.iter().copied().map(RawPoint::from).collect();
        let Some(polygon) = normalize(&raw) else {
            let resolved: Vec<LatLng> = raw.iter().filter_map(resolve_point).collect();
            let distinct = distinct_count(&resolved);
            log::warn!("Discarding drawn shape with {} distinct vertices", distinct);
            map.remove_layer(layer);
            map.begin_freehand();
            return Err(EditorError::DegenerateShape { distinct });
        };

        self.staged = Some(layer);
        self.area_m2 = geodesic_area(polygon.vertices());
        self.points = polygon.into_vertices();
        self.emit();

        self.enter(next);
        map.set_vertex_editing(layer, true);
        Ok(())
    }

    /// Applies a finished vertex drag, then widens the view.
    pub fn edit(&mut self, map: &mut impl MapWidget, points: &[LatLng]) -> Result<(), EditorError> {
        let next = self.check(EditorAction::Edit)?;

        let raw: Vec<RawPoint> = points.iter().copied().map(RawPoint::from).collect();
        self.points = match normalize(&raw) {
            Some(polygon) => polygon.into_vertices(),
            None => points.to_vec(),
        };
        self.area_m2 = geodesic_area(&self.points);
        self.emit();
        self.enter(next);

        let zoom = (map.zoom() - self.zoom_out_levels).max(MIN_ZOOM);
        map.set_zoom(zoom);
        Ok(())
    }

    /// Finalizes the staged boundary and returns to Idle.
    ///
    /// Fails, staying in Editing, if vertex edits collapsed the shape.
    pub fn save(&mut self, map: &mut impl MapWidget) -> Result<NormalizedPolygon, EditorError> {
        let next = self.check(EditorAction::Save)?;

        let raw: Vec<RawPoint> = self.points.iter().copied().map(RawPoint::from).collect();
        let polygon = normalize(&raw).ok_or_else(|| EditorError::DegenerateShape {
            distinct: distinct_count(&self.points),
        })?;

        self.callbacks.polygon_changed(polygon.vertices());
        log::info!(
            "Saved boundary with {} vertices, {} m²",
            polygon.open_ring().len(),
            self.area_m2
        );
        self.clear_staged(map);
        self.enter(next);
        Ok(polygon)
    }

    /// Drops the staged shape and returns to Idle. Emits an empty point list.
    pub fn cancel(&mut self, map: &mut impl MapWidget) -> Result<(), EditorError> {
        let next = self.check(EditorAction::Cancel)?;
        if self.state == EditorState::Drawing {
            map.end_freehand();
        }
        self.clear_staged(map);
        self.callbacks.polygon_changed(&[]);
        self.enter(next);
        Ok(())
    }

    /// Discards the staged shape and draws again.
    pub fn restart(&mut self, map: &mut impl MapWidget) -> Result<(), EditorError> {
        let next = self.check(EditorAction::Restart)?;
        self.clear_staged(map);
        self.callbacks.polygon_changed(&[]);
        map.begin_freehand();
        self.enter(next);
        Ok(())
    }

    /// Routes a control button press.
    pub fn dispatch(
        &mut self,
        map: &mut impl MapWidget,
        action: ControlAction,
    ) -> Result<(), EditorError> {
        match action {
            ControlAction::StartCapture => self.start_drawing(map),
            ControlAction::Save => self.save(map).map(|_| ()),
            ControlAction::Restart => self.restart(map),
            ControlAction::Cancel => self.cancel(map),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::widget::testing::RecordingMap;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Emitted {
        polygons: Vec<Vec<LatLng>>,
        areas: Vec<u64>,
    }

    fn editor() -> (PolygonEditor, Rc<RefCell<Emitted>>) {
        let emitted = Rc::new(RefCell::new(Emitted::default()));
        let (p, a) = (emitted.clone(), emitted.clone());
        let callbacks = EditorCallbacks::new()
            .on_polygon_change(move |points| p.borrow_mut().polygons.push(points.to_vec()))
            .on_area_change(move |area| a.borrow_mut().areas.push(area));
        (PolygonEditor::new(2, callbacks), emitted)
    }

    fn square() -> Vec<LatLng> {
        vec![
            LatLng::new(46.500, 11.300),
            LatLng::new(46.500, 11.310),
            LatLng::new(46.510, 11.310),
            LatLng::new(46.510, 11.300),
        ]
    }

    #[test]
    fn test_finish_drawing_enters_edit_mode() {
        let (mut editor, emitted) = editor();
        let mut map = RecordingMap::new(14.0);

        editor.start_drawing(&mut map).unwrap();
        assert!(map.freehand);
        assert_eq!(editor.state(), EditorState::Drawing);

        let layer = map.draw_layer();
        editor.finish_drawing(&mut map, layer, &square()).unwrap();

        assert_eq!(editor.state(), EditorState::Editing);
        assert_eq!(editor.staged_layer(), Some(layer));
        assert!(map.editable.contains(&layer));

        let emitted = emitted.borrow();
        assert_eq!(emitted.polygons.len(), 1);
        let ring = &emitted.polygons[0];
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
        assert_eq!(emitted.areas.len(), 1);
        assert!(emitted.areas[0] > 0);
    }

    #[test]
    fn test_degenerate_drawing_stays_in_drawing() {
        let (mut editor, emitted) = editor();
        let mut map = RecordingMap::new(14.0);
        editor.start_drawing(&mut map).unwrap();

        let layer = map.draw_layer();
        let line = [LatLng::new(46.5, 11.3), LatLng::new(46.6, 11.4)];
        let err = editor.finish_drawing(&mut map, layer, &line).unwrap_err();

        assert_eq!(err, EditorError::DegenerateShape { distinct: 2 });
        assert_eq!(editor.state(), EditorState::Drawing);
        assert!(map.layers.is_empty());
        assert!(map.freehand);
        assert!(emitted.borrow().polygons.is_empty());
    }

    #[test]
    fn test_edit_recomputes_and_zooms_out() {
        let (mut editor, emitted) = editor();
        let mut map = RecordingMap::new(15.0);
        editor.start_drawing(&mut map).unwrap();
        let layer = map.draw_layer();
        editor.finish_drawing(&mut map, layer, &square()).unwrap();
        let first_area = editor.area();

        let mut dragged = square();
        dragged[2] = LatLng::new(46.520, 11.320);
        editor.edit(&mut map, &dragged).unwrap();

        assert_eq!(editor.state(), EditorState::Editing);
        assert!(editor.area() > first_area);
        assert_eq!(map.zoom, 13.0);
        assert_eq!(emitted.borrow().areas.len(), 2);

        map.zoom = 3.0;
        editor.edit(&mut map, &dragged).unwrap();
        assert_eq!(map.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_edit_to_collinear_reports_zero_area() {
        let (mut editor, _) = editor();
        let mut map = RecordingMap::new(15.0);
        editor.start_drawing(&mut map).unwrap();
        let layer = map.draw_layer();
        editor.finish_drawing(&mut map, layer, &square()).unwrap();

        let collinear = [
            LatLng::new(46.50, 11.30),
            LatLng::new(46.51, 11.31),
            LatLng::new(46.52, 11.32),
        ];
        editor.edit(&mut map, &collinear).unwrap();
        assert_eq!(editor.area(), 0);
    }

    #[test]
    fn test_save_emits_and_returns_to_idle() {
        let (mut editor, emitted) = editor();
        let mut map = RecordingMap::new(14.0);
        editor.start_drawing(&mut map).unwrap();
        let layer = map.draw_layer();
        editor.finish_drawing(&mut map, layer, &square()).unwrap();

        let polygon = editor.save(&mut map).unwrap();
        assert_eq!(polygon.open_ring(), &square()[..]);
        assert_eq!(editor.state(), EditorState::Idle);
        assert!(map.layers.is_empty());
        assert_eq!(emitted.borrow().polygons.len(), 2);
    }

    #[test]
    fn test_save_of_collapsed_shape_stays_editing() {
        let (mut editor, _) = editor();
        let mut map = RecordingMap::new(14.0);
        editor.start_drawing(&mut map).unwrap();
        let layer = map.draw_layer();
        editor.finish_drawing(&mut map, layer, &square()).unwrap();

        let p = LatLng::new(46.5, 11.3);
        editor.edit(&mut map, &[p, p, LatLng::new(46.6, 11.3)]).unwrap();
        assert!(matches!(
            editor.save(&mut map),
            Err(EditorError::DegenerateShape { .. })
        ));
        assert_eq!(editor.state(), EditorState::Editing);
    }

    #[test]
    fn test_cancel_emits_empty_points() {
        let (mut editor, emitted) = editor();
        let mut map = RecordingMap::new(14.0);
        editor.start_drawing(&mut map).unwrap();
        let layer = map.draw_layer();
        editor.finish_drawing(&mut map, layer, &square()).unwrap();

        editor.cancel(&mut map).unwrap();
        assert_eq!(editor.state(), EditorState::Idle);
        assert!(editor.points().is_empty());
        assert!(map.layers.is_empty());
        assert_eq!(emitted.borrow().polygons.last(), Some(&Vec::new()));

        editor.start_drawing(&mut map).unwrap();
        editor.cancel(&mut map).unwrap();
        assert!(!map.freehand);
    }

    #[test]
    fn test_restart_redraws() {
        let (mut editor, _) = editor();
        let mut map = RecordingMap::new(14.0);
        editor.start_drawing(&mut map).unwrap();
        let layer = map.draw_layer();
        editor.finish_drawing(&mut map, layer, &square()).unwrap();

        editor.restart(&mut map).unwrap();
        assert_eq!(editor.state(), EditorState::Drawing);
        assert!(map.layers.is_empty());
        assert!(map.freehand);
        assert_eq!(editor.area(), 0);
    }

    #[test]
    fn test_invalid_operation_leaves_state() {
        let (mut editor, emitted) = editor();
        let mut map = RecordingMap::new(14.0);
        assert!(editor.save(&mut map).is_err());
        assert!(editor.restart(&mut map).is_err());
        assert!(editor.edit(&mut map, &square()).is_err());
        assert_eq!(editor.state(), EditorState::Idle);
        assert!(emitted.borrow().polygons.is_empty());
        assert_eq!(map.zoom, 14.0);
    }

    #[test]
    fn test_single_staged_layer() {
        let (mut editor, _) = editor();
        let mut map = RecordingMap::new(14.0);
        editor.start_drawing(&mut map).unwrap();
        let first = map.draw_layer();
        editor.finish_drawing(&mut map, first, &square()).unwrap();
        editor.restart(&mut map).unwrap();
        let second = map.draw_layer();
        editor.finish_drawing(&mut map, second, &square()).unwrap();

        assert_eq!(map.layers.len(), 1);
        assert!(map.layers.contains(&second));
    }
}
