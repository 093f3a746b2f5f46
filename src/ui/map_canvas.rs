//! Map canvas: the egui implementation of the map widget.
//!
//! The canvas owns the projection, drawn layers and on-map controls. User
//! input is turned into [`MapEvent`]s which the application drains once per
//! frame and routes to the editor or the overview renderer.

use super::colors;
use eframe::egui::{self, Color32, Painter, Pos2, Rect, RichText, Sense, Shape, Stroke, Vec2};
use geo::TriangulateEarcut;
use geo_types::{Coord, Polygon};
use habitat_map::editor::{ControlAction, ControlId, ControlNode, LayerId, MapControl, MapWidget};
use habitat_map::geo::coords::ring_to_polygon;
use habitat_map::geo::{BoundingBox, LatLng, MapProjection};
use habitat_map::habitat::{HabitatId, MapEntity};
use habitat_map::overview::{DisplayMode, RenderItem};

/// Minimum screen distance between freehand samples.
const SKETCH_SPACING: f32 = 6.0;
/// Pick radius around a vertex handle.
const VERTEX_PICK_RADIUS: f32 = 9.0;
const MARKER_RADIUS: f32 = 6.0;

/// Something the user did on the map.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// A freehand shape was completed and installed as `layer`.
    DrawFinished { layer: LayerId, points: Vec<LatLng> },
    /// A vertex drag on an editable layer ended.
    VertexEdited { layer: LayerId, points: Vec<LatLng> },
    ControlPressed(ControlAction),
    EntityClicked(HabitatId),
    EmptyClicked,
    /// Escape pressed over the map.
    CancelRequested,
}

struct DrawnLayer {
    id: LayerId,
    points: Vec<LatLng>,
    editable: bool,
}

pub struct MapCanvas {
    projection: MapProjection,
    home: (LatLng, f64),
    next_id: u64,
    layers: Vec<DrawnLayer>,
    controls: Vec<(ControlId, MapControl)>,
    /// Points of the freehand shape in progress. `Some` while drawing.
    sketch: Option<Vec<LatLng>>,
    dragging_vertex: Option<(LayerId, usize)>,
    events: Vec<MapEvent>,
}

impl MapCanvas {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            projection: MapProjection::new(center, zoom),
            home: (center, zoom),
            next_id: 0,
            layers: Vec::new(),
            controls: Vec::new(),
            sketch: None,
            dragging_vertex: None,
            events: Vec::new(),
        }
    }

    pub fn projection(&self) -> &MapProjection {
        &self.projection
    }

    pub fn is_drawing(&self) -> bool {
        self.sketch.is_some()
    }

    /// Takes the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<MapEvent> {
        std::mem::take(&mut self.events)
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Draws the map and processes input for this frame.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        plan: &[RenderItem<'_>],
        mode: DisplayMode,
        selected: Option<&HabitatId>,
    ) {
        let available_size = ui.available_size();
        let (response, painter) = ui.allocate_painter(available_size, Sense::click_and_drag());
        let rect = response.rect;
        self.projection.set_screen_rect(rect);

        painter.rect_filled(rect, 0.0, colors::map::BACKGROUND);
        self.draw_graticule(&painter, rect);

        let view = self.projection.visible_bounds();
        for item in plan.iter().filter(|item| self.in_view(**item, &view)) {
            self.draw_entity(&painter, *item, selected);
        }
        self.draw_layers(&painter);
        self.draw_sketch(&painter);

        self.handle_input(&response, plan);

        let hovered = if self.sketch.is_none() && self.dragging_vertex.is_none() {
            response
                .hover_pos()
                .and_then(|pos| self.hit_test(plan, pos))
        } else {
            None
        };
        if let Some(entity) = hovered {
            response.on_hover_ui_at_pointer(|ui| entity_tooltip(ui, entity));
        }

        self.draw_overlay_info(ui, rect, mode, plan.len());
        self.show_controls(ui, rect);
    }

    // ========================================================================
    // Input
    // ========================================================================

    fn handle_input(&mut self, response: &egui::Response, plan: &[RenderItem<'_>]) {
        let pointer = response.interact_pointer_pos();

        if response.hovered() && response.ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.events.push(MapEvent::CancelRequested);
        }

        if let Some(sketch) = self.sketch.as_mut() {
            if response.dragged() {
                if let Some(pos) = pointer {
                    let far_enough = sketch.last().is_none_or(|last| {
                        self.projection.geo_to_screen(*last).distance(pos) >= SKETCH_SPACING
                    });
                    if far_enough {
                        sketch.push(self.projection.screen_to_geo(pos));
                    }
                }
            }
            if response.drag_stopped() {
                self.finish_sketch();
            }
        } else {
            self.handle_vertex_drag(response, pointer);

            if self.dragging_vertex.is_none() && response.dragged() {
                self.projection.pan_by(response.drag_delta());
            }

            if response.clicked() {
                let event = pointer
                    .and_then(|pos| self.hit_test(plan, pos))
                    .map(|entity| MapEvent::EntityClicked(entity.id.clone()))
                    .unwrap_or(MapEvent::EmptyClicked);
                self.events.push(event);
            }

            if response.double_clicked() {
                let (center, zoom) = self.home;
                self.projection.center = center;
                self.projection.set_zoom(zoom);
            }
        }

        // Scroll zooms around the cursor
        if response.hovered() {
            let scroll_delta = response.ctx.input(|i| i.raw_scroll_delta);
            if scroll_delta.y != 0.0 {
                let new_zoom = self.projection.zoom + scroll_delta.y as f64 / 120.0;
                let anchor = response.hover_pos().unwrap_or(response.rect.center());
                self.projection.zoom_around(anchor, new_zoom);
            }
        }
    }

    fn finish_sketch(&mut self) {
        let Some(points) = self.sketch.take() else {
            return;
        };
        let layer = LayerId(self.next_id());
        log::debug!("Freehand shape finished with {} points", points.len());
        self.layers.push(DrawnLayer {
            id: layer,
            points: points.clone(),
            editable: false,
        });
        self.events.push(MapEvent::DrawFinished { layer, points });
    }

    fn handle_vertex_drag(&mut self, response: &egui::Response, pointer: Option<Pos2>) {
        if response.drag_started() {
            self.dragging_vertex = pointer.and_then(|pos| self.pick_vertex(pos));
        }

        let Some((layer_id, index)) = self.dragging_vertex else {
            return;
        };

        if response.dragged() {
            if let Some(pos) = pointer {
                let geo = self.projection.screen_to_geo(pos);
                if let Some(vertex) = self
                    .layer_mut(layer_id)
                    .and_then(|layer| layer.points.get_mut(index))
                {
                    *vertex = geo;
                }
            }
        }

        if response.drag_stopped() {
            self.dragging_vertex = None;
            if let Some(layer) = self.layers.iter().find(|l| l.id == layer_id) {
                self.events.push(MapEvent::VertexEdited {
                    layer: layer_id,
                    points: layer.points.clone(),
                });
            }
        }
    }

    fn layer_mut(&mut self, id: LayerId) -> Option<&mut DrawnLayer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    fn pick_vertex(&self, pos: Pos2) -> Option<(LayerId, usize)> {
        self.layers
            .iter()
            .filter(|l| l.editable)
            .find_map(|layer| {
                layer
                    .points
                    .iter()
                    .position(|p| {
                        self.projection.geo_to_screen(*p).distance(pos) <= VERTEX_PICK_RADIUS
                    })
                    .map(|index| (layer.id, index))
            })
    }

    /// Topmost entity under `pos`.
    fn hit_test<'a>(&self, plan: &[RenderItem<'a>], pos: Pos2) -> Option<&'a MapEntity> {
        plan.iter().rev().find_map(|item| {
            let hit = match item {
                RenderItem::Marker(entity) => {
                    self.projection.geo_to_screen(entity.position).distance(pos)
                        <= MARKER_RADIUS + 3.0
                }
                RenderItem::Polygon(entity) => entity
                    .polygon
                    .as_ref()
                    .is_some_and(|polygon| polygon.contains(self.projection.screen_to_geo(pos))),
            };
            hit.then(|| item.entity())
        })
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    /// Whether any part of the entity can be on screen.
    fn in_view(&self, item: RenderItem<'_>, view: &BoundingBox) -> bool {
        match item {
            RenderItem::Marker(entity) => {
                let width = self.projection.screen_rect.width().max(1.0) as f64;
                let deg_per_point = (view.max_lng - view.min_lng) / width;
                self.projection
                    .is_visible(entity.position, deg_per_point * (MARKER_RADIUS as f64 + 3.0))
            }
            RenderItem::Polygon(entity) => entity
                .polygon
                .as_ref()
                .is_some_and(|polygon| view.intersects(&polygon.bounding_box())),
        }
    }

    fn fill(&self, painter: &Painter, polygon: &Polygon<f64>, color: Color32) {
        let mesh = fill_mesh(polygon, color, |coord| self.projection.coord_to_screen(coord));
        painter.add(Shape::mesh(mesh));
    }

    fn draw_graticule(&self, painter: &Painter, rect: Rect) {
        let bounds = self.projection.visible_bounds();
        let span = (bounds.max_lng - bounds.min_lng).max(bounds.max_lat - bounds.min_lat);
        let step = graticule_step(span);
        let stroke = Stroke::new(1.0, colors::map::GRATICULE);
        let font = egui::FontId::monospace(10.0);

        let mut lng = (bounds.min_lng / step).floor() * step;
        while lng <= bounds.max_lng {
            let x = self.projection.geo_to_screen(LatLng::new(bounds.min_lat, lng)).x;
            painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
            painter.text(
                Pos2::new(x + 2.0, rect.bottom() - 2.0),
                egui::Align2::LEFT_BOTTOM,
                format!("{:.2}°E", lng),
                font.clone(),
                colors::map::GRATICULE_LABEL,
            );
            lng += step;
        }

        let mut lat = (bounds.min_lat / step).floor() * step;
        while lat <= bounds.max_lat {
            let y = self.projection.geo_to_screen(LatLng::new(lat, bounds.min_lng)).y;
            painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
            painter.text(
                Pos2::new(rect.left() + 2.0, y - 2.0),
                egui::Align2::LEFT_BOTTOM,
                format!("{:.2}°N", lat),
                font.clone(),
                colors::map::GRATICULE_LABEL,
            );
            lat += step;
        }
    }

    fn draw_entity(&self, painter: &Painter, item: RenderItem<'_>, selected: Option<&HabitatId>) {
        let entity = item.entity();
        let is_selected = selected == Some(&entity.id);

        match item {
            RenderItem::Polygon(entity) => {
                let Some(polygon) = entity.polygon.as_ref() else {
                    return;
                };
                let screen_points: Vec<Pos2> = polygon
                    .open_ring()
                    .iter()
                    .map(|p| self.projection.geo_to_screen(*p))
                    .collect();

                self.fill(painter, &polygon.to_geo(), entity.fill_color());
                let outline = if is_selected {
                    Stroke::new(2.5, colors::map::SELECTION)
                } else {
                    Stroke::new(1.5, entity.color.color())
                };
                painter.add(Shape::closed_line(screen_points, outline));
            }
            RenderItem::Marker(entity) => {
                let center = self.projection.geo_to_screen(entity.position);
                painter.circle_filled(center, MARKER_RADIUS, entity.fill_color());
                painter.circle_stroke(
                    center,
                    MARKER_RADIUS,
                    Stroke::new(1.0, colors::map::MARKER_OUTLINE),
                );
                if is_selected {
                    painter.circle_stroke(
                        center,
                        MARKER_RADIUS + 3.0,
                        Stroke::new(2.0, colors::map::SELECTION),
                    );
                }
            }
        }
    }

    fn draw_layers(&self, painter: &Painter) {
        for layer in &self.layers {
            let screen_points: Vec<Pos2> = layer
                .points
                .iter()
                .map(|p| self.projection.geo_to_screen(*p))
                .collect();
            if screen_points.len() >= 3 {
                self.fill(painter, &ring_to_polygon(&layer.points), colors::capture::FILL);
            }
            painter.add(Shape::closed_line(
                screen_points.clone(),
                Stroke::new(2.0, colors::capture::OUTLINE),
            ));

            if layer.editable {
                for (index, pos) in screen_points.iter().enumerate() {
                    let active = self.dragging_vertex == Some((layer.id, index));
                    let color = if active {
                        colors::capture::VERTEX_ACTIVE
                    } else {
                        colors::capture::VERTEX
                    };
                    painter.circle_filled(*pos, 4.5, color);
                    painter.circle_stroke(*pos, 4.5, Stroke::new(1.0, colors::capture::OUTLINE));
                }
            }
        }
    }

    fn draw_sketch(&self, painter: &Painter) {
        let Some(sketch) = self.sketch.as_ref() else {
            return;
        };
        let points: Vec<Pos2> = sketch
            .iter()
            .map(|p| self.projection.geo_to_screen(*p))
            .collect();
        painter.add(Shape::line(points, Stroke::new(2.0, colors::capture::SKETCH)));
    }

    fn draw_overlay_info(&self, ui: &mut egui::Ui, rect: Rect, mode: DisplayMode, count: usize) {
        let overlay_pos = rect.left_top() + Vec2::new(10.0, 10.0);
        let overlay_rect = Rect::from_min_size(overlay_pos, Vec2::new(220.0, 70.0));
        let center = self.projection.center;
        let mode = match mode {
            DisplayMode::Markers => "markers",
            DisplayMode::Polygons => "polygons",
        };

        ui.scope_builder(egui::UiBuilder::new().max_rect(overlay_rect), |ui| {
            ui.vertical(|ui| {
                for line in [
                    format!("{:.4}°N {:.4}°E", center.lat, center.lng),
                    format!("Zoom {:.1} ({})", self.projection.zoom, mode),
                    format!("{} habitats", count),
                ] {
                    ui.label(
                        RichText::new(line)
                            .monospace()
                            .size(12.0)
                            .color(colors::map::OVERLAY_TEXT),
                    );
                }
                if self.is_drawing() {
                    ui.label(
                        RichText::new("Drag to draw the boundary")
                            .size(12.0)
                            .color(colors::capture::SKETCH),
                    );
                }
            });
        });
    }

    fn show_controls(&mut self, ui: &mut egui::Ui, rect: Rect) {
        let mut pressed = Vec::new();
        let mut top = rect.top() + 10.0;

        for (id, control) in &self.controls {
            let control_rect = Rect::from_min_size(
                Pos2::new(rect.right() - 160.0, top),
                Vec2::new(150.0, 130.0),
            );
            ui.scope_builder(
                egui::UiBuilder::new()
                    .max_rect(control_rect)
                    .id_salt(("map_control", id.0)),
                |ui| {
                    egui::Frame::group(ui.style())
                        .fill(ui.visuals().panel_fill)
                        .show(ui, |ui| {
                            ui.label(
                                RichText::new(format!("Capture: {}", control.state.label()))
                                    .size(11.0)
                                    .color(colors::ui::LABEL),
                            );
                            for button in &control.buttons {
                                let text = format!(
                                    "{} {}",
                                    action_icon(button.action),
                                    button.action.label()
                                );
                                if ui
                                    .add_enabled(button.enabled, egui::Button::new(text))
                                    .clicked()
                                {
                                    pressed.push(button.action);
                                }
                            }
                        });
                },
            );
            top += 140.0;
        }

        self.events
            .extend(pressed.into_iter().map(MapEvent::ControlPressed));
    }
}

impl MapWidget for MapCanvas {
    fn zoom(&self) -> f64 {
        self.projection.zoom
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.projection.set_zoom(zoom);
    }

    fn begin_freehand(&mut self) {
        self.dragging_vertex = None;
        self.sketch = Some(Vec::new());
    }

    fn end_freehand(&mut self) {
        self.sketch = None;
    }

    fn remove_layer(&mut self, layer: LayerId) -> bool {
        let before = self.layers.len();
        self.layers.retain(|l| l.id != layer);
        if self.dragging_vertex.is_some_and(|(id, _)| id == layer) {
            self.dragging_vertex = None;
        }
        self.layers.len() != before
    }

    fn set_vertex_editing(&mut self, layer: LayerId, enabled: bool) {
        if let Some(layer) = self.layer_mut(layer) {
            layer.editable = enabled;
        }
    }

    fn add_control(&mut self, control: MapControl) -> ControlId {
        let id = ControlId(self.next_id());
        self.controls.push((id, control));
        id
    }

    fn remove_control(&mut self, id: ControlId) -> bool {
        let before = self.controls.len();
        self.controls.retain(|(cid, _)| *cid != id);
        self.controls.len() != before
    }

    fn control_nodes(&self) -> Vec<ControlNode> {
        self.controls
            .iter()
            .map(|(id, control)| ControlNode {
                id: *id,
                marker: control.marker.to_string(),
            })
            .collect()
    }
}

fn action_icon(action: ControlAction) -> &'static str {
    use egui_phosphor::regular;
    match action {
        ControlAction::StartCapture => regular::POLYGON,
        ControlAction::Save => regular::FLOPPY_DISK,
        ControlAction::Restart => regular::ARROW_COUNTER_CLOCKWISE,
        ControlAction::Cancel => regular::X,
    }
}

fn entity_tooltip(ui: &mut egui::Ui, entity: &MapEntity) {
    ui.label(RichText::new(&entity.name).strong().color(entity.color.color()));
    for line in entity.metadata.tooltip_lines() {
        ui.label(RichText::new(line).size(11.0).color(colors::ui::VALUE));
    }
}

/// Grid spacing in degrees for a visible span.
fn graticule_step(span: f64) -> f64 {
    const STEPS: [f64; 8] = [0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0];
    STEPS
        .iter()
        .copied()
        .find(|step| span / step <= 12.0)
        .unwrap_or(10.0)
}

/// Ear-clips `polygon` into a fill mesh, so concave rings fill correctly.
fn fill_mesh(
    polygon: &Polygon<f64>,
    color: Color32,
    to_screen: impl Fn(Coord<f64>) -> Pos2,
) -> egui::Mesh {
    let mut mesh = egui::Mesh::default();
    for triangle in polygon.earcut_triangles_iter() {
        let base = mesh.vertices.len() as u32;
        for coord in triangle.to_array() {
            mesh.colored_vertex(to_screen(coord), color);
        }
        mesh.add_triangle(base, base + 1, base + 2);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use habitat_map::editor::{ControlLifecycleManager, EditorState, CAPTURE_CONTROL_MARKER};

    fn l_shape() -> Polygon<f64> {
        // Screen-space L: the quarter right of x = 10 and below y = 10 is missing
        ring_to_polygon(&[
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 10.0),
            LatLng::new(10.0, 10.0),
            LatLng::new(10.0, 20.0),
            LatLng::new(20.0, 20.0),
            LatLng::new(20.0, 0.0),
        ])
    }

    fn mesh_triangles(mesh: &egui::Mesh) -> Vec<[Pos2; 3]> {
        mesh.indices
            .chunks(3)
            .map(|t| [0, 1, 2].map(|i| mesh.vertices[t[i] as usize].pos))
            .collect()
    }

    fn triangle_area(t: &[Pos2; 3]) -> f32 {
        ((t[1] - t[0]).x * (t[2] - t[0]).y - (t[2] - t[0]).x * (t[1] - t[0]).y).abs() / 2.0
    }

    fn covers(t: &[Pos2; 3], p: Pos2) -> bool {
        let side = |a: Pos2, b: Pos2| (b - a).x * (p - a).y - (p - a).x * (b - a).y;
        let (d1, d2, d3) = (side(t[0], t[1]), side(t[1], t[2]), side(t[2], t[0]));
        (d1 >= 0.0 && d2 >= 0.0 && d3 >= 0.0) || (d1 <= 0.0 && d2 <= 0.0 && d3 <= 0.0)
    }

    #[test]
    fn test_concave_fill_stays_inside_outline() {
        let mesh = fill_mesh(&l_shape(), Color32::WHITE, |c| Pos2::new(c.x as f32, c.y as f32));
        let triangles = mesh_triangles(&mesh);
        assert_eq!(triangles.len(), 4);

        let area: f32 = triangles.iter().map(triangle_area).sum();
        assert!((area - 300.0).abs() < 1e-3, "{}", area);

        assert!(triangles.iter().any(|t| covers(t, Pos2::new(5.0, 5.0))));
        assert!(triangles.iter().any(|t| covers(t, Pos2::new(5.0, 15.0))));
        assert!(!triangles.iter().any(|t| covers(t, Pos2::new(15.0, 9.0))));
    }

    #[test]
    fn test_graticule_step() {
        assert_eq!(graticule_step(0.05), 0.005);
        assert_eq!(graticule_step(3.0), 0.5);
        assert_eq!(graticule_step(500.0), 10.0);
    }

    #[test]
    fn test_canvas_keeps_single_control() {
        let mut canvas = MapCanvas::new(LatLng::new(46.5, 11.3), 12.0);
        let mut controls = ControlLifecycleManager::new();
        for state in [EditorState::Idle, EditorState::Drawing, EditorState::Editing] {
            controls.sync(&mut canvas, state);
        }
        let nodes = canvas.control_nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].marker, CAPTURE_CONTROL_MARKER);
    }

    #[test]
    fn test_freehand_produces_layer() {
        let mut canvas = MapCanvas::new(LatLng::new(46.5, 11.3), 12.0);
        canvas.begin_freehand();
        assert!(canvas.is_drawing());
        if let Some(sketch) = canvas.sketch.as_mut() {
            sketch.extend([
                LatLng::new(46.50, 11.30),
                LatLng::new(46.50, 11.31),
                LatLng::new(46.51, 11.31),
            ]);
        }
        canvas.finish_sketch();

        let events = canvas.drain_events();
        let Some(MapEvent::DrawFinished { layer, points }) = events.first() else {
            panic!("expected a finished drawing, got {:?}", events);
        };
        assert_eq!(points.len(), 3);
        assert!(canvas.remove_layer(*layer));
        assert!(!canvas.is_drawing());
        assert!(canvas.drain_events().is_empty());
    }
}
