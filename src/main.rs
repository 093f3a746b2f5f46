#![warn(clippy::all)]

//! Habitat Map - field mapping of documented habitats.
//!
//! Shows every documented habitat on an overview map, colored by protection
//! status, and lets the user capture a new habitat boundary by drawing it
//! freehand and refining its vertices.

mod state;
mod ui;

use eframe::egui;
use habitat_map::callbacks::{EditorCallbacks, OverviewCallbacks};
use habitat_map::editor::{
    ControlAction, ControlLifecycleManager, EditorError, EditorState, MapWidget, PolygonEditor,
};
use habitat_map::overview::{
    ClickOutcome, ConfiguredSource, HabitatSource, LoadChannel, OverviewRenderer,
};
use habitat_map::settings::MapSettings;
use state::AppState;
use ui::map_canvas::{MapCanvas, MapEvent};

// Native entry point
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::init();

    let native_options = eframe::NativeOptions::default();

    eframe::run_native(
        "Habitat Map",
        native_options,
        Box::new(|cc| Ok(Box::new(HabitatMapApp::new(cc)))),
    )
}

// WASM entry point - main is not called on wasm32
#[cfg(target_arch = "wasm32")]
fn main() {}

/// Entry point for the WASM application.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn start() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` messages to `console.log`:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document to mount the map in");
            return;
        };

        let Some(canvas) = document
            .get_element_by_id("app_canvas")
            .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            log::error!("Failed to find app_canvas");
            return;
        };

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(HabitatMapApp::new(cc)))),
            )
            .await;

        // Remove the loading text once the app has loaded:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p>The app has crashed. See the developer console for details.</p>",
                    );
                    log::error!("Failed to start eframe: {e:?}");
                }
            }
        }
    });
}

/// Main application state and logic.
pub struct HabitatMapApp {
    /// State shared with the UI panels
    state: AppState,

    /// Map surface, also the widget the editor and controls act on
    canvas: MapCanvas,

    /// Boundary capture
    editor: PolygonEditor,

    /// Keeps exactly one capture control on the map
    controls: ControlLifecycleManager,

    /// Overview entities, selection and load bookkeeping
    overview: OverviewRenderer,

    /// Channel for async habitat loads
    load_channel: LoadChannel,

    source: ConfiguredSource,

    /// Monotonic instant of last URL push (for throttling to ~1/sec).
    last_url_push: web_time::Instant,
}

impl HabitatMapApp {
    /// Creates a new HabitatMapApp instance.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let settings = MapSettings::load();
        settings.save();

        // Apply URL parameters (lat/lng/zoom)
        let url_params = state::url_state::parse_from_url();
        let center = url_params.center().unwrap_or(settings.initial_center);
        let zoom = url_params.zoom.unwrap_or(settings.initial_zoom);

        let source = ConfiguredSource::from_base_url(&settings.api_base_url);
        log::info!("Loading habitats from {}", source.describe());

        let mut state = AppState::new(settings);
        state.source_label = source.describe();

        let capture = state.capture.clone();
        let area_capture = state.capture.clone();
        let editor_callbacks = EditorCallbacks::new()
            .on_polygon_change(move |points| {
                capture.borrow_mut().points = points.to_vec();
            })
            .on_area_change(move |square_meters| {
                area_capture.borrow_mut().area_m2 = square_meters;
            });

        let overview_callbacks = OverviewCallbacks::new()
            .on_habitat_click(state::url_state::navigate_to_habitat)
            .on_zoom_change(|zoom| log::debug!("Overview zoom now {:.1}", zoom));

        let mut canvas = MapCanvas::new(center, zoom);
        let mut controls = ControlLifecycleManager::new();
        controls.attach(&mut canvas, EditorState::Idle);

        let mut overview = OverviewRenderer::new(&state.settings, overview_callbacks);
        overview.set_zoom(zoom);

        Self {
            editor: PolygonEditor::new(state.settings.edit_zoom_out_levels, editor_callbacks),
            state,
            canvas,
            controls,
            overview,
            load_channel: LoadChannel::new(),
            source,
            last_url_push: web_time::Instant::now(),
        }
    }

    /// Issues a load when the filters changed and applies finished ones.
    fn process_loads(&mut self, ctx: &egui::Context) {
        while let Some(result) = self.load_channel.try_recv() {
            let generation = result.generation;
            if self.overview.apply_load(result) {
                let summary = self.overview.summary();
                self.state.status_message = match self.overview.banner() {
                    Some(_) => "Load failed".to_string(),
                    None => format!("{} habitats", summary.shown),
                };
                log::info!("Applied load #{}: {:?}", generation, summary);
            }
        }

        self.state.filters.bbox = match (self.state.limit_to_view, self.state.filters.bbox) {
            (true, None) => Some(self.canvas.projection().visible_bounds()),
            (true, bbox) => bbox,
            (false, _) => None,
        };

        if let Some(ticket) = self.overview.update_filters(&self.state.filters) {
            self.state.status_message = "Loading habitats...".to_string();
            self.load_channel
                .load(ctx.clone(), self.source.clone(), ticket);
        }
    }

    /// Routes canvas events to the editor and the overview.
    fn process_map_events(&mut self) {
        for event in self.canvas.drain_events() {
            let result = match event {
                MapEvent::DrawFinished { layer, points } => {
                    self.editor.finish_drawing(&mut self.canvas, layer, &points)
                }
                MapEvent::VertexEdited { points, .. } => self.editor.edit(&mut self.canvas, &points),
                MapEvent::ControlPressed(ControlAction::Save) => {
                    self.editor.save(&mut self.canvas).map(|polygon| {
                        log::info!("Saved boundary with {} vertices", polygon.len());
                        self.state.capture.borrow_mut().saved = Some(polygon);
                    })
                }
                MapEvent::ControlPressed(action) => self.editor.dispatch(&mut self.canvas, action),
                MapEvent::EntityClicked(id) => {
                    // Habitat clicks are ignored while a boundary is being captured
                    if self.editor.state() == EditorState::Idle {
                        let outcome = self.overview.click_entity(&id, self.state.viewer);
                        if let ClickOutcome::Selected(id) = outcome {
                            self.state.status_message = format!("Selected {}", id.as_str());
                        }
                    }
                    Ok(())
                }
                MapEvent::EmptyClicked => {
                    if self.editor.state() == EditorState::Idle {
                        self.overview.click_empty();
                    }
                    Ok(())
                }
                MapEvent::CancelRequested => match self.editor.state() {
                    EditorState::Idle => Ok(()),
                    _ => self.editor.cancel(&mut self.canvas),
                },
            };
            self.record_editor_result(result);
        }
    }

    fn record_editor_result(&mut self, result: Result<(), EditorError>) {
        let mut capture = self.state.capture.borrow_mut();
        match result {
            Ok(()) => capture.error = None,
            Err(e) => capture.error = Some(e.to_string()),
        }
    }
}

impl eframe::App for HabitatMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_loads(ctx);

        // Render UI panels in the correct order for egui layout
        // Side and top/bottom panels must be rendered before CentralPanel
        ui::render_top_bar(ctx, &mut self.state, &mut self.overview);
        ui::render_left_panel(ctx, &mut self.state, &self.overview, self.editor.state());

        egui::CentralPanel::default()
            .frame(egui::Frame::new())
            .show(ctx, |ui| {
                let plan = self.overview.render_plan();
                self.canvas.show(
                    ui,
                    &plan,
                    self.overview.display_mode(),
                    self.overview.selected(),
                );
            });

        self.process_map_events();
        self.controls.sync(&mut self.canvas, self.editor.state());
        self.overview.set_zoom(self.canvas.zoom());

        // Push current view to URL (throttled to once per second)
        {
            let now = web_time::Instant::now();
            if now.duration_since(self.last_url_push).as_secs_f64() >= 1.0 {
                self.last_url_push = now;
                let projection = self.canvas.projection();
                state::url_state::push_to_url(projection.center, projection.zoom);
            }
        }
    }
}
