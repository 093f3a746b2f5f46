//! Overview of all documented habitats.
//!
//! The renderer owns the displayed entity set, the current selection and
//! the load bookkeeping. It never performs I/O itself: filter changes hand
//! back a [`LoadTicket`] for the caller to issue, and finished loads are fed
//! back through [`OverviewRenderer::apply_load`]. Only the result for the
//! most recent ticket is ever applied.

use super::filters::HabitatFilters;
use super::loader::{LoadResult, LoadTicket};
use super::query::{FilterOptions, HabitatQuery};
use crate::callbacks::OverviewCallbacks;
use crate::habitat::{to_entities, EntityStyle, HabitatId, MapEntity};
use crate::settings::MapSettings;

/// How entities are drawn at the current zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Markers,
    Polygons,
}

/// Draw instruction for one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderItem<'a> {
    Marker(&'a MapEntity),
    Polygon(&'a MapEntity),
}

impl<'a> RenderItem<'a> {
    pub fn entity(&self) -> &'a MapEntity {
        match self {
            RenderItem::Marker(e) | RenderItem::Polygon(e) => e,
        }
    }
}

/// Who is looking at the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer {
    pub authenticated: bool,
}

/// Result of clicking an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Entity selected, nothing else.
    Selected(HabitatId),
    /// Entity selected and its detail view should open.
    Navigate(HabitatId),
    /// No such entity on the map.
    Ignored,
}

/// Counts from the last applied load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub shown: usize,
    /// Records without a usable position or boundary.
    pub dropped: usize,
    /// Entries the response carried but that could not be decoded.
    pub skipped: usize,
    pub total_matching: u64,
}

pub struct OverviewRenderer {
    marker_zoom_threshold: f64,
    max_entities: usize,
    style: EntityStyle,
    zoom: f64,

    filter_key: Option<String>,
    generation: u64,
    loading: bool,

    entities: Vec<MapEntity>,
    selected: Option<HabitatId>,
    banner: Option<String>,
    summary: LoadSummary,
    filter_options: FilterOptions,

    callbacks: OverviewCallbacks,
}

impl OverviewRenderer {
    pub fn new(settings: &MapSettings, callbacks: OverviewCallbacks) -> Self {
        Self {
            marker_zoom_threshold: settings.marker_zoom_threshold,
            max_entities: settings.max_entities,
            style: settings.entity_style(),
            zoom: settings.initial_zoom,
            filter_key: None,
            generation: 0,
            loading: false,
            entities: Vec::new(),
            selected: None,
            banner: None,
            summary: LoadSummary::default(),
            filter_options: FilterOptions::default(),
            callbacks,
        }
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Registers the active filters. Returns a ticket only when their stable
    /// key differs from the one last loaded.
    pub fn update_filters(&mut self, filters: &HabitatFilters) -> Option<LoadTicket> {
        let key = filters.stable_key();
        if self.filter_key.as_deref() == Some(key.as_str()) {
            return None;
        }

        self.filter_key = Some(key);
        self.generation += 1;
        self.loading = true;
        log::debug!("Filters changed, issuing load #{}", self.generation);

        Some(LoadTicket {
            generation: self.generation,
            query: HabitatQuery::for_map(filters, self.max_entities),
        })
    }

    /// Applies a finished load. Returns false if it was superseded.
    ///
    /// A failed load keeps the previous entities and raises a banner.
    pub fn apply_load(&mut self, load: LoadResult) -> bool {
        if load.generation != self.generation {
            log::debug!(
                "Ignoring stale load #{} (current #{})",
                load.generation,
                self.generation
            );
            return false;
        }
        self.loading = false;

        match load.result {
            Ok(page) => {
                let batch = to_entities(&page.entries, &self.style);
                self.summary = LoadSummary {
                    shown: batch.entities.len(),
                    dropped: batch.dropped,
                    skipped: page.skipped,
                    total_matching: page.pagination.total,
                };
                log::info!(
                    "Loaded {} habitats ({} without position, {} matching)",
                    self.summary.shown,
                    self.summary.dropped,
                    self.summary.total_matching
                );

                self.entities = batch.entities;
                if let Some(options) = page.filter_options {
                    self.filter_options = options;
                }
                self.banner = None;

                if let Some(ref id) = self.selected {
                    if !self.entities.iter().any(|e| &e.id == id) {
                        self.selected = None;
                    }
                }
            }
            Err(e) => {
                log::error!("Failed to load habitats: {}", e);
                self.banner = Some(format!("Could not load habitats: {}", e));
            }
        }
        true
    }

    /// Forgets everything. Loads still in flight will be ignored, and the
    /// next filter update always issues a new load.
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.loading = false;
        self.filter_key = None;
        self.entities.clear();
        self.selected = None;
        self.banner = None;
        self.summary = LoadSummary::default();
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    pub fn summary(&self) -> LoadSummary {
        self.summary
    }

    pub fn filter_options(&self) -> &FilterOptions {
        &self.filter_options
    }

    pub fn entities(&self) -> &[MapEntity] {
        &self.entities
    }

    // ========================================================================
    // Display
    // ========================================================================

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Records a zoom change from the map.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom != self.zoom {
            self.zoom = zoom;
            self.callbacks.zoom_changed(zoom);
        }
    }

    pub fn display_mode(&self) -> DisplayMode {
        if self.zoom <= self.marker_zoom_threshold {
            DisplayMode::Markers
        } else {
            DisplayMode::Polygons
        }
    }

    /// What to draw for each entity. Entities without a boundary stay
    /// markers at any zoom.
    pub fn render_plan(&self) -> Vec<RenderItem<'_>> {
        let polygons = self.display_mode() == DisplayMode::Polygons;
        self.entities
            .iter()
            .map(|entity| {
                if polygons && entity.has_polygon() {
                    RenderItem::Polygon(entity)
                } else {
                    RenderItem::Marker(entity)
                }
            })
            .collect()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn selected(&self) -> Option<&HabitatId> {
        self.selected.as_ref()
    }

    pub fn selected_entity(&self) -> Option<&MapEntity> {
        let id = self.selected.as_ref()?;
        self.entities.iter().find(|e| &e.id == id)
    }

    /// Selects the entity. Authenticated viewers are also sent to its
    /// detail view.
    pub fn click_entity(&mut self, id: &HabitatId, viewer: Viewer) -> ClickOutcome {
        if !self.entities.iter().any(|e| &e.id == id) {
            log::warn!("Click on unknown habitat {}", id);
            return ClickOutcome::Ignored;
        }

        self.selected = Some(id.clone());
        if viewer.authenticated {
            self.callbacks.habitat_clicked(id);
            ClickOutcome::Navigate(id.clone())
        } else {
            ClickOutcome::Selected(id.clone())
        }
    }

    pub fn click_empty(&mut self) {
        self.selected = None;
    }
}
