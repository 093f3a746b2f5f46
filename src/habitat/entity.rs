//! Conversion of habitat records into renderable map entities.

use super::record::{display_status, HabitatId, HabitatRecord, ProtectionStatus};
use crate::geo::{normalize, LatLng, NormalizedPolygon};
use eframe::egui::Color32;

/// Severity color of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Alert,
    Caution,
    Standard,
    /// No protection status was computed upstream.
    Unclassified,
}

impl StatusColor {
    /// Strict mapping from the protection status. Free-text status is never
    /// consulted here.
    pub fn from_status(status: Option<ProtectionStatus>) -> Self {
        match status {
            Some(ProtectionStatus::Red) => Self::Alert,
            Some(ProtectionStatus::Yellow) => Self::Caution,
            Some(ProtectionStatus::Green) => Self::Standard,
            None => Self::Unclassified,
        }
    }

    pub fn color(&self) -> Color32 {
        match self {
            Self::Alert => Color32::from_rgb(220, 60, 60),
            Self::Caution => Color32::from_rgb(240, 190, 40),
            Self::Standard => Color32::from_rgb(60, 170, 90),
            Self::Unclassified => Color32::from_rgb(140, 140, 150),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Alert => "Red",
            Self::Caution => "Yellow",
            Self::Standard => "Green",
            Self::Unclassified => "Not assessed",
        }
    }

    pub fn all() -> &'static [StatusColor] {
        &[
            Self::Alert,
            Self::Caution,
            Self::Standard,
            Self::Unclassified,
        ]
    }
}

/// Opacity policy for entities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityStyle {
    verified_opacity: f32,
    unverified_opacity: f32,
}

impl Default for EntityStyle {
    fn default() -> Self {
        Self {
            verified_opacity: 0.85,
            unverified_opacity: 0.45,
        }
    }
}

impl EntityStyle {
    /// Creates a style; the unverified opacity is capped at the verified one.
    pub fn new(verified_opacity: f32, unverified_opacity: f32) -> Self {
        let verified_opacity = verified_opacity.clamp(0.0, 1.0);
        let mut unverified_opacity = unverified_opacity.clamp(0.0, 1.0);
        if unverified_opacity > verified_opacity {
            log::warn!(
                "Unverified opacity {} exceeds verified opacity {}, capping",
                unverified_opacity,
                verified_opacity
            );
            unverified_opacity = verified_opacity;
        }
        Self {
            verified_opacity,
            unverified_opacity,
        }
    }

    pub fn opacity(&self, verified: bool) -> f32 {
        if verified {
            self.verified_opacity
        } else {
            self.unverified_opacity
        }
    }
}

/// Tooltip data carried alongside an entity. The map does not interpret it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityMetadata {
    pub municipality: Option<String>,
    pub location_name: Option<String>,
    pub recorded_by: Option<String>,
    pub verified: bool,
    pub elevation: Option<f64>,
    pub status: String,
}

impl EntityMetadata {
    fn from_record(record: &HabitatRecord) -> Self {
        Self {
            municipality: record.municipality.clone(),
            location_name: record.location_name.clone(),
            recorded_by: record.recorded_by.clone(),
            verified: record.verified,
            elevation: record.elevation,
            status: display_status(record.status.as_deref().unwrap_or_default()),
        }
    }

    /// Lines for a hover tooltip.
    pub fn tooltip_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match (&self.municipality, &self.location_name) {
            (Some(m), Some(l)) => lines.push(format!("{}, {}", l, m)),
            (Some(m), None) => lines.push(m.clone()),
            (None, Some(l)) => lines.push(l.clone()),
            (None, None) => {}
        }
        if let Some(elevation) = self.elevation {
            lines.push(format!("{:.0} m a.s.l.", elevation));
        }
        if let Some(ref recorder) = self.recorded_by {
            lines.push(format!("Recorded by {}", recorder));
        }
        lines.push(format!("Status: {}", self.status));
        lines.push(if self.verified { "Verified" } else { "Not verified" }.to_string());
        lines
    }
}

/// A habitat ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntity {
    pub id: HabitatId,
    pub name: String,
    pub position: LatLng,
    pub polygon: Option<NormalizedPolygon>,
    pub color: StatusColor,
    pub opacity: f32,
    pub metadata: EntityMetadata,
}

impl MapEntity {
    pub fn has_polygon(&self) -> bool {
        self.polygon.is_some()
    }

    /// Fill color with the entity's opacity applied.
    pub fn fill_color(&self) -> Color32 {
        self.color.color().gamma_multiply(self.opacity)
    }
}

/// Explicit record position, if usable. Zero components count as absent.
fn explicit_position(record: &HabitatRecord) -> Option<LatLng> {
    let (lat, lng) = (record.latitude?, record.longitude?);
    if lat == 0.0 || lng == 0.0 {
        return None;
    }
    let point = LatLng::new(lat, lng);
    point.is_valid().then_some(point)
}

/// Builds a map entity, or `None` when the record has neither a usable
/// position nor a usable boundary.
pub fn to_entity(record: &HabitatRecord, style: &EntityStyle) -> Option<MapEntity> {
    let polygon = record.polygon.as_deref().and_then(normalize);
    let position = explicit_position(record).or_else(|| polygon.as_ref().map(|p| p.first()))?;

    Some(MapEntity {
        id: record.id.clone(),
        name: record.display_name(),
        position,
        polygon,
        color: StatusColor::from_status(record.protection_status),
        opacity: style.opacity(record.verified),
        metadata: EntityMetadata::from_record(record),
    })
}

/// Result of mapping a whole page of records.
#[derive(Debug, Clone, Default)]
pub struct EntityBatch {
    pub entities: Vec<MapEntity>,
    /// Records excluded because they could not be placed on the map.
    pub dropped: usize,
}

/// Maps every record, silently excluding unrenderable ones.
pub fn to_entities(records: &[HabitatRecord], style: &EntityStyle) -> EntityBatch {
    let entities: Vec<MapEntity> = records
        .iter()
        .filter_map(|record| to_entity(record, style))
        .collect();
    let dropped = records.len() - entities.len();
    if dropped > 0 {
        log::warn!("{} habitat record(s) have no position or boundary", dropped);
    }
    EntityBatch { entities, dropped }
}
