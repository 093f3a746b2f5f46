//! Habitat records as delivered by the query API.
//!
//! Records are read-only to the map. Field spellings follow the API's
//! camelCase JSON; numeric fields tolerate numbers serialized as strings.

use crate::geo::coords::number_like;
use crate::geo::RawPoint;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Habitat record identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitatId(pub String);

impl HabitatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HabitatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HabitatId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Protection status computed upstream. Drives map color and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtectionStatus {
    Red,
    Yellow,
    Green,
}

impl ProtectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Yellow => "Yellow",
            Self::Green => "Green",
        }
    }

    /// Wire value used by the query API.
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
        }
    }

    pub fn all() -> &'static [ProtectionStatus] {
        &[Self::Red, Self::Yellow, Self::Green]
    }
}

/// A documented habitat plot.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitatRecord {
    pub id: HabitatId,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_points")]
    pub polygon: Option<Vec<RawPoint>>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub habitat_type: Option<String>,
    #[serde(default)]
    pub verified_habitat_type: Option<String>,
    #[serde(default)]
    pub habitat_family: Option<String>,
    #[serde(default)]
    pub verified_habitat_family: Option<String>,
    #[serde(default, deserialize_with = "lenient_status")]
    pub protection_status: Option<ProtectionStatus>,
    /// Free-text status as typed by recorders. Display only.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub municipality: Option<String>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub recorded_by: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub elevation: Option<f64>,
}

impl HabitatRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: HabitatId::new(id),
            ..Default::default()
        }
    }

    /// Classification label, verified value first.
    pub fn classification(&self) -> Option<&str> {
        prefer_verified(&self.verified_habitat_type, &self.habitat_type)
    }

    /// Family/grouping label, verified value first.
    pub fn family(&self) -> Option<&str> {
        prefer_verified(&self.verified_habitat_family, &self.habitat_family)
    }

    /// Display name built from classification and family.
    pub fn display_name(&self) -> String {
        match (self.classification(), self.family()) {
            (Some(label), Some(family)) if label != family => format!("{} ({})", label, family),
            (Some(label), _) => label.to_string(),
            (None, Some(family)) => family.to_string(),
            (None, None) => "Unclassified habitat".to_string(),
        }
    }
}

fn prefer_verified<'a>(verified: &'a Option<String>, raw: &'a Option<String>) -> Option<&'a str> {
    non_blank(verified).or_else(|| non_blank(raw))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Human-readable form of a free-text status string.
///
/// Only used for tooltips. Map color never looks at this text, see
/// [`ProtectionStatus`].
pub fn display_status(text: &str) -> String {
    let normalized = text.trim().to_lowercase();
    if normalized.is_empty() {
        return "Unknown".to_string();
    }

    if normalized.contains("red list") || normalized.contains("rote liste") {
        "Red list".to_string()
    } else if normalized.contains("endangered") || normalized.contains("gefährdet") {
        "Endangered".to_string()
    } else if normalized.contains("not protected") || normalized.contains("nicht geschützt") {
        "Not protected".to_string()
    } else if normalized.contains("protected") || normalized.contains("geschützt") {
        "Protected".to_string()
    } else {
        let mut chars = normalized.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => "Unknown".to_string(),
        }
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_like))
}

fn lenient_points<'de, D>(deserializer: D) -> Result<Option<Vec<RawPoint>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_array)
        .map(|items| items.iter().map(RawPoint::from_value).collect()))
}

fn lenient_status<'de, D>(deserializer: D) -> Result<Option<ProtectionStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let text = value.as_ref().and_then(Value::as_str);
    Ok(match text.map(|s| s.trim().to_lowercase()) {
        Some(s) if s == "red" => Some(ProtectionStatus::Red),
        Some(s) if s == "yellow" => Some(ProtectionStatus::Yellow),
        Some(s) if s == "green" => Some(ProtectionStatus::Green),
        Some(other) => {
            log::warn!("Ignoring unknown protection status {:?}", other);
            None
        }
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_api_record() {
        let json = r#"{
            "id": "h-17",
            "latitude": "46.71",
            "longitude": 11.32,
            "polygon": [[46.7, 11.3], {"lat": 46.71, "lng": 11.31}, [11.32, 46.72]],
            "verified": true,
            "habitatType": "Magerwiese",
            "verifiedHabitatType": "Trockenrasen",
            "habitatFamily": "Grasland",
            "protectionStatus": "RED",
            "status": "rote Liste",
            "municipality": "Bozen",
            "elevation": 1240
        }"#;
        let record: HabitatRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id.as_str(), "h-17");
        assert_eq!(record.latitude, Some(46.71));
        assert_eq!(record.polygon.as_ref().map(Vec::len), Some(3));
        assert_eq!(record.protection_status, Some(ProtectionStatus::Red));
        assert_eq!(record.classification(), Some("Trockenrasen"));
        assert_eq!(record.display_name(), "Trockenrasen (Grasland)");
    }

    #[test]
    fn test_unknown_status_is_absent() {
        let record: HabitatRecord =
            serde_json::from_str(r#"{"id": "x", "protectionStatus": "purple"}"#).unwrap();
        assert_eq!(record.protection_status, None);
        let record: HabitatRecord =
            serde_json::from_str(r#"{"id": "x", "protectionStatus": null}"#).unwrap();
        assert_eq!(record.protection_status, None);
    }

    #[test]
    fn test_malformed_polygon_is_absent() {
        let record: HabitatRecord =
            serde_json::from_str(r#"{"id": "x", "polygon": "POLYGON((1 2, 3 4))"}"#).unwrap();
        assert!(record.polygon.is_none());
    }

    #[test]
    fn test_blank_verified_falls_back_to_raw() {
        let mut record = HabitatRecord::new("a");
        record.habitat_type = Some("Moor".into());
        record.verified_habitat_type = Some("  ".into());
        assert_eq!(record.classification(), Some("Moor"));
        assert_eq!(record.display_name(), "Moor");
        assert_eq!(HabitatRecord::new("b").display_name(), "Unclassified habitat");
    }

    #[test]
    fn test_display_status() {
        assert_eq!(display_status("Rote Liste 2"), "Red list");
        assert_eq!(display_status("not protected"), "Not protected");
        assert_eq!(display_status("geschützt"), "Protected");
        assert_eq!(display_status("seltsam"), "Seltsam");
        assert_eq!(display_status("  "), "Unknown");
    }
}
