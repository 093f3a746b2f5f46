//! Active filter set for the overview map.

use crate::geo::BoundingBox;
use crate::habitat::ProtectionStatus;
use serde::{Deserialize, Serialize};

/// Verification filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verification {
    Verified,
    Unverified,
}

impl Verification {
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Verified => "true",
            Self::Unverified => "false",
        }
    }
}

/// Sort order understood by the query API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Municipality,
    Classification,
}

impl SortOrder {
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Newest => "createdAt:desc",
            Self::Oldest => "createdAt:asc",
            Self::Municipality => "municipality:asc",
            Self::Classification => "habitatType:asc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Newest => "Newest first",
            Self::Oldest => "Oldest first",
            Self::Municipality => "Municipality",
            Self::Classification => "Classification",
        }
    }

    pub fn all() -> &'static [SortOrder] {
        &[
            Self::Newest,
            Self::Oldest,
            Self::Municipality,
            Self::Classification,
        ]
    }
}

/// Filters applied to the overview query.
///
/// Multi-valued fields are unordered sets as far as the query is concerned;
/// [`stable_key`](Self::stable_key) ignores their order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HabitatFilters {
    pub search: String,
    pub municipality: Vec<String>,
    pub classification: Vec<String>,
    pub family: Vec<String>,
    pub protection_status: Vec<ProtectionStatus>,
    pub recorded_by: Vec<String>,
    pub organization: Vec<String>,
    pub verification: Option<Verification>,
    pub sort: SortOrder,
    pub bbox: Option<BoundingBox>,
}

/// Canonical form used only for computing the filter key.
#[derive(Serialize)]
struct CanonicalFilters<'a> {
    search: &'a str,
    municipality: Vec<&'a str>,
    classification: Vec<&'a str>,
    family: Vec<&'a str>,
    protection_status: Vec<ProtectionStatus>,
    recorded_by: Vec<&'a str>,
    organization: Vec<&'a str>,
    verification: Option<Verification>,
    sort: SortOrder,
    bbox: Option<String>,
}

fn canonical_set(values: &[String]) -> Vec<&str> {
    let mut set: Vec<&str> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();
    set.sort_unstable();
    set.dedup();
    set
}

impl HabitatFilters {
    /// Order-independent serialization of the filter set.
    ///
    /// Two filter sets with the same key produce the same query.
    pub fn stable_key(&self) -> String {
        let mut protection_status = self.protection_status.clone();
        protection_status.sort_unstable();
        protection_status.dedup();

        let canonical = CanonicalFilters {
            search: self.search.trim(),
            municipality: canonical_set(&self.municipality),
            classification: canonical_set(&self.classification),
            family: canonical_set(&self.family),
            protection_status,
            recorded_by: canonical_set(&self.recorded_by),
            organization: canonical_set(&self.organization),
            verification: self.verification,
            sort: self.sort,
            bbox: self.bbox.map(|b| b.to_param()),
        };

        serde_json::to_string(&canonical).unwrap_or_else(|e| {
            log::warn!("Failed to serialize filters: {}", e);
            String::new()
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Number of active filter criteria, for the panel badge.
    pub fn active_count(&self) -> usize {
        [
            !self.search.trim().is_empty(),
            !self.municipality.is_empty(),
            !self.classification.is_empty(),
            !self.family.is_empty(),
            !self.protection_status.is_empty(),
            !self.recorded_by.is_empty(),
            !self.organization.is_empty(),
            self.verification.is_some(),
            self.bbox.is_some(),
        ]
        .iter()
        .filter(|active| **active)
        .count()
    }

    /// Adds or removes a value from a multi-valued filter.
    pub fn toggle(values: &mut Vec<String>, value: &str) {
        if let Some(pos) = values.iter().position(|v| v == value) {
            values.remove(pos);
        } else {
            values.push(value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ignores_order_and_whitespace() {
        let a = HabitatFilters {
            search: "moor ".into(),
            municipality: vec!["Bozen".into(), "Meran".into()],
            protection_status: vec![ProtectionStatus::Green, ProtectionStatus::Red],
            ..Default::default()
        };
        let b = HabitatFilters {
            search: " moor".into(),
            municipality: vec!["Meran".into(), "Bozen".into(), "Meran".into()],
            protection_status: vec![ProtectionStatus::Red, ProtectionStatus::Green],
            ..Default::default()
        };
        assert_eq!(a.stable_key(), b.stable_key());
    }

    #[test]
    fn test_key_changes_with_filters() {
        let base = HabitatFilters::default();
        let mut verified = base.clone();
        verified.verification = Some(Verification::Verified);
        assert_ne!(base.stable_key(), verified.stable_key());

        let mut sorted = base.clone();
        sorted.sort = SortOrder::Municipality;
        assert_ne!(base.stable_key(), sorted.stable_key());

        let mut boxed = base.clone();
        boxed.bbox = Some(BoundingBox::new(11.0, 46.0, 12.0, 47.0));
        assert_ne!(base.stable_key(), boxed.stable_key());
    }

    #[test]
    fn test_toggle_and_count() {
        let mut filters = HabitatFilters::default();
        assert!(filters.is_empty());
        HabitatFilters::toggle(&mut filters.municipality, "Bozen");
        filters.verification = Some(Verification::Unverified);
        assert_eq!(filters.active_count(), 2);
        HabitatFilters::toggle(&mut filters.municipality, "Bozen");
        assert_eq!(filters.active_count(), 1);
    }
}
