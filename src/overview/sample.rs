//! In-memory habitat source.
//!
//! Serves a fixed set of records through the same source interface as the
//! HTTP client. Used on native builds and when no API is configured. Only
//! the view bbox and the entry limit are honored.

use super::query::{HabitatPage, HabitatQuery, Pagination, QueryError};
use super::source::HabitatSource;
use crate::geo::RawPoint;
use crate::habitat::{to_entity, EntityStyle, HabitatRecord, ProtectionStatus};

#[derive(Debug, Clone, Default)]
pub struct SampleSource {
    records: Vec<HabitatRecord>,
}

struct Sample<'a> {
    id: &'a str,
    position: Option<(f64, f64)>,
    boundary: &'a [(f64, f64)],
    habitat_type: &'a str,
    family: &'a str,
    status: Option<ProtectionStatus>,
    free_text: &'a str,
    verified: bool,
    municipality: &'a str,
    location: &'a str,
    recorder: &'a str,
    organization: &'a str,
    elevation: f64,
}

impl Sample<'_> {
    fn into_record(self) -> HabitatRecord {
        let mut record = HabitatRecord::new(self.id);
        if let Some((lat, lng)) = self.position {
            record.latitude = Some(lat);
            record.longitude = Some(lng);
        }
        if !self.boundary.is_empty() {
            record.polygon = Some(
                self.boundary
                    .iter()
                    .map(|&(a, b)| RawPoint::Pair(a, b))
                    .collect(),
            );
        }
        record.habitat_type = Some(self.habitat_type.to_string());
        if self.verified {
            record.verified_habitat_type = Some(self.habitat_type.to_string());
        }
        record.habitat_family = Some(self.family.to_string());
        record.protection_status = self.status;
        record.status = Some(self.free_text.to_string());
        record.verified = self.verified;
        record.municipality = Some(self.municipality.to_string());
        record.location_name = Some(self.location.to_string());
        record.recorded_by = Some(self.recorder.to_string());
        record.organization = Some(self.organization.to_string());
        record.elevation = Some(self.elevation);
        record
    }
}

impl SampleSource {
    pub fn new(records: Vec<HabitatRecord>) -> Self {
        Self { records }
    }

    /// Ten plots between Brixen and the Kalterer See.
    pub fn with_dummy_data() -> Self {
        let samples = vec![
            Sample {
                id: "hab-001",
                position: Some((46.4983, 11.3548)),
                boundary: &[
                    (46.4978, 11.3541),
                    (46.4979, 11.3556),
                    (46.4989, 11.3558),
                    (46.4990, 11.3543),
                ],
                habitat_type: "Trockenrasen",
                family: "Grasland",
                status: Some(ProtectionStatus::Red),
                free_text: "Rote Liste",
                verified: true,
                municipality: "Bozen",
                location: "Gp. 1021/3",
                recorder: "A. Huber",
                organization: "Naturmuseum Südtirol",
                elevation: 262.0,
            },
            // Boundary delivered as (lng, lat)
            Sample {
                id: "hab-002",
                position: None,
                boundary: &[
                    (11.3302, 46.5102),
                    (11.3318, 46.5104),
                    (11.3321, 46.5093),
                    (11.3305, 46.5090),
                ],
                habitat_type: "Flachmoor",
                family: "Moore",
                status: Some(ProtectionStatus::Yellow),
                free_text: "gefährdet",
                verified: false,
                municipality: "Bozen",
                location: "Guntschna",
                recorder: "M. Pichler",
                organization: "Amt für Natur",
                elevation: 410.0,
            },
            Sample {
                id: "hab-003",
                position: Some((46.6712, 11.1593)),
                boundary: &[
                    (46.6705, 11.1584),
                    (46.6707, 11.1602),
                    (46.6719, 11.1604),
                    (46.6718, 11.1586),
                    (46.6705, 11.1584),
                ],
                habitat_type: "Kastanienhain",
                family: "Wälder",
                status: Some(ProtectionStatus::Green),
                free_text: "geschützt",
                verified: true,
                municipality: "Meran",
                location: "Tappeinerweg",
                recorder: "A. Huber",
                organization: "Naturmuseum Südtirol",
                elevation: 380.0,
            },
            Sample {
                id: "hab-004",
                position: Some((46.6845, 11.1720)),
                boundary: &[],
                habitat_type: "Fettwiese",
                family: "Grasland",
                status: Some(ProtectionStatus::Green),
                free_text: "not protected",
                verified: false,
                municipality: "Meran",
                location: "Schenna Süd",
                recorder: "L. Gruber",
                organization: "Amt für Natur",
                elevation: 520.0,
            },
            Sample {
                id: "hab-005",
                position: Some((46.5420, 11.5612)),
                boundary: &[
                    (46.5414, 11.5601),
                    (46.5416, 11.5623),
                    (46.5427, 11.5625),
                    (46.5426, 11.5603),
                ],
                habitat_type: "Bergmähwiese",
                family: "Grasland",
                status: Some(ProtectionStatus::Yellow),
                free_text: "endangered",
                verified: true,
                municipality: "Kastelruth",
                location: "Seiser Alm",
                recorder: "M. Pichler",
                organization: "Naturmuseum Südtirol",
                elevation: 1850.0,
            },
            // Not yet assessed
            Sample {
                id: "hab-006",
                position: Some((46.4521, 11.2786)),
                boundary: &[],
                habitat_type: "Auwald",
                family: "Wälder",
                status: None,
                free_text: "Rote Liste 2",
                verified: false,
                municipality: "Eppan",
                location: "Montiggler Wald",
                recorder: "L. Gruber",
                organization: "Amt für Natur",
                elevation: 495.0,
            },
            Sample {
                id: "hab-007",
                position: Some((46.6290, 11.1480)),
                boundary: &[
                    (46.6284, 11.1471),
                    (46.6285, 11.1490),
                    (46.6296, 11.1489),
                ],
                habitat_type: "Felsflur",
                family: "Fels",
                status: Some(ProtectionStatus::Red),
                free_text: "red list",
                verified: true,
                municipality: "Lana",
                location: "Brandis",
                recorder: "A. Huber",
                organization: "Naturmuseum Südtirol",
                elevation: 640.0,
            },
            // Projected coordinates, no usable position
            Sample {
                id: "hab-008",
                position: Some((0.0, 0.0)),
                boundary: &[(680000.0, 5150000.0), (680100.0, 5150000.0), (680100.0, 5150100.0)],
                habitat_type: "Schilfröhricht",
                family: "Moore",
                status: Some(ProtectionStatus::Yellow),
                free_text: "protected",
                verified: false,
                municipality: "Kaltern",
                location: "Kalterer See",
                recorder: "M. Pichler",
                organization: "Amt für Natur",
                elevation: 215.0,
            },
            Sample {
                id: "hab-009",
                position: Some((46.3905, 11.2640)),
                boundary: &[
                    (46.3899, 11.2631),
                    (46.3900, 11.2650),
                    (46.3911, 11.2649),
                    (46.3910, 11.2630),
                ],
                habitat_type: "Schilfröhricht",
                family: "Moore",
                status: Some(ProtectionStatus::Red),
                free_text: "Rote Liste",
                verified: true,
                municipality: "Kaltern",
                location: "Kalterer See Nord",
                recorder: "L. Gruber",
                organization: "Naturmuseum Südtirol",
                elevation: 216.0,
            },
            Sample {
                id: "hab-010",
                position: Some((46.7180, 11.6560)),
                boundary: &[],
                habitat_type: "Lärchenwiese",
                family: "Grasland",
                status: Some(ProtectionStatus::Green),
                free_text: "",
                verified: true,
                municipality: "Brixen",
                location: "Plose",
                recorder: "A. Huber",
                organization: "Amt für Natur",
                elevation: 1620.0,
            },
        ];

        Self::new(samples.into_iter().map(Sample::into_record).collect())
    }

    /// Whether the record's resolved position falls inside the query bbox.
    fn in_bbox(record: &HabitatRecord, query: &HabitatQuery) -> bool {
        match query.filters.bbox {
            Some(bbox) => to_entity(record, &EntityStyle::default())
                .is_some_and(|entity| bbox.contains(entity.position)),
            None => true,
        }
    }

    /// Returns the first `limit` records inside the query bbox. Every other
    /// filter is left to the API.
    pub fn query(&self, query: &HabitatQuery) -> HabitatPage {
        let matching: Vec<&HabitatRecord> = self
            .records
            .iter()
            .filter(|r| Self::in_bbox(r, query))
            .collect();

        let total = matching.len();
        let limit = query.limit.max(1);
        let entries: Vec<HabitatRecord> = matching.into_iter().take(limit).cloned().collect();

        HabitatPage {
            entries,
            pagination: Pagination {
                page: 1,
                limit: limit as u32,
                total: total as u64,
                total_pages: total.div_ceil(limit) as u32,
            },
            filter_options: None,
            skipped: 0,
        }
    }
}

impl HabitatSource for SampleSource {
    async fn fetch(&self, query: HabitatQuery) -> Result<HabitatPage, QueryError> {
        Ok(self.query(&query))
    }

    fn describe(&self) -> String {
        format!("Sample data ({} habitats)", self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::BoundingBox;
    use crate::habitat::to_entities;
    use crate::overview::HabitatFilters;

    fn run(filters: HabitatFilters, limit: usize) -> HabitatPage {
        SampleSource::with_dummy_data().query(&HabitatQuery::for_map(&filters, limit))
    }

    #[test]
    fn test_unfiltered_returns_everything() {
        let page = run(HabitatFilters::default(), 500);
        assert_eq!(page.entries.len(), 10);
        assert_eq!(page.pagination.total, 10);
        assert_eq!(page.pagination.total_pages, 1);
        assert!(page.filter_options.is_none());
    }

    #[test]
    fn test_sample_data_has_unmappable_records() {
        let page = run(HabitatFilters::default(), 500);
        let batch = to_entities(&page.entries, &EntityStyle::default());
        assert_eq!(batch.dropped, 1);
        assert!(batch.entities.iter().any(|e| e.id.as_str() == "hab-002"));
    }

    #[test]
    fn test_other_filters_left_to_api() {
        let page = run(
            HabitatFilters {
                municipality: vec!["Meran".into()],
                search: "kalterer".into(),
                ..Default::default()
            },
            500,
        );
        assert_eq!(page.entries.len(), 10);
    }

    #[test]
    fn test_bbox_filter() {
        let page = run(
            HabitatFilters {
                bbox: Some(BoundingBox::new(11.30, 46.45, 11.40, 46.55)),
                ..Default::default()
            },
            500,
        );
        let ids: Vec<&str> = page.entries.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["hab-001", "hab-002"]);
        assert_eq!(page.pagination.total, 2);
    }

    #[test]
    fn test_limit_truncates() {
        let page = run(HabitatFilters::default(), 3);
        let ids: Vec<&str> = page.entries.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["hab-001", "hab-002", "hab-003"]);
        assert_eq!(page.pagination.total, 10);
        assert_eq!(page.pagination.total_pages, 4);
    }
}
