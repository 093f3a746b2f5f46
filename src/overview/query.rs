//! Query API request and response types.

use super::filters::HabitatFilters;
use crate::habitat::HabitatRecord;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Hard cap on entities requested per overview load.
pub const MAX_ENTITIES_PER_LOAD: usize = 500;

/// Path of the habitat listing below the API base URL.
const HABITATS_PATH: &str = "habitats";

/// Errors from loading a page of habitats.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("HTTP loading is only available in the browser")]
    Unsupported,
}

impl From<serde_json::Error> for QueryError {
    fn from(e: serde_json::Error) -> Self {
        QueryError::Decode(e.to_string())
    }
}

/// A request for one page of habitats.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitatQuery {
    pub page: u32,
    pub limit: usize,
    /// Ask the API for the reduced map projection of each record.
    pub map_projection: bool,
    pub filters: HabitatFilters,
}

impl HabitatQuery {
    /// The single-page query the overview map issues.
    pub fn for_map(filters: &HabitatFilters, max_entities: usize) -> Self {
        Self {
            page: 1,
            limit: max_entities.clamp(1, MAX_ENTITIES_PER_LOAD),
            map_projection: true,
            filters: filters.clone(),
        }
    }

    /// URL-encoded query string. Multi-valued filters repeat their key.
    pub fn to_query_string(&self) -> String {
        let f = &self.filters;
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("page", &self.page.to_string())
            .append_pair("limit", &self.limit.to_string())
            .append_pair("sort", f.sort.as_param());

        if self.map_projection {
            query.append_pair("map", "true");
        }
        let search = f.search.trim();
        if !search.is_empty() {
            query.append_pair("search", search);
        }

        let multi: [(&str, &[String]); 5] = [
            ("municipality", &f.municipality),
            ("habitatType", &f.classification),
            ("habitatFamily", &f.family),
            ("recordedBy", &f.recorded_by),
            ("organization", &f.organization),
        ];
        for (key, values) in multi {
            for value in values {
                query.append_pair(key, value);
            }
        }
        for status in &f.protection_status {
            query.append_pair("protectionStatus", status.as_param());
        }
        if let Some(verification) = f.verification {
            query.append_pair("verified", verification.as_param());
        }
        if let Some(bbox) = f.bbox {
            query.append_pair("bbox", &bbox.to_param());
        }

        query.finish()
    }

    /// Full request URL below `base`.
    pub fn url(&self, base: &str) -> Result<Url, QueryError> {
        let base = format!("{}/", base.trim_end_matches('/'));
        let mut url = Url::parse(&base)?.join(HABITATS_PATH)?;
        url.set_query(Some(&self.to_query_string()));
        Ok(url)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

/// Values available for each categorical filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterOptions {
    pub municipalities: Vec<String>,
    pub habitat_types: Vec<String>,
    pub habitat_families: Vec<String>,
    pub recorders: Vec<String>,
    pub organizations: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPage {
    entries: Vec<Value>,
    #[serde(default)]
    pagination: Pagination,
    #[serde(default)]
    filter_options: Option<FilterOptions>,
}

/// One page of query results.
#[derive(Debug, Clone, Default)]
pub struct HabitatPage {
    pub entries: Vec<HabitatRecord>,
    pub pagination: Pagination,
    pub filter_options: Option<FilterOptions>,
    /// Entries that could not be decoded at all.
    pub skipped: usize,
}

impl HabitatPage {
    /// Decodes a response body. A malformed entry is skipped without
    /// failing the page.
    pub fn from_json(value: Value) -> Result<Self, QueryError> {
        let raw: RawPage = serde_json::from_value(value)?;
        let total = raw.entries.len();

        let entries: Vec<HabitatRecord> = raw
            .entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Skipping undecodable habitat entry: {}", e);
                    None
                }
            })
            .collect();

        Ok(Self {
            skipped: total - entries.len(),
            entries,
            pagination: raw.pagination,
            filter_options: raw.filter_options,
        })
    }

    pub fn parse(body: &str) -> Result<Self, QueryError> {
        Self::from_json(serde_json::from_str(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habitat::ProtectionStatus;
    use crate::overview::filters::Verification;

    #[test]
    fn test_map_query_is_capped() {
        let query = HabitatQuery::for_map(&HabitatFilters::default(), 10_000);
        assert_eq!(query.limit, MAX_ENTITIES_PER_LOAD);
        assert_eq!(query.page, 1);
        assert!(query.map_projection);
    }

    #[test]
    fn test_query_string() {
        let filters = HabitatFilters {
            search: "Trocken rasen".into(),
            municipality: vec!["Bozen".into(), "Meran".into()],
            protection_status: vec![ProtectionStatus::Red],
            verification: Some(Verification::Verified),
            ..Default::default()
        };
        let qs = HabitatQuery::for_map(&filters, 500).to_query_string();
        assert!(qs.starts_with("page=1&limit=500&sort=createdAt%3Adesc&map=true"));
        assert!(qs.contains("search=Trocken+rasen"));
        assert!(qs.contains("municipality=Bozen&municipality=Meran"));
        assert!(qs.contains("protectionStatus=red"));
        assert!(qs.contains("verified=true"));
    }

    #[test]
    fn test_url_joins_base() {
        let query = HabitatQuery::for_map(&HabitatFilters::default(), 50);
        let url = query.url("https://example.org/api/").unwrap();
        assert_eq!(url.path(), "/api/habitats");
        assert!(url.query().unwrap_or_default().contains("limit=50"));
        assert!(query.url("not a url").is_err());
    }

    #[test]
    fn test_page_skips_bad_entries() {
        let body = r#"{
            "entries": [
                {"id": "a", "latitude": 46.5, "longitude": 11.3},
                {"latitude": 46.5},
                {"id": "c", "polygon": [[46.5, 11.3], [46.5, 11.4], [46.6, 11.4]]}
            ],
            "pagination": {"page": 1, "limit": 500, "total": 3, "totalPages": 1},
            "filterOptions": {"municipalities": ["Bozen"]}
        }"#;
        let page = HabitatPage::parse(body).unwrap();
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.skipped, 1);
        assert_eq!(page.pagination.total, 3);
        assert_eq!(
            page.filter_options.map(|o| o.municipalities),
            Some(vec!["Bozen".to_string()])
        );
    }

    #[test]
    fn test_page_without_entries_is_error() {
        assert!(matches!(
            HabitatPage::parse(r#"{"items": []}"#),
            Err(QueryError::Decode(_))
        ));
    }
}
