//! Query API client over the browser's fetch.

use super::query::{HabitatPage, HabitatQuery, QueryError};
use super::source::HabitatSource;

#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
}

impl HttpSource {
    /// Whether this platform can issue requests.
    pub const SUPPORTED: bool = cfg!(target_arch = "wasm32");

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl HabitatSource for HttpSource {
    async fn fetch(&self, query: HabitatQuery) -> Result<HabitatPage, QueryError> {
        let url = query.url(&self.base_url)?;
        log::debug!("GET {}", url);
        fetch_page(url.as_str()).await
    }

    fn describe(&self) -> String {
        format!("API {}", self.base_url)
    }
}

#[cfg(target_arch = "wasm32")]
async fn fetch_page(url: &str) -> Result<HabitatPage, QueryError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    let js_err = |e: wasm_bindgen::JsValue| QueryError::Network(format!("{:?}", e));

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(url, &opts).map_err(js_err)?;
    request
        .headers()
        .set("Accept", "application/json")
        .map_err(js_err)?;

    let window =
        web_sys::window().ok_or_else(|| QueryError::Network("no window".to_string()))?;
    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_err)?;
    let response: Response = response.dyn_into().map_err(js_err)?;

    if !response.ok() {
        return Err(QueryError::Status(response.status()));
    }

    let body = JsFuture::from(response.json().map_err(js_err)?)
        .await
        .map_err(js_err)?;
    let value: serde_json::Value = serde_wasm_bindgen::from_value(body)
        .map_err(|e| QueryError::Decode(e.to_string()))?;

    HabitatPage::from_json(value)
}

#[cfg(not(target_arch = "wasm32"))]
async fn fetch_page(_url: &str) -> Result<HabitatPage, QueryError> {
    Err(QueryError::Unsupported)
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::overview::filters::HabitatFilters;

    #[test]
    fn test_native_fetch_is_unsupported() {
        let source = HttpSource::new("https://example.org/api");
        let query = HabitatQuery::for_map(&HabitatFilters::default(), 10);
        let result = pollster::block_on(source.fetch(query));
        assert_eq!(result.unwrap_err(), QueryError::Unsupported);
    }

    #[test]
    fn test_bad_base_url_fails_before_request() {
        let source = HttpSource::new("::");
        let query = HabitatQuery::for_map(&HabitatFilters::default(), 10);
        let result = pollster::block_on(source.fetch(query));
        assert!(matches!(result, Err(QueryError::InvalidUrl(_))));
    }
}
