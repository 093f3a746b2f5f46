//! Where overview pages come from.

use super::http::HttpSource;
use super::query::{HabitatPage, HabitatQuery, QueryError};
use super::sample::SampleSource;
use std::future::Future;

/// An asynchronous provider of habitat pages.
pub trait HabitatSource {
    fn fetch(&self, query: HabitatQuery) -> impl Future<Output = Result<HabitatPage, QueryError>>;

    /// Short description for the status bar.
    fn describe(&self) -> String;
}

/// The source the application was configured with.
#[derive(Debug, Clone)]
pub enum ConfiguredSource {
    Http(HttpSource),
    Sample(SampleSource),
}

impl ConfiguredSource {
    /// HTTP when an API base URL is configured and the platform can fetch,
    /// sample data otherwise.
    pub fn from_base_url(base_url: &str) -> Self {
        let base_url = base_url.trim();
        if base_url.is_empty() || !HttpSource::SUPPORTED {
            log::info!("Using built-in sample habitats");
            ConfiguredSource::Sample(SampleSource::with_dummy_data())
        } else {
            ConfiguredSource::Http(HttpSource::new(base_url))
        }
    }
}

impl HabitatSource for ConfiguredSource {
    async fn fetch(&self, query: HabitatQuery) -> Result<HabitatPage, QueryError> {
        match self {
            ConfiguredSource::Http(source) => source.fetch(query).await,
            ConfiguredSource::Sample(source) => source.fetch(query).await,
        }
    }

    fn describe(&self) -> String {
        match self {
            ConfiguredSource::Http(source) => source.describe(),
            ConfiguredSource::Sample(source) => source.describe(),
        }
    }
}
