//! Overview map of documented habitats: filters, the query client and the
//! renderer that turns query results into map entities.

pub mod filters;
pub mod http;
pub mod loader;
pub mod query;
pub mod renderer;
pub mod sample;
pub mod source;

pub use filters::{HabitatFilters, SortOrder, Verification};
pub use http::HttpSource;
pub use loader::{LoadChannel, LoadResult, LoadTicket};
pub use query::{
    FilterOptions, HabitatPage, HabitatQuery, Pagination, QueryError, MAX_ENTITIES_PER_LOAD,
};
pub use renderer::{ClickOutcome, DisplayMode, LoadSummary, OverviewRenderer, RenderItem, Viewer};
pub use sample::SampleSource;
pub use source::{ConfiguredSource, HabitatSource};
