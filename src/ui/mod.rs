//! UI modules for the Habitat Map application.
//!
//! The UI is split into distinct panels:
//! - Top bar: Title, habitat source, load status and errors
//! - Left panel: Filters, boundary capture results and legend
//! - Central canvas: The map with habitats and capture controls

pub mod colors;
pub mod map_canvas;
mod left_panel;
mod top_bar;

pub use left_panel::render_left_panel;
pub use top_bar::render_top_bar;
