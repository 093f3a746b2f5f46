//! Map layer for documenting habitats.
//!
//! Two surfaces share the primitives in [`geo`] and [`habitat`]:
//! - [`editor`]: freehand capture and vertex editing of a habitat boundary
//! - [`overview`]: filtered display of documented habitats as markers or
//!   polygons
//!
//! Both talk to the map through the [`editor::MapWidget`] trait, so they can
//! run against the egui canvas of the binary or a recording test double.

pub mod callbacks;
pub mod editor;
pub mod geo;
pub mod habitat;
pub mod overview;
pub mod settings;
