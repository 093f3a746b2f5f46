//! Habitat records and their map representation.

pub mod entity;
pub mod record;

pub use entity::{to_entities, to_entity, EntityBatch, EntityMetadata, EntityStyle, MapEntity, StatusColor};
pub use record::{display_status, HabitatId, HabitatRecord, ProtectionStatus};
