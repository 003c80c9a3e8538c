//! Block states, property layouts, and the block catalog.
#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod natural;
pub mod properties;
pub mod state;

pub use catalog::{BlockCatalog, CatalogEntry};
pub use error::StateError;
pub use natural::human_cmp;
pub use properties::{BlockProperties, BlockProperty, LEGACY_PROPERTY_NAME, PropertyKind};
pub use state::{BlockId, BlockState, MutableBlockState, legacy_state_id, state_id};
