//! Block-state palette registry: runtime ids, legacy identities and the wire palette.
#![forbid(unsafe_code)]

pub mod blob;
pub mod config;
pub mod dataset;
pub mod error;
pub mod global;
pub mod index;
pub mod loader;
pub mod names;
pub mod prune;
pub mod registration;
pub mod registry;

pub use blob::PaletteBlob;
pub use config::{DatasetPaths, PruneConfig, RegistryConfig};
pub use dataset::{DatasetSources, LegacyIdentity};
pub use error::{BlobError, RegistryError};
pub use global::{global, initialize};
pub use registration::Registration;
pub use registry::{BlockStateRegistry, RegistryStats};
