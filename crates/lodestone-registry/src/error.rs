use std::io;
use std::path::PathBuf;

use lodestone_nbt::NbtError;
use lodestone_state::StateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {dataset} dataset: {source}")]
    Dataset {
        dataset: &'static str,
        #[source]
        source: NbtError,
    },

    #[error("malformed {dataset} dataset at entry {index}: {reason}")]
    MalformedDataset {
        dataset: &'static str,
        index: usize,
        reason: String,
    },

    #[error("placeholder `{0}` is missing from the palette")]
    MissingPlaceholder(String),

    #[error("failed to serialize the palette: {0}")]
    Serialize(#[source] NbtError),

    #[error("block id {id} is already named `{existing}`, cannot rename it to `{requested}`")]
    PersistenceNameConflict {
        id: u32,
        existing: String,
        requested: String,
    },

    #[error("`{key}` is already registered to runtime id {existing}, refusing runtime id {requested}")]
    ConflictingRegistration {
        key: String,
        existing: u32,
        requested: u32,
    },

    #[error("invalid registry config: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("failed to start the prune worker: {0}")]
    Worker(#[from] rayon::ThreadPoolBuildError),

    #[error("the global block state registry is already initialized")]
    AlreadyInitialized,
}

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlobError {
    #[error("copying {len} bytes at offset {offset} overflows a buffer of {capacity} bytes")]
    OutOfBounds {
        offset: usize,
        len: usize,
        capacity: usize,
    },
}
