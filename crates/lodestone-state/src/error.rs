use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("unknown property `{0}`")]
    UnknownProperty(String),

    #[error("property `{0}` declared twice")]
    DuplicateProperty(String),

    #[error("invalid value `{value}` for property `{property}`")]
    InvalidValue { property: String, value: String },

    #[error("raw value {raw} out of range for property `{property}`")]
    InvalidRawValue { property: String, raw: u64 },

    #[error("storage {storage:#x} does not fit a {bits}-bit layout")]
    StorageOverflow { storage: u64, bits: u32 },

    #[error("property `{property}` has an empty range {min}..={max}")]
    InvalidRange { property: String, min: i64, max: i64 },

    #[error("property layout needs {bits} bits, more than a state can hold")]
    LayoutTooWide { bits: u32 },

    #[error("block id {0} is declared twice in the catalog")]
    DuplicateBlock(u32),

    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid catalog: {0}")]
    Catalog(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, StateError>;
