use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RegistryError, Result};

pub const DEFAULT_PLACEHOLDER_NAME: &str = "minecraft:info_update";
pub const DEFAULT_PLACEHOLDER_BLOCK_ID: u32 = 248;
pub const DEFAULT_PRUNE_THREAD: &str = "lodestone-prune";

/// Registry settings. Every field has a default, so an empty document is valid.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Palette entry whose registration stands in for unresolvable states.
    pub placeholder_name: String,
    pub placeholder_block_id: u32,
    /// Block catalog TOML; the embedded catalog when unset.
    pub catalog: Option<PathBuf>,
    pub datasets: DatasetPaths,
    pub pruning: PruneConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            placeholder_name: DEFAULT_PLACEHOLDER_NAME.to_string(),
            placeholder_block_id: DEFAULT_PLACEHOLDER_BLOCK_ID,
            catalog: None,
            datasets: DatasetPaths::default(),
            pruning: PruneConfig::default(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DatasetPaths {
    pub palette: Option<PathBuf>,
    pub overrides: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PruneConfig {
    pub enabled: bool,
    pub thread_name: String,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            thread_name: DEFAULT_PRUNE_THREAD.to_string(),
        }
    }
}

impl RegistryConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = RegistryConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, RegistryConfig::default());
        assert!(cfg.pruning.enabled);
        assert_eq!(cfg.placeholder_block_id, 248);
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let cfg = RegistryConfig::from_toml_str(
            r#"
            placeholder_name = "minecraft:unknown"

            [datasets]
            palette = "data/palette.dat"

            [pruning]
            enabled = false
        "#,
        )
        .unwrap();
        assert_eq!(cfg.placeholder_name, "minecraft:unknown");
        assert_eq!(cfg.placeholder_block_id, DEFAULT_PLACEHOLDER_BLOCK_ID);
        assert_eq!(cfg.datasets.palette, Some(PathBuf::from("data/palette.dat")));
        assert_eq!(cfg.datasets.overrides, None);
        assert!(!cfg.pruning.enabled);
        assert_eq!(cfg.pruning.thread_name, DEFAULT_PRUNE_THREAD);
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(RegistryConfig::from_toml_str("placeholder_block_id = \"x\"").is_err());
    }
}
