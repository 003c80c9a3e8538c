use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{Result, StateError};
use crate::properties::{BlockProperties, BlockProperty, PropertyKind};
use crate::state::{BlockId, MutableBlockState};

const EMBEDDED_CATALOG: &str = include_str!("../resources/blocks.toml");

// Top-level catalog file
#[derive(Deserialize, Debug)]
pub struct CatalogConfig {
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BlockDef {
    pub id: BlockId,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyDef {
    Boolean {
        name: String,
        #[serde(default)]
        persistence_name: Option<String>,
    },
    Integer {
        name: String,
        min: i64,
        max: i64,
        #[serde(default)]
        persistence_name: Option<String>,
    },
    Enum {
        name: String,
        values: Vec<String>,
        #[serde(default)]
        persistence_name: Option<String>,
    },
    LegacyData {
        bits: u32,
    },
}

impl PropertyDef {
    fn compile(self) -> BlockProperty {
        let (name, kind, persistence) = match self {
            PropertyDef::Boolean {
                name,
                persistence_name,
            } => (name, PropertyKind::Boolean, persistence_name),
            PropertyDef::Integer {
                name,
                min,
                max,
                persistence_name,
            } => (name, PropertyKind::Integer { min, max }, persistence_name),
            PropertyDef::Enum {
                name,
                values,
                persistence_name,
            } => (name, PropertyKind::Enum { values }, persistence_name),
            PropertyDef::LegacyData { bits } => return BlockProperty::legacy(bits),
        };
        let prop = BlockProperty::new(name, kind);
        match persistence {
            Some(p) => prop.with_persistence_name(p),
            None => prop,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CatalogEntry {
    pub id: BlockId,
    pub name: String,
    pub display_name: Option<String>,
    pub properties: Arc<BlockProperties>,
}

/// Property layouts declared by block implementations, keyed by numeric id.
#[derive(Clone, Debug, Default)]
pub struct BlockCatalog {
    entries: HashMap<BlockId, CatalogEntry>,
}

impl BlockCatalog {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The catalog shipped with this crate.
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(EMBEDDED_CATALOG)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| StateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let cfg: CatalogConfig = toml::from_str(toml_str)?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: CatalogConfig) -> Result<Self> {
        let mut catalog = BlockCatalog::new();
        for def in cfg.blocks {
            let properties = def.properties.into_iter().map(PropertyDef::compile).collect();
            catalog.insert(CatalogEntry {
                id: def.id,
                name: def.name.to_lowercase(),
                display_name: def.display_name,
                properties: Arc::new(BlockProperties::new(properties)?),
            })?;
        }
        log::debug!(target: "blockstate", "block catalog loaded with {} block(s)", catalog.len());
        Ok(catalog)
    }

    pub fn insert(&mut self, entry: CatalogEntry) -> Result<()> {
        if self.entries.contains_key(&entry.id) {
            return Err(StateError::DuplicateBlock(entry.id));
        }
        self.entries.insert(entry.id, entry);
        Ok(())
    }

    pub fn get(&self, id: BlockId) -> Option<&CatalogEntry> {
        self.entries.get(&id)
    }

    /// Layout for `id`, or the shared unknown layout when nobody declared it.
    pub fn properties(&self, id: BlockId) -> Arc<BlockProperties> {
        match self.entries.get(&id) {
            Some(e) => Arc::clone(&e.properties),
            None => BlockProperties::unknown(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn create_mutable_state(&self, id: BlockId) -> MutableBlockState {
        MutableBlockState::new(id, self.properties(id))
    }

    pub fn create_mutable_state_from_int(&self, id: BlockId, big_meta: i32) -> Result<MutableBlockState> {
        let mut state = self.create_mutable_state(id);
        state.set_data_storage_from_int(big_meta)?;
        Ok(state)
    }

    pub fn create_mutable_state_from_storage(&self, id: BlockId, storage: u64) -> Result<MutableBlockState> {
        let mut state = self.create_mutable_state(id);
        state.set_data_storage(storage)?;
        Ok(state)
    }

    pub fn create_mutable_state_from_values(
        &self,
        id: BlockId,
        values: &HashMap<String, String>,
    ) -> Result<MutableBlockState> {
        let mut state = self.create_mutable_state(id);
        state.set_properties(values)?;
        Ok(state)
    }
}
