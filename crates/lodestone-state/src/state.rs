use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::natural::sort_human;
use crate::properties::BlockProperties;

pub type BlockId = u32;

/// Legacy metadata is a 32-bit field; wider values go through `set_data_storage`.
pub const BIG_META_MASK: u64 = 0xFFFF_FFFF;

/// A block identity: numeric id plus packed property storage.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Debug, Serialize, Deserialize)]
pub struct BlockState {
    pub block_id: BlockId,
    pub storage: u64,
}

impl BlockState {
    pub const AIR: BlockState = BlockState {
        block_id: 0,
        storage: 0,
    };

    pub const fn of(block_id: BlockId) -> Self {
        Self {
            block_id,
            storage: 0,
        }
    }

    pub const fn with_meta(block_id: BlockId, meta: u64) -> Self {
        Self {
            block_id,
            storage: meta,
        }
    }

    /// Key of the numeric identity scheme: `"{id}:{storage}"`.
    pub fn legacy_key(&self) -> String {
        legacy_state_id(self.block_id, self.storage)
    }

    pub fn property_value(&self, properties: &BlockProperties, name: &str) -> Result<String> {
        properties.value_of(self.storage, name)
    }

    /// Canonical string key built from `name` and this state's property values.
    pub fn state_id(&self, name: &str, properties: &BlockProperties) -> Result<String> {
        properties.validate(self.storage)?;
        let entries = properties.persistence_entries(self.storage)?;
        Ok(state_id(name, entries))
    }
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block_id, self.storage)
    }
}

/// `name;k1=v1;k2=v2` with keys in human order.
pub fn state_id(name: &str, properties: impl IntoIterator<Item = (String, String)>) -> String {
    let mut props: Vec<(String, String)> = properties.into_iter().collect();
    sort_human(&mut props);
    let mut out = String::with_capacity(name.len() + props.len() * 16);
    out.push_str(name);
    for (k, v) in props {
        out.push(';');
        out.push_str(&k);
        out.push('=');
        out.push_str(&v);
    }
    out
}

pub fn legacy_state_id(block_id: BlockId, storage: u64) -> String {
    format!("{block_id}:{storage}")
}

/// Builder for a [`BlockState`] that validates against the block's layout.
#[derive(Clone, Debug)]
pub struct MutableBlockState {
    block_id: BlockId,
    storage: u64,
    properties: Arc<BlockProperties>,
}

impl MutableBlockState {
    pub fn new(block_id: BlockId, properties: Arc<BlockProperties>) -> Self {
        Self {
            block_id,
            storage: 0,
            properties,
        }
    }

    #[inline]
    pub fn block_id(&self) -> BlockId {
        self.block_id
    }

    #[inline]
    pub fn data_storage(&self) -> u64 {
        self.storage
    }

    pub fn properties(&self) -> &Arc<BlockProperties> {
        &self.properties
    }

    pub fn set_data_storage(&mut self, storage: u64) -> Result<&mut Self> {
        self.properties.validate(storage)?;
        self.storage = storage;
        Ok(self)
    }

    /// Interprets a signed 32-bit meta as its unsigned bit pattern.
    pub fn set_data_storage_from_int(&mut self, meta: i32) -> Result<&mut Self> {
        self.set_data_storage(meta as u32 as u64 & BIG_META_MASK)
    }

    pub fn set_property(&mut self, name: &str, value: &str) -> Result<&mut Self> {
        self.storage = self.properties.with_value(self.storage, name, value)?;
        Ok(self)
    }

    pub fn set_properties(&mut self, values: &HashMap<String, String>) -> Result<&mut Self> {
        self.storage = self.properties.pack(values)?;
        Ok(self)
    }

    pub fn property(&self, name: &str) -> Result<String> {
        self.properties.value_of(self.storage, name)
    }

    pub fn freeze(&self) -> BlockState {
        BlockState {
            block_id: self.block_id,
            storage: self.storage,
        }
    }
}

impl From<&MutableBlockState> for BlockState {
    fn from(m: &MutableBlockState) -> Self {
        m.freeze()
    }
}
