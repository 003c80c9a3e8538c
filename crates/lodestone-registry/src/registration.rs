use std::sync::Arc;

use lodestone_nbt::CompoundTag;
use lodestone_state::BlockState;

use crate::dataset::BLOCK_KEY;

/// A palette entry bound to its runtime id, and to the state it was
/// registered or resolved for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    pub original: Arc<CompoundTag>,
    pub state: Option<BlockState>,
    pub runtime_id: u32,
}

impl Registration {
    pub fn new(original: Arc<CompoundTag>, state: Option<BlockState>, runtime_id: u32) -> Self {
        Self {
            original,
            state,
            runtime_id,
        }
    }

    /// Same entry and runtime id, bound to `state`.
    pub fn with_state(&self, state: BlockState) -> Self {
        Self {
            original: Arc::clone(&self.original),
            state: Some(state),
            runtime_id: self.runtime_id,
        }
    }

    /// The canonical descriptor (`block` child) of the entry.
    pub fn descriptor(&self) -> Option<&CompoundTag> {
        self.original.get_compound(BLOCK_KEY)
    }

    pub fn name(&self) -> Option<&str> {
        self.descriptor().and_then(|b| b.get_str("name"))
    }
}
