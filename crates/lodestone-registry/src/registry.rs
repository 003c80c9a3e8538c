use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use lodestone_nbt::CompoundTag;
use lodestone_state::{BlockCatalog, BlockState, MutableBlockState};

use crate::blob::PaletteBlob;
use crate::config::RegistryConfig;
use crate::dataset::{self, BLOCK_KEY, DatasetSources};
use crate::error::Result;
use crate::index::StateIndex;
use crate::loader::{self, LoaderOptions};
use crate::names::PersistenceNames;
use crate::prune::Pruner;
use crate::registration::Registration;

pub const AIR_BLOCK_ID: u32 = 0;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub palette_entries: usize,
    pub cached_states: usize,
    pub state_id_entries: usize,
    pub originals: usize,
    pub persistence_names: usize,
    /// Lazy resolutions run so far, one per distinct uncached state.
    pub resolutions: usize,
    /// Resolutions that ended at the placeholder.
    pub unknown_hits: usize,
    pub pending_prunes: usize,
}

/// Runtime-id palette with its state, descriptor and name indices.
pub struct BlockStateRegistry {
    catalog: BlockCatalog,
    names: PersistenceNames,
    index: StateIndex,
    palette: Vec<Arc<CompoundTag>>,
    blob: PaletteBlob,
    placeholder: Registration,
    pruner: Pruner,
    resolutions: AtomicUsize,
    unknown_hits: AtomicUsize,
}

impl BlockStateRegistry {
    /// Loads the catalog and both datasets named by `config`, embedded
    /// copies filling in whatever is not configured.
    pub fn load(config: &RegistryConfig) -> Result<Self> {
        let catalog = match &config.catalog {
            Some(path) => BlockCatalog::from_path(path)?,
            None => BlockCatalog::embedded()?,
        };
        let sources = DatasetSources::from_paths(&config.datasets)?;
        Self::from_sources(config, catalog, &sources)
    }

    pub fn from_sources(config: &RegistryConfig, catalog: BlockCatalog, sources: &DatasetSources) -> Result<Self> {
        let overrides = dataset::parse_overrides(&sources.overrides)?;
        let entries = dataset::parse_palette(&sources.palette)?;
        let names = PersistenceNames::new();
        let loaded = loader::load_palette(
            entries,
            &overrides,
            &names,
            &LoaderOptions {
                placeholder_name: &config.placeholder_name,
                placeholder_block_id: config.placeholder_block_id,
            },
        )?;
        for entry in catalog.iter() {
            names.register(entry.id, &entry.name)?;
        }
        let blob = PaletteBlob::encode(&loaded.palette)?;
        let pruner = if config.pruning.enabled {
            Pruner::spawn(&config.pruning, loaded.index.state_ids())?
        } else {
            Pruner::disabled()
        };
        log::info!(
            target: "palette",
            "loaded {} palette entries ({} legacy states, {} names), blob {} bytes, fingerprint {:08x}",
            loaded.palette.len(),
            loaded.legacy_states,
            names.len(),
            blob.len(),
            blob.fingerprint()
        );
        Ok(Self {
            catalog,
            names,
            index: loaded.index,
            palette: loaded.palette,
            blob,
            placeholder: loaded.placeholder,
            pruner,
            resolutions: AtomicUsize::new(0),
            unknown_hits: AtomicUsize::new(0),
        })
    }

    /// The registration `state` maps to, resolving and caching it on first use.
    pub fn registration_of(&self, state: BlockState) -> Registration {
        self.index.get_or_resolve(state, || self.resolve(state))
    }

    pub fn runtime_id_of(&self, state: BlockState) -> u32 {
        self.registration_of(state).runtime_id
    }

    pub fn runtime_id_of_legacy(&self, block_id: u32, meta: u64) -> u32 {
        self.runtime_id_of(BlockState::with_meta(block_id, meta))
    }

    pub fn runtime_id_of_block(&self, block_id: u32) -> u32 {
        self.runtime_id_of(BlockState::of(block_id))
    }

    /// A copy of the palette entry `state` resolves to.
    pub fn original_form_of(&self, state: BlockState) -> CompoundTag {
        CompoundTag::clone(&self.registration_of(state).original)
    }

    /// The state anchored to a descriptor at load. Accepts a bare descriptor
    /// or a palette entry holding one under `block`.
    pub fn state_from_original(&self, original: &CompoundTag) -> Option<BlockState> {
        let hit = self.index.original(original).or_else(|| {
            original
                .get_compound(BLOCK_KEY)
                .and_then(|descriptor| self.index.original(descriptor))
        })?;
        hit.state
    }

    pub fn persistence_name_of(&self, block_id: u32) -> Option<String> {
        self.names.get(block_id)
    }

    pub fn register_persistence_name(&self, block_id: u32, name: &str) -> Result<()> {
        self.names.register(block_id, name)
    }

    pub fn persistence_names(&self) -> Vec<(u32, String)> {
        self.names.snapshot()
    }

    pub fn placeholder(&self) -> &Registration {
        &self.placeholder
    }

    pub fn placeholder_runtime_id(&self) -> u32 {
        self.placeholder.runtime_id
    }

    pub fn palette(&self) -> &[Arc<CompoundTag>] {
        &self.palette
    }

    pub fn palette_len(&self) -> usize {
        self.palette.len()
    }

    pub fn palette_entry(&self, runtime_id: u32) -> Option<&CompoundTag> {
        self.palette.get(runtime_id as usize).map(|e| e.as_ref())
    }

    pub fn blob(&self) -> &PaletteBlob {
        &self.blob
    }

    pub fn catalog(&self) -> &BlockCatalog {
        &self.catalog
    }

    pub fn create_mutable_state(&self, block_id: u32) -> MutableBlockState {
        self.catalog.create_mutable_state(block_id)
    }

    pub fn create_mutable_state_from_int(&self, block_id: u32, big_meta: i32) -> Result<MutableBlockState> {
        Ok(self.catalog.create_mutable_state_from_int(block_id, big_meta)?)
    }

    pub fn create_mutable_state_from_storage(&self, block_id: u32, storage: u64) -> Result<MutableBlockState> {
        Ok(self.catalog.create_mutable_state_from_storage(block_id, storage)?)
    }

    pub fn create_mutable_state_from_values(
        &self,
        block_id: u32,
        values: &HashMap<String, String>,
    ) -> Result<MutableBlockState> {
        Ok(self.catalog.create_mutable_state_from_values(block_id, values)?)
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            palette_entries: self.palette.len(),
            cached_states: self.index.cached_states(),
            state_id_entries: self.index.state_id_entries(),
            originals: self.index.originals(),
            persistence_names: self.names.len(),
            resolutions: self.resolutions.load(Ordering::Relaxed),
            unknown_hits: self.unknown_hits.load(Ordering::Relaxed),
            pending_prunes: self.pruner.pending(),
        }
    }

    pub fn cached_states(&self) -> usize {
        self.index.cached_states()
    }

    /// Size of the scratch StateId index.
    pub fn state_id_entries(&self) -> usize {
        self.index.state_id_entries()
    }

    pub fn is_pruning_idle(&self) -> bool {
        self.pruner.is_idle()
    }

    /// Blocks until queued prune jobs finish or `timeout` elapses.
    pub fn wait_for_pruning(&self, timeout: Duration) -> bool {
        self.pruner.wait_idle(timeout)
    }

    fn resolve(&self, state: BlockState) -> Registration {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        if state.block_id == AIR_BLOCK_ID {
            if let Some(air) = self.index.cached(&BlockState::AIR) {
                return air.with_state(state);
            }
        }
        let properties = self.catalog.properties(state.block_id);
        let registration = if properties.is_empty() || properties.is_legacy_only() {
            self.unknown(state)
        } else {
            self.resolve_by_state_id(state)
        };
        if registration.runtime_id != self.placeholder.runtime_id {
            self.pruner.request(registration.runtime_id);
        }
        registration
    }

    fn resolve_by_state_id(&self, state: BlockState) -> Registration {
        let properties = self.catalog.properties(state.block_id);
        let name = self
            .names
            .get(state.block_id)
            .unwrap_or_else(|| format!("blockid:{}", state.block_id));
        if let Ok(key) = state.state_id(&name, &properties) {
            if let Some(hit) = self.index.take_state_id(&key) {
                return hit.with_state(state);
            }
        }
        if let Some(hit) = self.index.take_state_id(&state.legacy_key()) {
            return hit.with_state(state);
        }
        self.unknown(state)
    }

    fn unknown(&self, state: BlockState) -> Registration {
        self.unknown_hits.fetch_add(1, Ordering::Relaxed);
        log::error!(
            target: "blockstate",
            "found an unknown block id:meta combination {}:{}, replacing it with the placeholder",
            state.block_id,
            state.storage
        );
        self.placeholder.clone()
    }
}
