use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use hashbrown::HashMap;
use lodestone_nbt::CompoundTag;
use lodestone_state::BlockState;

use crate::error::{RegistryError, Result};
use crate::registration::Registration;

/// Shared scratch index: StateId or legacy key to its registration.
pub type StateIdIndex = Arc<DashMap<String, Registration>>;

/// The three lookup tables plus the in-flight cells that make lazy
/// resolution compute-once.
#[derive(Debug, Default)]
pub struct StateIndex {
    /// Append-only after load.
    by_state: DashMap<BlockState, Registration>,
    /// Frozen after load.
    by_original: HashMap<CompoundTag, Registration>,
    /// Shrinks as entries are consumed or pruned.
    by_state_id: StateIdIndex,
    inflight: DashMap<BlockState, Arc<OnceLock<Registration>>>,
}

impl StateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a string-keyed registration. An identical duplicate is a no-op.
    pub fn register_state_id(&self, key: String, registration: Registration) -> Result<()> {
        match self.by_state_id.entry(key) {
            Entry::Vacant(v) => {
                v.insert(registration);
                Ok(())
            }
            Entry::Occupied(o) if *o.get() == registration => Ok(()),
            Entry::Occupied(o) => Err(RegistryError::ConflictingRegistration {
                key: o.key().clone(),
                existing: o.get().runtime_id,
                requested: registration.runtime_id,
            }),
        }
    }

    /// Binds a legacy identity to its entry, then drops the scratch keys
    /// that the binding supersedes.
    pub fn register_state(&self, registration: Registration, state_id: &str) -> Result<()> {
        let Some(state) = registration.state else {
            return self.register_state_id(state_id.to_string(), registration);
        };
        match self.by_state.entry(state) {
            Entry::Vacant(v) => {
                v.insert(registration);
            }
            Entry::Occupied(o) if *o.get() == registration => {}
            Entry::Occupied(o) => {
                return Err(RegistryError::ConflictingRegistration {
                    key: state.legacy_key(),
                    existing: o.get().runtime_id,
                    requested: registration.runtime_id,
                });
            }
        }
        self.by_state_id.remove(state_id);
        self.by_state_id.remove(&state.legacy_key());
        Ok(())
    }

    /// First anchor for a descriptor wins.
    pub fn anchor_original(&mut self, descriptor: CompoundTag, registration: Registration) {
        self.by_original.entry(descriptor).or_insert(registration);
    }

    pub fn cached(&self, state: &BlockState) -> Option<Registration> {
        self.by_state.get(state).map(|r| r.value().clone())
    }

    pub fn original(&self, descriptor: &CompoundTag) -> Option<&Registration> {
        self.by_original.get(descriptor)
    }

    /// Removes and returns the scratch entry for `key`.
    pub fn take_state_id(&self, key: &str) -> Option<Registration> {
        self.by_state_id.remove(key).map(|(_, r)| r)
    }

    pub fn state_ids(&self) -> StateIdIndex {
        Arc::clone(&self.by_state_id)
    }

    /// Cached registration for `state`, running `resolve` at most once per
    /// key across all threads.
    pub fn get_or_resolve<F>(&self, state: BlockState, resolve: F) -> Registration
    where
        F: FnOnce() -> Registration,
    {
        if let Some(hit) = self.cached(&state) {
            return hit;
        }
        let cell = Arc::clone(
            &self
                .inflight
                .entry(state)
                .or_insert_with(|| Arc::new(OnceLock::new())),
        );
        let registration = cell
            .get_or_init(|| {
                if let Some(hit) = self.cached(&state) {
                    return hit;
                }
                let resolved = resolve();
                self.by_state.entry(state).or_insert(resolved).value().clone()
            })
            .clone();
        self.inflight.remove_if(&state, |_, c| Arc::ptr_eq(c, &cell));
        registration
    }

    #[inline]
    pub fn cached_states(&self) -> usize {
        self.by_state.len()
    }

    #[inline]
    pub fn state_id_entries(&self) -> usize {
        self.by_state_id.len()
    }

    #[inline]
    pub fn originals(&self) -> usize {
        self.by_original.len()
    }
}
