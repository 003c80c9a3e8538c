use std::sync::Arc;

use lodestone_nbt::{CompoundTag, Tag};
use lodestone_state::{BlockState, state_id};

use crate::dataset::{
    BLOCK_KEY, LEGACY_STATES_KEY, LegacyIdentity, META_KEY, Overrides, VERSION_KEY, parse_legacy_states,
};
use crate::error::{RegistryError, Result};
use crate::index::StateIndex;
use crate::names::PersistenceNames;
use crate::registration::Registration;

/// The generic wood descriptor spans log, log2 and wood bark ids but only
/// owns the bark id.
pub const GENERIC_WOOD_NAME: &str = "minecraft:wood";
pub const WOOD_BARK_BLOCK_ID: u32 = 467;

/// Whether the descriptor called `name` is the canonical owner of `block_id`.
pub fn owns_block_id(name: &str, block_id: u32) -> bool {
    name != GENERIC_WOOD_NAME || block_id == WOOD_BARK_BLOCK_ID
}

/// StateId of a descriptor: its lower-cased name and every `states` value.
pub fn descriptor_state_id(name: &str, descriptor: &CompoundTag) -> String {
    let props = descriptor
        .get_compound("states")
        .into_iter()
        .flat_map(|states| states.iter())
        .map(|(k, v)| (k.clone(), v.value_string()));
    state_id(name, props)
}

pub struct LoaderOptions<'a> {
    pub placeholder_name: &'a str,
    pub placeholder_block_id: u32,
}

pub struct LoadedPalette {
    /// Stripped entries; position is the runtime id.
    pub palette: Vec<Arc<CompoundTag>>,
    pub index: StateIndex,
    pub placeholder: Registration,
    pub legacy_states: usize,
}

/// Assigns runtime ids in palette order and fills the indices.
pub fn load_palette(
    entries: Vec<CompoundTag>,
    overrides: &Overrides,
    names: &PersistenceNames,
    options: &LoaderOptions<'_>,
) -> Result<LoadedPalette> {
    let placeholder_name = options.placeholder_name.to_lowercase();
    let mut index = StateIndex::new();
    let mut palette = Vec::with_capacity(entries.len());
    let mut placeholder = None;
    let mut legacy_states = 0usize;

    for (position, mut entry) in entries.into_iter().enumerate() {
        let runtime_id = u32::try_from(position).map_err(|_| RegistryError::MalformedDataset {
            dataset: "palette",
            index: position,
            reason: "too many entries".into(),
        })?;

        let own_legacy = match entry.remove(LEGACY_STATES_KEY) {
            Some(Tag::List(list)) => parse_legacy_states(&list, "palette", position)?,
            Some(other) => {
                return Err(RegistryError::MalformedDataset {
                    dataset: "palette",
                    index: position,
                    reason: format!("LegacyStates is a {}", other.tag_type()),
                });
            }
            None => Vec::new(),
        };
        entry.remove(META_KEY);

        let descriptor = entry
            .get_compound(BLOCK_KEY)
            .cloned()
            .ok_or_else(|| RegistryError::MalformedDataset {
                dataset: "palette",
                index: position,
                reason: "entry without a `block` compound".into(),
            })?;
        let name = descriptor.get_str("name").unwrap_or_default().to_lowercase();
        let original = Arc::new(entry);
        palette.push(Arc::clone(&original));

        if name == placeholder_name {
            placeholder = Some(Registration::new(
                Arc::clone(&original),
                Some(BlockState::of(options.placeholder_block_id)),
                runtime_id,
            ));
        }

        let key = descriptor_state_id(&name, &descriptor);
        let legacy: &[LegacyIdentity] = match overrides.get(&descriptor.without(VERSION_KEY)) {
            Some(list) if !list.is_empty() => list,
            _ => &own_legacy,
        };
        let Some(primary) = legacy.first().copied() else {
            index.register_state_id(key, Registration::new(original, None, runtime_id))?;
            continue;
        };

        if owns_block_id(&name, primary.block_id) {
            names.register(primary.block_id, &name)?;
            index.register_state_id(key.clone(), Registration::new(Arc::clone(&original), None, runtime_id))?;
        }
        for identity in legacy {
            let registration = Registration::new(Arc::clone(&original), Some(identity.state()), runtime_id);
            index.register_state(registration, &key)?;
        }
        legacy_states += legacy.len();

        let anchor = legacy
            .iter()
            .find(|l| owns_block_id(&name, l.block_id))
            .unwrap_or(&primary);
        index.anchor_original(
            descriptor,
            Registration::new(original, Some(anchor.state()), runtime_id),
        );
    }

    let placeholder =
        placeholder.ok_or_else(|| RegistryError::MissingPlaceholder(options.placeholder_name.to_string()))?;
    log::debug!(
        target: "palette",
        "assigned {} runtime id(s), {} legacy state(s), {} pending state id(s)",
        palette.len(),
        legacy_states,
        index.state_id_entries()
    );
    Ok(LoadedPalette {
        palette,
        index,
        placeholder,
        legacy_states,
    })
}
