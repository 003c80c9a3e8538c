//! Decoding of the two palette datasets.
//!
//! The palette is a little-endian root list of entries
//! `{block: {name, states, version}, LegacyStates?: [{id, val}], meta?}`.
//! The override table is a big-endian root compound whose `Overrides` list
//! holds `{block, LegacyStates}` pairs keyed by the version-less descriptor.

use std::fs;
use std::path::Path;

use bytes::Bytes;
use hashbrown::HashMap;
use lodestone_nbt::{CompoundTag, Flavor, ListTag, Tag, TagType, from_slice};
use lodestone_state::BlockState;

use crate::config::DatasetPaths;
use crate::error::{RegistryError, Result};

static EMBEDDED_PALETTE: &[u8] = include_bytes!("../resources/runtime_block_states.dat");
static EMBEDDED_OVERRIDES: &[u8] = include_bytes!("../resources/runtime_block_states_overrides.dat");

pub const BLOCK_KEY: &str = "block";
pub const LEGACY_STATES_KEY: &str = "LegacyStates";
pub const META_KEY: &str = "meta";
pub const VERSION_KEY: &str = "version";
pub const OVERRIDES_KEY: &str = "Overrides";

const PALETTE: &str = "palette";
const OVERRIDES: &str = "overrides";

/// Raw bytes of both datasets.
#[derive(Clone, Debug)]
pub struct DatasetSources {
    pub palette: Bytes,
    pub overrides: Bytes,
}

impl DatasetSources {
    pub fn embedded() -> Self {
        Self {
            palette: Bytes::from_static(EMBEDDED_PALETTE),
            overrides: Bytes::from_static(EMBEDDED_OVERRIDES),
        }
    }

    /// Reads configured files, falling back to the embedded copy per dataset.
    pub fn from_paths(paths: &DatasetPaths) -> Result<Self> {
        let palette = match &paths.palette {
            Some(p) => read_file(p)?,
            None => Bytes::from_static(EMBEDDED_PALETTE),
        };
        let overrides = match &paths.overrides {
            Some(p) => read_file(p)?,
            None => Bytes::from_static(EMBEDDED_OVERRIDES),
        };
        Ok(Self { palette, overrides })
    }
}

fn read_file(path: &Path) -> Result<Bytes> {
    let data = fs::read(path).map_err(|source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Bytes::from(data))
}

/// A `(numeric block id, meta)` pair from the older identity scheme.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LegacyIdentity {
    pub block_id: u32,
    pub meta: u64,
}

impl LegacyIdentity {
    pub fn state(&self) -> BlockState {
        BlockState::with_meta(self.block_id, self.meta)
    }
}

/// Override table: version-less descriptor to its legacy identities.
pub type Overrides = HashMap<CompoundTag, Vec<LegacyIdentity>>;

fn malformed(dataset: &'static str, index: usize, reason: impl Into<String>) -> RegistryError {
    RegistryError::MalformedDataset {
        dataset,
        index,
        reason: reason.into(),
    }
}

/// Decodes a `LegacyStates` list. `index` only feeds error messages.
pub fn parse_legacy_states(
    list: &ListTag,
    dataset: &'static str,
    index: usize,
) -> Result<Vec<LegacyIdentity>> {
    if list.is_empty() {
        return Ok(Vec::new());
    }
    if list.element_type() != TagType::Compound {
        return Err(malformed(dataset, index, "LegacyStates is not a list of compounds"));
    }
    list.compounds()
        .map(|c| -> Result<LegacyIdentity> {
            let id = c
                .get_int("id")
                .ok_or_else(|| malformed(dataset, index, "legacy state without `id`"))?;
            let val = c
                .get_int("val")
                .ok_or_else(|| malformed(dataset, index, "legacy state without `val`"))?;
            let block_id = u32::try_from(id)
                .map_err(|_| malformed(dataset, index, format!("block id {id} out of range")))?;
            let meta = u64::try_from(val)
                .map_err(|_| malformed(dataset, index, format!("negative meta {val}")))?;
            Ok(LegacyIdentity { block_id, meta })
        })
        .collect()
}

fn decode(bytes: &[u8], dataset: &'static str, flavor: Flavor) -> Result<Tag> {
    let (_, tag) = from_slice(bytes, flavor).map_err(|source| RegistryError::Dataset { dataset, source })?;
    Ok(tag)
}

/// Decodes the ordered palette. Every entry must carry a `block` compound
/// with a string `name`.
pub fn parse_palette(bytes: &[u8]) -> Result<Vec<CompoundTag>> {
    let list = match decode(bytes, PALETTE, Flavor::LittleEndian)? {
        Tag::List(list) => list,
        other => {
            return Err(malformed(
                PALETTE,
                0,
                format!("root is a {}, expected a list", other.tag_type()),
            ));
        }
    };
    if !list.is_empty() && list.element_type() != TagType::Compound {
        return Err(malformed(PALETTE, 0, "root list does not hold compounds"));
    }
    let entries = list.into_compounds();
    for (index, entry) in entries.iter().enumerate() {
        let block = entry
            .get_compound(BLOCK_KEY)
            .ok_or_else(|| malformed(PALETTE, index, "entry without a `block` compound"))?;
        match block.get_str("name") {
            Some(name) if !name.is_empty() => {}
            _ => return Err(malformed(PALETTE, index, "descriptor without a name")),
        }
    }
    Ok(entries)
}

/// Decodes the override table. Entries missing `block` or `LegacyStates`
/// are skipped; a later entry for the same descriptor replaces an earlier one.
pub fn parse_overrides(bytes: &[u8]) -> Result<Overrides> {
    let root = match decode(bytes, OVERRIDES, Flavor::BigEndian)? {
        Tag::Compound(root) => root,
        other => {
            return Err(malformed(
                OVERRIDES,
                0,
                format!("root is a {}, expected a compound", other.tag_type()),
            ));
        }
    };
    let mut out = Overrides::new();
    let Some(list) = root.get_list(OVERRIDES_KEY) else {
        return Ok(out);
    };
    for (index, entry) in list.compounds().enumerate() {
        let (Some(block), Some(legacy)) = (entry.get_compound(BLOCK_KEY), entry.get_list(LEGACY_STATES_KEY))
        else {
            continue;
        };
        let identities = parse_legacy_states(legacy, OVERRIDES, index)?;
        out.insert(block.without(VERSION_KEY), identities);
    }
    log::debug!(target: "palette", "override table holds {} descriptor(s)", out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodestone_nbt::to_vec;

    fn legacy(pairs: &[(i32, i32)]) -> ListTag {
        ListTag::of_compounds(
            pairs
                .iter()
                .map(|&(id, val)| CompoundTag::new().with("id", id).with("val", val)),
        )
    }

    #[test]
    fn embedded_datasets_decode() {
        let sources = DatasetSources::embedded();
        let palette = parse_palette(&sources.palette).unwrap();
        assert_eq!(palette.len(), 22);
        let overrides = parse_overrides(&sources.overrides).unwrap();
        let grass = CompoundTag::new()
            .with("name", "minecraft:grass")
            .with("states", CompoundTag::new());
        assert_eq!(
            overrides.get(&grass),
            Some(&vec![LegacyIdentity { block_id: 2, meta: 0 }])
        );
    }

    #[test]
    fn override_keys_drop_the_version() {
        let block = CompoundTag::new()
            .with("name", "minecraft:dirt")
            .with("states", CompoundTag::new())
            .with("version", 17_959_425);
        let entry = CompoundTag::new()
            .with(BLOCK_KEY, block)
            .with(LEGACY_STATES_KEY, legacy(&[(3, 0)]));
        let skipped = CompoundTag::new().with(BLOCK_KEY, CompoundTag::new().with("name", "x"));
        let root = CompoundTag::new().with(OVERRIDES_KEY, ListTag::of_compounds([entry, skipped]));
        let bytes = to_vec("", &Tag::Compound(root), Flavor::BigEndian).unwrap();
        let table = parse_overrides(&bytes).unwrap();
        assert_eq!(table.len(), 1);
        let key = CompoundTag::new()
            .with("name", "minecraft:dirt")
            .with("states", CompoundTag::new());
        assert!(table.contains_key(&key));
    }

    #[test]
    fn palette_must_be_a_list() {
        let bytes = to_vec("", &Tag::Compound(CompoundTag::new()), Flavor::LittleEndian).unwrap();
        assert!(matches!(
            parse_palette(&bytes),
            Err(RegistryError::MalformedDataset { dataset: "palette", .. })
        ));
    }

    #[test]
    fn big_endian_palette_is_a_decode_error() {
        let sources = DatasetSources::embedded();
        // the override file is big-endian; reading it as the palette must fail cleanly
        assert!(parse_palette(&sources.overrides).is_err());
    }

    #[test]
    fn negative_meta_is_malformed() {
        let err = parse_legacy_states(&legacy(&[(1, -1)]), "palette", 4).unwrap_err();
        assert!(matches!(err, RegistryError::MalformedDataset { index: 4, .. }));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let paths = DatasetPaths {
            palette: Some("/nonexistent/palette.dat".into()),
            overrides: None,
        };
        match DatasetSources::from_paths(&paths) {
            Err(RegistryError::Io { path, .. }) => assert!(path.ends_with("palette.dat")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
