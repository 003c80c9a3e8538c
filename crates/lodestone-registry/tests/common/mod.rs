#![allow(dead_code)]

use bytes::Bytes;
use lodestone_nbt::{CompoundTag, Flavor, ListTag, Tag, to_vec};
use lodestone_registry::{BlockStateRegistry, DatasetSources, RegistryConfig, RegistryError};
use lodestone_state::BlockCatalog;

pub const VERSION: i32 = 17_959_425;

pub fn states(pairs: &[(&str, Tag)]) -> CompoundTag {
    let mut c = CompoundTag::new();
    for (k, v) in pairs {
        c.insert(*k, v.clone());
    }
    c
}

pub fn descriptor(name: &str, states: CompoundTag) -> CompoundTag {
    CompoundTag::new()
        .with("name", name)
        .with("states", states)
        .with("version", VERSION)
}

pub fn legacy_list(pairs: &[(i32, i32)]) -> ListTag {
    ListTag::of_compounds(
        pairs
            .iter()
            .map(|&(id, val)| CompoundTag::new().with("id", id).with("val", val)),
    )
}

/// Palette entry; an empty legacy slice leaves `LegacyStates` out.
pub fn entry(name: &str, states: CompoundTag, legacy: &[(i32, i32)]) -> CompoundTag {
    let mut e = CompoundTag::new().with("block", descriptor(name, states));
    if !legacy.is_empty() {
        e.insert("LegacyStates", legacy_list(legacy));
        e.insert("meta", legacy[0].1);
    }
    e
}

pub fn palette_bytes(entries: Vec<CompoundTag>) -> Bytes {
    let root = Tag::List(ListTag::of_compounds(entries));
    Bytes::from(to_vec("", &root, Flavor::LittleEndian).unwrap())
}

/// Override entries carry version-less descriptors.
pub fn overrides_bytes(overrides: &[(&str, CompoundTag, &[(i32, i32)])]) -> Bytes {
    let list = ListTag::of_compounds(overrides.iter().map(|(name, states, legacy)| {
        CompoundTag::new()
            .with(
                "block",
                CompoundTag::new().with("name", *name).with("states", states.clone()),
            )
            .with("LegacyStates", legacy_list(legacy))
    }));
    let root = Tag::Compound(CompoundTag::new().with("Overrides", list));
    Bytes::from(to_vec("", &root, Flavor::BigEndian).unwrap())
}

pub const CATALOG: &str = r#"
[[blocks]]
id = 0
name = "minecraft:air"

[[blocks]]
id = 1
name = "minecraft:stone"
properties = [
    { kind = "enum", name = "stone_type", values = ["stone", "granite"] },
]

[[blocks]]
id = 2
name = "minecraft:grass"

[[blocks]]
id = 17
name = "minecraft:log"
properties = [
    { kind = "enum", name = "old_log_type", values = ["oak", "spruce"] },
    { kind = "enum", name = "pillar_axis", values = ["y", "x", "z"] },
]

[[blocks]]
id = 248
name = "minecraft:info_update"

[[blocks]]
id = 467
name = "minecraft:wood"
properties = [
    { kind = "enum", name = "wood_type", values = ["oak", "spruce"] },
    { kind = "boolean", name = "stripped_bit" },
    { kind = "enum", name = "pillar_axis", values = ["y", "x", "z"] },
]

[[blocks]]
id = 541
name = "minecraft:chain"
properties = [
    { kind = "enum", name = "pillar_axis", values = ["y", "x", "z"] },
]
"#;

pub fn catalog() -> BlockCatalog {
    BlockCatalog::from_toml_str(CATALOG).unwrap()
}

/// Runtime ids: 0 air, 1 stone, 2 granite, 3 oak wood, 4 oak log, 5 chain y,
/// 6 chain x, 7 info_update, 8 grass (legacy ids from the override table).
pub fn sample_entries() -> Vec<CompoundTag> {
    vec![
        entry("minecraft:air", CompoundTag::new(), &[(0, 0)]),
        entry("minecraft:stone", states(&[("stone_type", "stone".into())]), &[(1, 0)]),
        entry("minecraft:stone", states(&[("stone_type", "granite".into())]), &[(1, 1)]),
        entry(
            "minecraft:wood",
            states(&[
                ("wood_type", "oak".into()),
                ("stripped_bit", Tag::Byte(0)),
                ("pillar_axis", "y".into()),
            ]),
            &[(17, 12), (467, 0)],
        ),
        entry(
            "minecraft:log",
            states(&[("old_log_type", "oak".into()), ("pillar_axis", "y".into())]),
            &[(17, 0)],
        ),
        entry("minecraft:chain", states(&[("pillar_axis", "y".into())]), &[]),
        entry("minecraft:chain", states(&[("pillar_axis", "x".into())]), &[]),
        entry("minecraft:info_update", CompoundTag::new(), &[(248, 0)]),
        entry("minecraft:grass", CompoundTag::new(), &[]),
    ]
}

pub fn sample_sources() -> DatasetSources {
    DatasetSources {
        palette: palette_bytes(sample_entries()),
        overrides: overrides_bytes(&[("minecraft:grass", CompoundTag::new(), &[(2, 0)])]),
    }
}

pub fn build(config: &RegistryConfig, sources: &DatasetSources) -> Result<BlockStateRegistry, RegistryError> {
    BlockStateRegistry::from_sources(config, catalog(), sources)
}

pub fn sample() -> BlockStateRegistry {
    build(&RegistryConfig::default(), &sample_sources()).unwrap()
}
