use lodestone_registry::{BlockStateRegistry, RegistryConfig, RegistryError, global, initialize};
use lodestone_state::BlockState;

#[test]
fn embedded_palette_loads_with_known_layout() {
    let reg = BlockStateRegistry::load(&RegistryConfig::default()).unwrap();
    assert_eq!(reg.palette_len(), 22);
    assert_eq!(reg.placeholder_runtime_id(), 18);

    // stone variants follow air
    for meta in 0..7 {
        assert_eq!(reg.runtime_id_of_legacy(1, meta), 1 + meta as u32);
    }
    // grass only has legacy ids through the override table
    assert_eq!(reg.runtime_id_of_block(2), 8);
    assert_eq!(reg.runtime_id_of_legacy(3, 1), 10);
    assert_eq!(reg.runtime_id_of_legacy(17, 3), 14);
    assert_eq!(reg.runtime_id_of_legacy(162, 1), 16);
    assert_eq!(reg.runtime_id_of_legacy(17, 12), 17);
    assert_eq!(reg.runtime_id_of_legacy(467, 0), 17);
    assert_eq!(reg.runtime_id_of_block(248), 18);
}

#[test]
fn embedded_chain_resolves_through_state_ids() {
    let reg = BlockStateRegistry::load(&RegistryConfig::default()).unwrap();
    let z = reg
        .create_mutable_state(541)
        .set_property("pillar_axis", "z")
        .unwrap()
        .freeze();
    assert_eq!(reg.runtime_id_of(z), 21);
    assert_eq!(reg.runtime_id_of_block(541), 19);
    // oak log lying along x was never listed
    let oak_x = reg
        .create_mutable_state(17)
        .set_property("pillar_axis", "x")
        .unwrap()
        .freeze();
    assert_eq!(reg.runtime_id_of(oak_x), reg.placeholder_runtime_id());
}

#[test]
fn embedded_names_come_from_palette_and_catalog() {
    let reg = BlockStateRegistry::load(&RegistryConfig::default()).unwrap();
    assert_eq!(reg.persistence_name_of(1).as_deref(), Some("minecraft:stone"));
    assert_eq!(reg.persistence_name_of(17).as_deref(), Some("minecraft:log"));
    assert_eq!(reg.persistence_name_of(467).as_deref(), Some("minecraft:wood"));
    assert_eq!(reg.persistence_name_of(541).as_deref(), Some("minecraft:chain"));
    assert_eq!(reg.persistence_name_of(9999), None);
}

#[test]
fn global_instance_initializes_once() {
    let config = RegistryConfig::default();
    let first = initialize(&config).unwrap();
    assert!(std::ptr::eq(first, global().unwrap()));
    assert!(matches!(initialize(&config), Err(RegistryError::AlreadyInitialized)));
    assert_eq!(first.runtime_id_of(BlockState::AIR), 0);
}
