use lodestone_nbt::{CompoundTag, Flavor, ListTag, NbtError, Tag, TagType, from_slice, to_vec};
use proptest::prelude::*;

fn flavor() -> impl Strategy<Value = Flavor> {
    prop_oneof![
        Just(Flavor::BigEndian),
        Just(Flavor::LittleEndian),
        Just(Flavor::Network),
    ]
}

fn scalar() -> impl Strategy<Value = Tag> {
    prop_oneof![
        any::<i8>().prop_map(Tag::Byte),
        any::<i16>().prop_map(Tag::Short),
        any::<i32>().prop_map(Tag::Int),
        any::<i64>().prop_map(Tag::Long),
        any::<f32>().prop_map(Tag::Float),
        any::<f64>().prop_map(Tag::Double),
        "[a-z0-9_:]{0,12}".prop_map(Tag::String),
        proptest::collection::vec(any::<u8>(), 0..8).prop_map(Tag::ByteArray),
        proptest::collection::vec(any::<i32>(), 0..8).prop_map(Tag::IntArray),
        proptest::collection::vec(any::<i64>(), 0..8).prop_map(Tag::LongArray),
    ]
}

fn tree() -> impl Strategy<Value = Tag> {
    scalar().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            proptest::collection::vec(("[a-z]{1,6}", inner.clone()), 0..6).prop_map(|entries| {
                let mut c = CompoundTag::new();
                for (k, v) in entries {
                    c.insert(k, v);
                }
                Tag::Compound(c)
            }),
            proptest::collection::vec(any::<i32>(), 0..6).prop_map(|v| {
                Tag::List(
                    ListTag::from_tags(TagType::Int, v.into_iter().map(Tag::Int).collect())
                        .unwrap(),
                )
            }),
            proptest::collection::vec(inner, 0..4).prop_map(|items| {
                let compounds = items
                    .into_iter()
                    .map(|t| CompoundTag::new().with("v", t));
                Tag::List(ListTag::of_compounds(compounds))
            }),
        ]
    })
}

proptest! {
    // decode(encode(t)) == t for every flavour, including entry order
    #[test]
    fn codec_preserves_trees(t in tree(), f in flavor(), name in "[a-z]{0,8}") {
        let bytes = to_vec(&name, &t, f).unwrap();
        let (back_name, back) = from_slice(&bytes, f).unwrap();
        prop_assert_eq!(&back_name, &name);
        prop_assert_eq!(&back, &t);
        if let (Tag::Compound(a), Tag::Compound(b)) = (&t, &back) {
            let ka: Vec<&String> = a.iter().map(|(k, _)| k).collect();
            let kb: Vec<&String> = b.iter().map(|(k, _)| k).collect();
            prop_assert_eq!(ka, kb);
        }
    }

    // any strict prefix of a valid encoding fails cleanly instead of panicking
    #[test]
    fn truncation_never_panics(t in tree(), f in flavor(), cut in 0usize..64) {
        let bytes = to_vec("root", &t, f).unwrap();
        let cut = cut.min(bytes.len().saturating_sub(1));
        let res = from_slice(&bytes[..cut], f);
        prop_assert!(res.is_err());
    }

    // arbitrary garbage never panics the decoder
    #[test]
    fn garbage_is_an_error_not_a_panic(raw in proptest::collection::vec(any::<u8>(), 0..64), f in flavor()) {
        let _ = from_slice(&raw, f);
    }
}

#[test]
fn network_list_of_compounds_matches_known_bytes() {
    let list = ListTag::of_compounds([CompoundTag::new().with("name", "a")]);
    let bytes = to_vec("", &Tag::List(list), Flavor::Network).unwrap();
    assert_eq!(
        bytes,
        vec![
            9, 0, // list, empty root name
            10, 2, // compound elements, count 1 zig-zagged
            8, 4, b'n', b'a', b'm', b'e', 1, b'a', // name: "a"
            0, // end of compound
        ]
    );
}

#[test]
fn end_typed_list_with_items_is_rejected() {
    let bytes = vec![9u8, 0, 0, 0, 1, 0, 0, 0];
    assert_eq!(
        from_slice(&bytes, Flavor::LittleEndian).unwrap_err(),
        NbtError::UnknownTagType(0)
    );
}
