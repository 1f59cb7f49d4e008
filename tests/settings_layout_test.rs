//! Settings group layout and predicate numbering.

mod common;

use codegen_meta::core::Catalog;
use codegen_meta::predicates::Predicate;
use codegen_meta::settings::{shared, SettingKind};

#[test]
fn test_enum_num_bool_bool_layout() {
    common::init_logging();
    let mut catalog = Catalog::new();
    let mut group = catalog.open_settings("test", None).unwrap();
    group.enum_setting("mode", "Mode", &["fast", "small"]).unwrap();
    group.num_setting("level", "Level", 2).unwrap();
    let a = group.bool_setting("a", "First flag", true).unwrap();
    let b = group.bool_setting("b", "Second flag", false).unwrap();
    let mut group = catalog.close_settings(group).unwrap();

    assert_eq!(group.setting("mode").unwrap().byte_offset(), 0);
    assert_eq!(group.setting("level").unwrap().byte_offset(), 1);
    assert_eq!(group.boolean_offset(), 2);

    assert_eq!(group.predicate_number(&a.predicate()), Some(0));
    assert_eq!(group.predicate_number(&b.predicate()), Some(1));
    let sa = group.setting("a").unwrap();
    assert_eq!((sa.byte_offset(), sa.bit_offset()), (2, Some(0)));
    let sb = group.setting("b").unwrap();
    assert_eq!((sb.byte_offset(), sb.bit_offset()), (2, Some(1)));

    assert_eq!(group.settings_size(), 3);
    assert_eq!(group.byte_size(), 3);
    assert_eq!(group.default_bytes(), vec![0, 2, 0b01]);
    assert_eq!(
        group.setting("mode").unwrap().kind(),
        &SettingKind::Enum {
            values: vec!["fast".to_string(), "small".to_string()]
        }
    );

    let err = group.layout().unwrap_err();
    assert_eq!(err.category(), "LayoutAlreadyPerformed");
}

#[test]
fn test_number_predicate_is_idempotent() {
    common::init_logging();
    let mut catalog = Catalog::new();
    let mut group = catalog.open_settings("test", None).unwrap();
    let a = group.bool_setting("a", "", false).unwrap();
    let b = group.bool_setting("b", "", false).unwrap();
    let mut group = catalog.close_settings(group).unwrap();

    let both = Predicate::and(Some(a.predicate()), Some(b.predicate()))
        .unwrap()
        .unwrap();
    let first = group.number_predicate(&both).unwrap();
    let size = group.byte_size();
    let second = group.number_predicate(&both).unwrap();
    assert_eq!(first, 2);
    assert_eq!(first, second);
    assert_eq!(group.byte_size(), size);

    // Existing settings keep their numbers.
    assert_eq!(group.number_predicate(&a.predicate()).unwrap(), 0);
    assert_eq!(group.numbered_predicates().len(), 3);
    assert_eq!(group.settings_size(), 1);
}

#[test]
fn test_byte_size_grows_past_settings_size() {
    common::init_logging();
    let mut catalog = Catalog::new();
    let mut group = catalog.open_settings("test", None).unwrap();
    group.num_setting("n", "", 0).unwrap();
    let flags: Vec<_> = (0..8)
        .map(|i| group.bool_setting(&format!("f{}", i), "", false).unwrap())
        .collect();
    let mut group = catalog.close_settings(group).unwrap();
    assert_eq!(group.settings_size(), 2);
    assert_eq!(group.byte_size(), 2);

    let extra = Predicate::and(Some(flags[0].predicate()), Some(flags[7].predicate()))
        .unwrap()
        .unwrap();
    assert_eq!(group.number_predicate(&extra).unwrap(), 8);
    assert_eq!(group.byte_size(), 3);
    assert_eq!(group.settings_size(), 2);
}

#[test]
fn test_named_predicates_follow_bools() {
    common::init_logging();
    let mut catalog = Catalog::new();
    let shared = shared::define(&mut catalog).unwrap();
    let simd = shared.bool_setting("enable_simd").unwrap();

    let mut group = catalog.open_settings("x86", Some(&shared)).unwrap();
    let sse3 = group.bool_setting("has_sse3", "SSE3", false).unwrap();
    let sse41 = group.bool_setting("has_sse41", "SSE4.1", false).unwrap();
    let use_sse41 = Predicate::and(Some(sse3.predicate()), Some(sse41.predicate()))
        .unwrap()
        .unwrap();
    let simd_sse41 = Predicate::and(Some(simd.predicate()), Some(sse41.predicate()))
        .unwrap()
        .unwrap();
    group.named_predicate("use_sse41", use_sse41.clone()).unwrap();
    group.named_predicate("use_simd_sse41", simd_sse41.clone()).unwrap();
    let group = catalog.close_settings(group).unwrap();

    assert_eq!(group.settings_size(), 1);
    assert_eq!(group.predicate_number(&use_sse41), Some(2));
    assert_eq!(group.predicate_number(&simd_sse41), Some(3));
    assert_eq!(group.named_predicates().len(), 2);
    assert_eq!(group.parent().unwrap().name(), "shared");
}

#[test]
fn test_named_predicate_from_unrelated_group_fails() {
    common::init_logging();
    let mut catalog = Catalog::new();
    let mut arm = catalog.open_settings("arm", None).unwrap();
    let neon = arm.bool_setting("has_neon", "", false).unwrap();
    catalog.close_settings(arm).unwrap();

    let mut x86 = catalog.open_settings("x86", None).unwrap();
    x86.named_predicate("neon", &neon).unwrap();
    let err = catalog.close_settings(x86).unwrap_err();
    assert_eq!(err.category(), "ForeignPredicate");
}

#[test]
fn test_group_state_machine() {
    common::init_logging();
    let mut catalog = Catalog::new();
    let shared = catalog.open_settings("shared", None).unwrap();

    let err = catalog.open_settings("x86", None).unwrap_err();
    assert_eq!(err.category(), "GroupAlreadyOpen");
    assert_eq!(err.to_string(), "Can't open x86 since shared is already open");

    catalog.close_settings(shared).unwrap();
    let insts = catalog.open_instructions("base", "").unwrap();
    let err = catalog.open_settings("x86", None).unwrap_err();
    assert_eq!(err.category(), "GroupAlreadyOpen");
    catalog.close_instructions(insts).unwrap();
}
