//! Tests for aggregate and enum construction

use typebridge_core::store::{Discriminant, TypeStore};
use typebridge_core::types::TypeId;

fn option_u32(store: &mut TypeStore) -> (TypeId, TypeId, TypeId)
{
    let u32_ty = store.create_intrinsic_integral_type(false, 4);

    let none = store.create_tuple_type("None", 8, false);
    let none = store.finish(none);

    let mut some = store.create_tuple_type("Some", 8, false);
    some.add_field("__0", u32_ty, 4);
    let some = store.finish(some);

    let mut option = store.create_enum_type("Option<u32>", 8, 0, 4);
    option.add_variant("None", none, 0, Discriminant::Value(0));
    option.add_variant("Some", some, 0, Discriminant::Value(1));
    option.add_template_argument(u32_ty);
    (store.finish(option), none, some)
}

#[test]
fn test_fields_keep_insertion_order()
{
    let mut store = TypeStore::new(8);
    let u8_ty = store.create_intrinsic_integral_type(false, 1);
    let u64_ty = store.create_intrinsic_integral_type(false, 8);

    let mut record = store.create_struct_type("Record", 16, false);
    record.add_field("wide", u64_ty, 0).add_field("narrow", u8_ty, 8);
    assert_eq!(record.field_count(), 2);
    let record = store.finish(record);

    let names: Vec<&str> = (0..store.num_fields(record))
        .filter_map(|index| store.field_at_index(record, index))
        .map(|field| field.name.as_str())
        .collect();
    assert_eq!(names, vec!["wide", "narrow"]);
    assert_eq!(store.field_at_index(record, 1).map(|field| field.offset), Some(8));
    assert_eq!(store.index_of_child_with_name(record, "narrow", true), Some(1));
}

#[test]
fn test_enum_discriminant_mapping()
{
    let mut store = TypeStore::new(8);
    let (option, none, some) = option_u32(&mut store);

    assert_eq!(store.enum_discriminant_location(option), Some((0, 4)));
    assert_eq!(store.find_enum_variant(option, 0), Some(none));
    assert_eq!(store.find_enum_variant(option, 1), Some(some));
    assert_eq!(store.find_enum_variant(option, 7), None);
    assert_eq!(store.template_argument_count(option), 1);
    assert_eq!(store.num_fields(option), 2);
}

#[test]
fn test_default_variant_catches_unmapped_values()
{
    let mut store = TypeStore::new(8);
    let small = store.create_struct_type("Small", 8, false);
    let small = store.finish(small);
    let large = store.create_struct_type("Large", 8, false);
    let large = store.finish(large);

    let mut niche = store.create_enum_type("Niche", 8, 0, 8);
    niche.add_variant("Small", small, 0, Discriminant::Value(0));
    niche.add_variant("Large", large, 0, Discriminant::Default);
    let niche = store.finish(niche);

    assert_eq!(store.find_enum_variant(niche, 0), Some(small));
    assert_eq!(store.find_enum_variant(niche, 0xdead_beef), Some(large));
}

#[test]
fn test_duplicate_discriminant_keeps_later_variant()
{
    let mut store = TypeStore::new(8);
    let first = store.create_struct_type("First", 4, false);
    let first = store.finish(first);
    let second = store.create_struct_type("Second", 4, false);
    let second = store.finish(second);

    let mut clash = store.create_enum_type("Clash", 4, 0, 1);
    clash.add_variant("First", first, 0, Discriminant::Value(3));
    clash.add_variant("Second", second, 0, Discriminant::Value(3));
    let clash = store.finish(clash);

    assert_eq!(store.find_enum_variant(clash, 3), Some(second));
    assert_eq!(store.num_fields(clash), 2);
}

#[test]
fn test_discriminants_compare_at_declared_width()
{
    let mut store = TypeStore::new(8);
    let neg = store.create_struct_type("Neg", 2, false);
    let neg = store.finish(neg);
    let pos = store.create_struct_type("Pos", 2, false);
    let pos = store.finish(pos);

    let mut signed = store.create_enum_type("Signed", 2, 0, 1);
    signed.add_variant("Neg", neg, 0, Discriminant::Value(u64::MAX));
    signed.add_variant("Pos", pos, 0, Discriminant::Value(1));
    let signed = store.finish(signed);

    assert_eq!(store.find_enum_variant(signed, 0xff), Some(neg));
    assert_eq!(store.find_enum_variant(signed, u64::MAX), Some(neg));
    assert_eq!(store.find_enum_variant(signed, 0x101), Some(pos));
    assert_eq!(store.find_enum_variant(signed, 2), None);

    let mut wide = store.create_enum_type("Wide", 8, 0, 8);
    wide.add_variant("Neg", neg, 0, Discriminant::Value(u64::MAX));
    let wide = store.finish(wide);
    assert_eq!(store.find_enum_variant(wide, 0xff), None);
    assert_eq!(store.find_enum_variant(wide, u64::MAX), Some(neg));
}

#[test]
fn test_variant_on_struct_is_plain_field()
{
    let mut store = TypeStore::new(8);
    let u8_ty = store.create_intrinsic_integral_type(false, 1);
    let mut plain = store.create_struct_type("Plain", 1, false);
    plain.add_variant("only", u8_ty, 0, Discriminant::Value(1));
    let plain = store.finish(plain);

    assert_eq!(store.num_fields(plain), 1);
    assert_eq!(store.enum_discriminant_location(plain), None);
    assert_eq!(store.find_enum_variant(plain, 1), None);
}

#[test]
fn test_legacy_discriminant_stripped_when_enum_finishes()
{
    let mut store = TypeStore::new(8);
    let u32_ty = store.create_intrinsic_integral_type(false, 4);

    let mut payload = store.create_tuple_type("Some", 12, true);
    payload
        .add_field("RUST$ENUM$DISR", u32_ty, 0)
        .add_field("__0", u32_ty, 4)
        .add_field("__1", u32_ty, 8);
    let payload = store.finish(payload);
    assert!(store.has_discriminant(payload));
    assert_eq!(store.num_fields(payload), 3);

    let mut legacy = store.create_enum_type("Legacy", 12, 0, 4);
    legacy.add_variant("Some", payload, 0, Discriminant::Value(1));
    let legacy = store.finish(legacy);

    assert!(!store.has_discriminant(payload));
    assert_eq!(store.num_fields(payload), 2);
    assert_eq!(store.field_at_index(payload, 0).map(|field| field.name.as_str()), Some("0"));
    assert_eq!(store.field_at_index(payload, 1).map(|field| field.offset), Some(8));

    // A second pass must not remove another field.
    store.finish_aggregate_initialization(legacy);
    assert_eq!(store.num_fields(payload), 2);
}

#[test]
fn test_legacy_discriminant_stripped_from_open_payload()
{
    let mut store = TypeStore::new(8);
    let u8_ty = store.create_intrinsic_integral_type(false, 1);

    let mut payload = store.create_struct_type("Pending", 2, true);
    payload.add_field("RUST$ENUM$DISR", u8_ty, 0);

    let mut legacy = store.create_enum_type("Legacy", 2, 0, 1);
    legacy.add_variant("Pending", payload.id(), 0, Discriminant::Value(0));
    store.finish(legacy);

    payload.add_field("value", u8_ty, 1);
    let payload = store.finish(payload);

    assert!(!store.has_discriminant(payload));
    assert_eq!(store.num_fields(payload), 1);
    assert_eq!(store.field_at_index(payload, 0).map(|field| field.name.as_str()), Some("value"));
}

#[test]
fn test_finish_aggregate_initialization_ignores_non_enums()
{
    let mut store = TypeStore::new(8);
    let u8_ty = store.create_intrinsic_integral_type(false, 1);
    let mut flagged = store.create_struct_type("Flagged", 2, true);
    flagged.add_field("RUST$ENUM$DISR", u8_ty, 0).add_field("x", u8_ty, 1);
    let flagged = store.finish(flagged);

    store.finish_aggregate_initialization(flagged);
    store.finish_aggregate_initialization(u8_ty);
    store.finish_aggregate_initialization(TypeId::NULL);

    assert!(store.has_discriminant(flagged));
    assert_eq!(store.num_fields(flagged), 2);
}
