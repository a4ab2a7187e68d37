//! Tests for type descriptions and scalar value formatting

use pretty_assertions::assert_eq;
use typebridge_core::store::{Discriminant, TypeStore};
use typebridge_core::types::{Format, TypeId};
use typebridge_core::RunTimeEndian;

fn dump(store: &TypeStore, id: TypeId, data: &[u8], format: Format) -> Option<String>
{
    let mut out = String::new();
    let rendered = store
        .dump_value(id, data, RunTimeEndian::Little, format, &mut out)
        .unwrap();
    rendered.then_some(out)
}

#[test]
fn test_describe_struct()
{
    let mut store = TypeStore::new(8);
    let i32_ty = store.create_intrinsic_integral_type(true, 4);
    let mut point = store.create_struct_type("Point", 8, false);
    point.add_field("x", i32_ty, 0).add_field("y", i32_ty, 4);
    let point = store.finish(point);

    assert_eq!(store.describe_type(point), "struct Point {\n  x: i32,\n  y: i32\n}");
}

#[test]
fn test_describe_tuples()
{
    let mut store = TypeStore::new(8);
    let u8_ty = store.create_intrinsic_integral_type(false, 1);
    let f32_ty = store.create_float_type("f32", 4);

    let mut anonymous = store.create_tuple_type("(u8, f32)", 8, false);
    anonymous.add_field("__0", u8_ty, 0).add_field("__1", f32_ty, 4);
    let anonymous = store.finish(anonymous);

    let mut wrapper = store.create_tuple_type("Meters", 4, false);
    wrapper.add_field("", f32_ty, 0);
    let wrapper = store.finish(wrapper);

    assert_eq!(store.describe_type(anonymous), "(\n  __0: u8,\n  __1: f32\n)");
    assert_eq!(store.describe_type(wrapper), "struct Meters (\n  f32\n)");
}

#[test]
fn test_describe_enum_union_and_empty()
{
    let mut store = TypeStore::new(8);
    let u8_ty = store.create_intrinsic_integral_type(false, 1);
    let void = store.create_void_type();

    let empty = store.create_struct_type("Unit", 0, false);
    let empty = store.finish(empty);

    let mut raw = store.create_union_type("Raw", 1);
    raw.add_field("byte", u8_ty, 0);
    let raw = store.finish(raw);

    let mut either = store.create_enum_type("Either", 2, 0, 1);
    either.add_variant("Left", empty, 0, Discriminant::Value(0));
    either.add_variant("Right", raw, 0, Discriminant::Value(1));
    let either = store.finish(either);

    assert_eq!(store.describe_type(empty), "struct Unit {}");
    assert_eq!(store.describe_type(void), "()");
    assert_eq!(store.describe_type(raw), "union Raw {\n  byte: u8\n}");
    assert_eq!(store.describe_type(either), "enum Either {\n  Left: Unit,\n  Right: Raw\n}");
}

#[test]
fn test_describe_non_aggregates()
{
    let mut store = TypeStore::new(8);
    let u8_ty = store.create_intrinsic_integral_type(false, 1);
    let buf = store.create_array_type(u8_ty, 4);

    assert_eq!(store.describe_type(buf), "[u8; 4]");
    assert_eq!(store.describe_type(TypeId::NULL), "");
}

#[test]
fn test_dump_integers()
{
    let mut store = TypeStore::new(8);
    let i16_ty = store.create_intrinsic_integral_type(true, 2);
    let u32_ty = store.create_intrinsic_integral_type(false, 4);

    assert_eq!(dump(&store, i16_ty, &[0xfe, 0xff], Format::Default).as_deref(), Some("-2"));
    assert_eq!(dump(&store, u32_ty, &[0x2a, 0, 0, 0], Format::Default).as_deref(), Some("42"));
    assert_eq!(dump(&store, u32_ty, &[0x2a, 0, 0, 0], Format::Hex).as_deref(), Some("0x2a"));
    assert_eq!(dump(&store, u32_ty, &[0x2a, 0, 0, 0], Format::Bytes).as_deref(), Some("2a 00 00 00"));
    assert_eq!(dump(&store, u32_ty, &[0x2a, 0], Format::Default), None);
}

#[test]
fn test_dump_bool_float_pointer()
{
    let mut store = TypeStore::new(8);
    let flag = store.create_bool_type("bool");
    let f32_ty = store.create_float_type("f32", 4);
    let f64_ty = store.create_float_type("f64", 8);
    let ptr = store.pointer_type_to(flag);

    assert_eq!(dump(&store, flag, &[1], Format::Default).as_deref(), Some("true"));
    assert_eq!(dump(&store, flag, &[0], Format::Default).as_deref(), Some("false"));
    assert_eq!(dump(&store, f32_ty, &1.5_f32.to_le_bytes(), Format::Default).as_deref(), Some("1.5"));
    assert_eq!(dump(&store, f64_ty, &(-0.25_f64).to_le_bytes(), Format::Default).as_deref(), Some("-0.25"));
    assert_eq!(
        dump(&store, ptr, &0x7ff0_0000_1000_u64.to_le_bytes(), Format::Default).as_deref(),
        Some("0x00007ff000001000")
    );
}

#[test]
fn test_dump_chars()
{
    let mut store = TypeStore::new(8);
    let ch = store.create_char_type();

    assert_eq!(dump(&store, ch, &[b'a', 0, 0, 0], Format::Default).as_deref(), Some("'a'"));
    assert_eq!(dump(&store, ch, &[b'\t', 0, 0, 0], Format::Default).as_deref(), Some("'\\t'"));
    assert_eq!(dump(&store, ch, &[b'\'', 0, 0, 0], Format::Default).as_deref(), Some("'\\''"));
    assert_eq!(dump(&store, ch, &[0xe9, 0, 0, 0], Format::Default).as_deref(), Some("'\\u{e9}'"));
}

#[test]
fn test_dump_c_like_enum()
{
    let mut store = TypeStore::new(8);
    let u8_ty = store.create_intrinsic_integral_type(false, 1);
    let color = store.create_c_like_enum_type("Color", u8_ty, [(0, "Red".to_string()), (2, "Blue".to_string())]);
    let alias = store.create_typedef_type("Paint", color);

    assert_eq!(dump(&store, color, &[2], Format::Default).as_deref(), Some("Color::Blue"));
    assert_eq!(dump(&store, color, &[1], Format::Default).as_deref(), Some("(invalid enum value) 1"));
    assert_eq!(dump(&store, alias, &[0], Format::Default).as_deref(), Some("Color::Red"));
}

#[test]
fn test_dump_aggregate_is_not_rendered()
{
    let mut store = TypeStore::new(8);
    let u8_ty = store.create_intrinsic_integral_type(false, 1);
    let mut pair = store.create_struct_type("Pair", 2, false);
    pair.add_field("a", u8_ty, 0).add_field("b", u8_ty, 1);
    let pair = store.finish(pair);

    assert_eq!(dump(&store, pair, &[1, 2], Format::Default), None);
    assert_eq!(dump(&store, TypeId::NULL, &[1, 2], Format::Default), None);
}
