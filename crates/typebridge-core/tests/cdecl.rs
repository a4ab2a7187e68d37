//! Tests for C declaration synthesis

use pretty_assertions::assert_eq;
use typebridge_core::cdecl::TypeNameMap;
use typebridge_core::store::{Discriminant, TypeStore};

#[test]
fn test_scalar_declarations()
{
    let mut store = TypeStore::new(8);
    let flag = store.create_bool_type("bool");
    let i16_ty = store.create_intrinsic_integral_type(true, 2);
    let u64_ty = store.create_intrinsic_integral_type(false, 8);
    let f32_ty = store.create_float_type("f32", 4);
    let f64_ty = store.create_float_type("f64", 8);
    let mut names = TypeNameMap::new();

    assert_eq!(store.c_abi_declaration(flag, "ok", &mut names).unwrap(), "bool ok");
    assert_eq!(store.c_abi_declaration(i16_ty, "n", &mut names).unwrap(), "__INT16_TYPE__ n");
    assert_eq!(store.c_abi_declaration(u64_ty, "", &mut names).unwrap(), "__UINT64_TYPE__");
    assert_eq!(store.c_abi_declaration(f32_ty, "x", &mut names).unwrap(), "float x");
    assert_eq!(store.c_abi_declaration(f64_ty, "y", &mut names).unwrap(), "double y");
    assert_eq!(names.tag_count(), 0);
    assert!(names.typedefs().is_empty());
}

#[test]
fn test_pointer_array_and_typedef()
{
    let mut store = TypeStore::new(8);
    let u8_ty = store.create_intrinsic_integral_type(false, 1);
    let ptr = store.pointer_type_to(u8_ty);
    let buf = store.create_array_type(u8_ty, 32);
    let alias = store.create_typedef_type("Byte", u8_ty);
    let color = store.create_c_like_enum_type("Color", u8_ty, [(0, "Red".to_string())]);
    let mut names = TypeNameMap::new();

    assert_eq!(store.c_abi_declaration(ptr, "p", &mut names).unwrap(), "__UINT8_TYPE__* p");
    assert_eq!(store.c_abi_declaration(buf, "buf", &mut names).unwrap(), "__UINT8_TYPE__ buf[32]");
    assert_eq!(store.c_abi_declaration(alias, "b", &mut names).unwrap(), "__UINT8_TYPE__ b");
    assert_eq!(store.c_abi_declaration(color, "c", &mut names).unwrap(), "__UINT8_TYPE__ c");
}

#[test]
fn test_function_pointer()
{
    let mut store = TypeStore::new(8);
    let i32_ty = store.create_intrinsic_integral_type(true, 4);
    let void = store.create_void_type();
    let callback = store.create_function_type("fn(i32, i32)", void, [i32_ty, i32_ty], []);
    let ptr = store.pointer_type_to(callback);
    let mut names = TypeNameMap::new();

    assert_eq!(
        store.c_abi_declaration(ptr, "cb", &mut names).unwrap(),
        "void (*cb)(__INT32_TYPE__, __INT32_TYPE__)"
    );
}

#[test]
fn test_struct_tag_defined_once()
{
    let mut store = TypeStore::new(8);
    let i32_ty = store.create_intrinsic_integral_type(true, 4);
    let mut point = store.create_struct_type("Point", 8, false);
    point.add_field("x", i32_ty, 0).add_field("y", i32_ty, 4);
    let point = store.finish(point);
    let ptr = store.pointer_type_to(point);
    let mut names = TypeNameMap::new();

    assert_eq!(store.c_abi_declaration(point, "a", &mut names).unwrap(), "struct tag0 a");
    assert_eq!(store.c_abi_declaration(ptr, "b", &mut names).unwrap(), "struct tag0* b");
    assert_eq!(names.tag_count(), 1);
    assert_eq!(
        names.into_typedefs(),
        "struct tag0 { __INT32_TYPE__ _x; __INT32_TYPE__ _y; };\n"
    );
}

#[test]
fn test_nested_and_unnamed_fields()
{
    let mut store = TypeStore::new(8);
    let u8_ty = store.create_intrinsic_integral_type(false, 1);
    let mut inner = store.create_tuple_type("(u8, u8)", 2, false);
    inner.add_field("", u8_ty, 0).add_field("", u8_ty, 1);
    let inner = store.finish(inner);
    let mut outer = store.create_union_type("Overlay", 2);
    outer.add_field("pair", inner, 0).add_field("raw", u8_ty, 0);
    let outer = store.finish(outer);
    let mut names = TypeNameMap::new();

    assert_eq!(store.c_abi_declaration(outer, "v", &mut names).unwrap(), "union tag0 v");
    assert_eq!(
        names.typedefs(),
        "struct tag1 { __UINT8_TYPE__ __0; __UINT8_TYPE__ __1; };\n\
         union tag0 { struct tag1 _pair; __UINT8_TYPE__ _raw; };\n"
    );
}

#[test]
fn test_recursive_struct()
{
    let mut store = TypeStore::new(8);
    let i64_ty = store.create_intrinsic_integral_type(true, 8);
    let mut node = store.create_struct_type("Node", 16, false);
    let next = store.pointer_type_to(node.id());
    node.add_field("value", i64_ty, 0).add_field("next", next, 8);
    let node = store.finish(node);
    let mut names = TypeNameMap::new();

    assert_eq!(store.c_abi_declaration(node, "head", &mut names).unwrap(), "struct tag0 head");
    assert_eq!(
        names.typedefs(),
        "struct tag0 { __INT64_TYPE__ _value; struct tag0* _next; };\n"
    );
}

#[test]
fn test_enum_exposes_leading_discriminant()
{
    let mut store = TypeStore::new(8);
    let u32_ty = store.create_intrinsic_integral_type(false, 4);
    let none = store.create_tuple_type("None", 8, false);
    let none = store.finish(none);
    let mut some = store.create_tuple_type("Some", 8, false);
    some.add_field("__0", u32_ty, 4);
    let some = store.finish(some);
    let mut option = store.create_enum_type("Option<u32>", 8, 0, 4);
    option.add_variant("None", none, 0, Discriminant::Value(0));
    option.add_variant("Some", some, 0, Discriminant::Value(1));
    let option = store.finish(option);
    let mut names = TypeNameMap::new();

    assert_eq!(store.c_abi_declaration(option, "o", &mut names).unwrap(), "struct tag0 o");
    assert_eq!(
        names.typedefs(),
        "struct tag1 { };\n\
         struct tag2 { __UINT32_TYPE__ ___0; };\n\
         struct tag0 { int32_t __discr; struct tag1 _None; struct tag2 _Some; };\n"
    );
}

#[test]
fn test_unknown_types_have_no_declaration()
{
    let mut store = TypeStore::new(8);
    let open = store.create_struct_type("Open", 4, false);
    let ptr = store.pointer_type_to(open.id());
    let mut names = TypeNameMap::new();

    assert_eq!(store.c_abi_declaration(open.id(), "x", &mut names), None);
    assert_eq!(store.c_abi_declaration(ptr, "p", &mut names), None);
    assert_eq!(store.c_abi_declaration(typebridge_core::TypeId::NULL, "n", &mut names), None);
}
