//! Tests for the type store factories and handle validity

use typebridge_core::introspect::ChildOptions;
use typebridge_core::store::TypeStore;
use typebridge_core::types::{BasicType, TypeClass, TypeId};

#[test]
fn test_intrinsic_integral_names()
{
    let mut store = TypeStore::new(8);
    let i32_ty = store.create_intrinsic_integral_type(true, 4);
    let u8_ty = store.create_intrinsic_integral_type(false, 1);
    let u128_ty = store.create_intrinsic_integral_type(false, 16);

    assert_eq!(store.type_name(i32_ty), Some("i32"));
    assert_eq!(store.type_name(u8_ty), Some("u8"));
    assert_eq!(store.type_name(u128_ty), Some("u128"));
    assert!(store.is_signed(i32_ty));
    assert!(!store.is_signed(u8_ty));
    assert_eq!(store.byte_size(u128_ty), Some(16));
}

#[test]
fn test_char_type()
{
    let mut store = TypeStore::new(8);
    let ch = store.create_char_type();

    assert_eq!(store.type_name(ch), Some("char"));
    assert_eq!(store.byte_size(ch), Some(4));
    assert!(store.is_char_type(ch));
    assert!(store.is_integer_type(ch));
    assert!(!store.is_signed(ch));
}

#[test]
fn test_array_names()
{
    let mut store = TypeStore::new(8);
    let u8_ty = store.create_intrinsic_integral_type(false, 1);
    let fixed = store.create_array_type(u8_ty, 16);
    let unsized_ty = store.create_array_type(u8_ty, 0);

    assert_eq!(store.type_name(fixed), Some("[u8; 16]"));
    assert_eq!(store.type_name(unsized_ty), Some("[u8]"));
    assert_eq!(store.byte_size(fixed), Some(16));
    assert_eq!(store.byte_size(unsized_ty), Some(0));
}

#[test]
fn test_pointer_type_to_uses_pointer_width()
{
    let mut store = TypeStore::new(4);
    let u16_ty = store.create_intrinsic_integral_type(false, 2);
    let ptr = store.pointer_type_to(u16_ty);

    assert_eq!(store.type_name(ptr), Some("*mut u16"));
    assert_eq!(store.byte_size(ptr), Some(4));
    assert_eq!(store.pointee_type(ptr), Some(u16_ty));
    assert_eq!(store.type_class(ptr), TypeClass::Pointer);
}

#[test]
fn test_void_type()
{
    let mut store = TypeStore::new(8);
    let void = store.create_void_type();

    assert_eq!(store.type_name(void), Some("()"));
    assert!(store.is_void_type(void));
    assert!(store.is_tuple_type(void));
    assert_eq!(store.byte_size(void), Some(0));
    assert_eq!(store.basic_type(void), BasicType::Void);
}

#[test]
fn test_bool_basic_type()
{
    let mut store = TypeStore::new(8);
    let flag = store.create_bool_type("bool");
    let renamed = store.create_bool_type("Flag");

    assert_eq!(store.basic_type(flag), BasicType::Bool);
    assert_eq!(store.basic_type(renamed), BasicType::Invalid);
    assert!(store.is_boolean_type(renamed));
    assert_eq!(store.byte_size(flag), Some(1));
}

#[test]
fn test_function_type_size_is_pointer_width()
{
    let mut store = TypeStore::new(8);
    let i32_ty = store.create_intrinsic_integral_type(true, 4);
    let void = store.create_void_type();
    let func = store.create_function_type("fn(i32, i32)", void, [i32_ty, i32_ty], []);

    assert_eq!(store.byte_size(func), Some(8));
    assert_eq!(store.function_argument_count(func), Some(2));
    assert_eq!(store.function_argument_at(func, 1), Some(i32_ty));
    assert_eq!(store.function_argument_at(func, 2), None);
    assert_eq!(store.function_return_type(func), Some(void));
}

#[test]
fn test_every_factory_call_mints_a_new_handle()
{
    let mut store = TypeStore::new(8);
    let first = store.create_intrinsic_integral_type(true, 4);
    let second = store.create_intrinsic_integral_type(true, 4);

    assert_ne!(first, second);
    assert_eq!(store.find_types_by_name("i32"), vec![first, second]);
    assert_eq!(store.len(), 2);
}

#[test]
fn test_iter_in_creation_order()
{
    let mut store = TypeStore::new(8);
    let a = store.create_intrinsic_integral_type(false, 1);
    let b = store.create_bool_type("bool");
    let open = store.create_struct_type("Open", 0, false);

    let ids: Vec<TypeId> = store.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![a, b]);
    assert!(store.is_valid(open.id()));
}

#[test]
fn test_open_aggregate_is_valid_but_incomplete()
{
    let mut store = TypeStore::new(8);
    let builder = store.create_struct_type("Node", 16, false);
    let id = builder.id();

    assert!(store.is_valid(id));
    assert!(!store.is_complete(id));
    assert_eq!(store.type_name(id), None);
    assert_eq!(store.byte_size(id), None);
    assert_eq!(store.num_children(id, true), 0);
    assert_eq!(store.type_class(id), TypeClass::Invalid);

    let finished = store.finish(builder);
    assert_eq!(finished, id);
    assert!(store.is_complete(id));
    assert_eq!(store.byte_size(id), Some(16));
}

#[test]
fn test_recursive_type_through_pointer()
{
    let mut store = TypeStore::new(8);
    let i64_ty = store.create_intrinsic_integral_type(true, 8);
    let mut node = store.create_struct_type("Node", 16, false);
    let next = store.pointer_type_to(node.id());
    node.add_field("value", i64_ty, 0);
    node.add_field("next", next, 8);
    let node = store.finish(node);

    assert_eq!(store.type_name(next), Some("*mut Node"));
    assert_eq!(store.pointee_type(next), Some(node));
    assert_eq!(store.num_children(next, true), 2);
}

#[test]
fn test_foreign_handles_get_neutral_answers()
{
    let mut ours = TypeStore::new(8);
    let mut theirs = TypeStore::new(8);
    let foreign = theirs.create_intrinsic_integral_type(true, 4);
    ours.create_intrinsic_integral_type(true, 4);

    assert_ne!(ours.id(), theirs.id());
    assert!(!ours.is_valid(foreign));
    assert_eq!(ours.type_name(foreign), None);
    assert_eq!(ours.byte_size(foreign), None);
    assert_eq!(ours.type_class(foreign), TypeClass::Invalid);
    assert_eq!(ours.num_children(foreign, true), 0);
    assert!(!ours.is_integer_type(foreign));
    assert!(ours
        .child_at_index(foreign, 0, "x", ChildOptions::default())
        .is_none());
}

#[test]
fn test_null_handle_gets_neutral_answers()
{
    let store = TypeStore::new(8);

    assert!(!TypeId::NULL.is_valid());
    assert_eq!(TypeId::default(), TypeId::NULL);
    assert!(!store.is_valid(TypeId::NULL));
    assert_eq!(store.type_name(TypeId::NULL), None);
    assert_eq!(store.canonical_type(TypeId::NULL), TypeId::NULL);
    assert_eq!(store.num_fields(TypeId::NULL), 0);
    assert_eq!(store.template_argument_count(TypeId::NULL), 0);
    assert_eq!(TypeId::NULL.to_string(), "type#null");
}

#[test]
fn test_finishing_foreign_builder_returns_null()
{
    let mut ours = TypeStore::new(8);
    let mut theirs = TypeStore::new(8);
    let builder = theirs.create_struct_type("Elsewhere", 4, false);

    assert_eq!(ours.finish(builder), TypeId::NULL);
    assert!(ours.is_empty());
}
