//! Tests for the declaration context tree

use typebridge_core::decl::{DeclItem, DeclTree};
use typebridge_core::store::TypeStore;

#[test]
fn test_root_is_translation_unit()
{
    let tree = DeclTree::new();
    let root = tree.translation_unit();

    assert_eq!(tree.context_name(root), "");
    assert_eq!(tree.qualified_name(root), "");
    assert_eq!(tree.parent_context(root), None);
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
}

#[test]
fn test_namespace_get_or_create()
{
    let mut tree = DeclTree::new();
    let root = tree.translation_unit();
    let first = tree.namespace(root, "core");
    let second = tree.namespace(root, "core");

    assert_eq!(first, second);
    assert_eq!(tree.len(), 1);
    assert!(!tree.is_empty());
    assert_eq!(tree.parent_context(first), Some(root));
}

#[test]
fn test_qualified_names()
{
    let mut tree = DeclTree::new();
    let root = tree.translation_unit();
    let core_ns = tree.namespace(root, "core");
    let option_ns = tree.namespace(core_ns, "option");
    let unwrap = tree.decl(option_ns, "unwrap", "");

    assert_eq!(tree.context_name(option_ns), "option");
    assert_eq!(tree.qualified_name(option_ns), "core::option");
    assert_eq!(tree.decl_name(unwrap), "unwrap");
    assert_eq!(tree.decl_qualified_name(unwrap), "core::option::unwrap");
    assert_eq!(tree.decl_context(unwrap), Some(option_ns));
    // Memoized answers stay stable.
    assert_eq!(tree.qualified_name(option_ns), "core::option");
}

#[test]
fn test_decl_keeps_first_mangled_name()
{
    let mut tree = DeclTree::new();
    let root = tree.translation_unit();
    let first = tree.decl(root, "main", "_ZN4demo4main17h0000000000000001E");
    let second = tree.decl(root, "main", "other");

    assert_eq!(first, second);
    assert_eq!(tree.decl_mangled_name(first), "_ZN4demo4main17h0000000000000001E");
    assert_eq!(tree.find_decls_by_name(root, "main"), vec![first]);
}

#[test]
fn test_demangled_name()
{
    let mut tree = DeclTree::new();
    let root = tree.translation_unit();
    let rust = tree.decl(root, "write", "_ZN3std3fmt5write17h0123456789abcdefE");
    let plain = tree.decl(root, "memcpy", "memcpy");

    assert_eq!(tree.decl_demangled_name(rust).as_deref(), Some("std::fmt::write"));
    assert_eq!(tree.decl_demangled_name(plain), None);
}

#[test]
fn test_kind_conflict_replaces_mapping()
{
    let mut tree = DeclTree::new();
    let root = tree.translation_unit();
    let decl = tree.decl(root, "shared", "");
    let ns = tree.namespace(root, "shared");

    assert_eq!(tree.find_by_name(root, "shared"), Some(DeclItem::Context(ns)));
    assert!(tree.find_decls_by_name(root, "shared").is_empty());
    // The replaced node still answers for itself.
    assert_eq!(tree.decl_name(decl), "shared");

    let again = tree.decl(root, "shared", "");
    assert_ne!(again, decl);
    assert_eq!(tree.find_by_name(root, "shared"), Some(DeclItem::Decl(again)));
}

#[test]
fn test_children_sorted_by_name()
{
    let mut tree = DeclTree::new();
    let root = tree.translation_unit();
    let zeta = tree.namespace(root, "zeta");
    let alpha = tree.decl(root, "alpha", "");

    let children: Vec<(&str, DeclItem)> = tree.children(root).collect();
    assert_eq!(children, vec![("alpha", DeclItem::Decl(alpha)), ("zeta", DeclItem::Context(zeta))]);
    assert_eq!(tree.children(zeta).count(), 0);
}

#[test]
fn test_store_owns_a_tree()
{
    let mut store = TypeStore::new(8);
    let root = store.decls().translation_unit();
    let ns = store.decls_mut().namespace(root, "app");

    assert_eq!(store.decls().qualified_name(ns), "app");
}
