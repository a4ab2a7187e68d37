//! # Declaration Contexts
//!
//! Namespaces and the named declarations (functions, statics) inside them.
//!
//! The tree is an arena: contexts and declarations are addressed by small
//! index handles, every node keeps a back-reference to its parent, and each
//! context maps child names to child handles. The root context is the
//! translation unit, whose name is empty.
//!
//! Qualified names are computed on first request and memoized per node:
//!
//! ```text
//! ""                  translation unit
//! └── std             "std"
//!     └── fmt         "std::fmt"
//!         └── write   "std::fmt::write"   (declaration)
//! ```

use std::collections::BTreeMap;

use once_cell::unsync::OnceCell;
use rustc_demangle::try_demangle;

/// Handle to a namespace-like context
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeclContextId(u32);

/// Handle to a named declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeclId(u32);

/// A child of a context: either a nested context or a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclItem
{
    /// Nested namespace
    Context(DeclContextId),
    /// Declaration
    Decl(DeclId),
}

#[derive(Debug)]
enum NodeKind
{
    Context
    {
        children: BTreeMap<String, DeclItem>,
    },
    Decl
    {
        mangled: String,
    },
}

#[derive(Debug)]
struct DeclNode
{
    name: String,
    parent: Option<DeclContextId>,
    qualified: OnceCell<String>,
    kind: NodeKind,
}

/// Arena of declaration contexts rooted at the translation unit
///
/// ## Example
///
/// ```rust
/// use typebridge_core::decl::{DeclItem, DeclTree};
///
/// let mut tree = DeclTree::new();
/// let root = tree.translation_unit();
/// let std_ns = tree.namespace(root, "std");
/// let fmt_ns = tree.namespace(std_ns, "fmt");
/// let write = tree.decl(fmt_ns, "write", "_ZN3std3fmt5write17h0123456789abcdefE");
///
/// assert_eq!(tree.qualified_name(fmt_ns), "std::fmt");
/// assert_eq!(tree.decl_qualified_name(write), "std::fmt::write");
/// assert_eq!(tree.find_by_name(root, "std"), Some(DeclItem::Context(std_ns)));
/// ```
#[derive(Debug)]
pub struct DeclTree
{
    nodes: Vec<DeclNode>,
}

impl Default for DeclTree
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl DeclTree
{
    /// Create a tree holding only the translation unit
    #[must_use]
    pub fn new() -> Self
    {
        Self {
            nodes: vec![DeclNode {
                name: String::new(),
                parent: None,
                qualified: OnceCell::new(),
                kind: NodeKind::Context {
                    children: BTreeMap::new(),
                },
            }],
        }
    }

    /// The root context
    #[must_use]
    pub fn translation_unit(&self) -> DeclContextId
    {
        DeclContextId(0)
    }

    /// Number of contexts and declarations added below the root
    #[must_use]
    pub fn len(&self) -> usize
    {
        self.nodes.len().saturating_sub(1)
    }

    /// Whether nothing has been added below the root
    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }

    /// Get or create the namespace `name` inside `parent`
    ///
    /// If `parent` already maps `name` to a declaration, the mapping is
    /// replaced by a new namespace. An unknown `parent` falls back to the
    /// translation unit.
    pub fn namespace(&mut self, parent: DeclContextId, name: &str) -> DeclContextId
    {
        let parent = self.known_context(parent);
        if let Some(DeclItem::Context(existing)) = self.find_by_name(parent, name) {
            return existing;
        }
        let id = DeclContextId(self.push(name, parent, NodeKind::Context {
            children: BTreeMap::new(),
        }));
        self.link(parent, name, DeclItem::Context(id));
        id
    }

    /// Get or create the declaration `name` inside `parent`
    ///
    /// An existing declaration with the same name keeps its original mangled
    /// name. A namespace with the same name is replaced.
    pub fn decl(&mut self, parent: DeclContextId, name: &str, mangled: &str) -> DeclId
    {
        let parent = self.known_context(parent);
        if let Some(DeclItem::Decl(existing)) = self.find_by_name(parent, name) {
            return existing;
        }
        let id = DeclId(self.push(name, parent, NodeKind::Decl {
            mangled: mangled.to_string(),
        }));
        self.link(parent, name, DeclItem::Decl(id));
        id
    }

    /// Child of `context` called `name`
    #[must_use]
    pub fn find_by_name(&self, context: DeclContextId, name: &str) -> Option<DeclItem>
    {
        match &self.context_node(context)?.kind {
            NodeKind::Context { children } => children.get(name).copied(),
            NodeKind::Decl { .. } => None,
        }
    }

    /// Declarations visible as `name` directly inside `context`
    #[must_use]
    pub fn find_decls_by_name(&self, context: DeclContextId, name: &str) -> Vec<DeclId>
    {
        match self.find_by_name(context, name) {
            Some(DeclItem::Decl(decl)) => vec![decl],
            _ => Vec::new(),
        }
    }

    /// Children of `context` ordered by name
    pub fn children(&self, context: DeclContextId) -> impl Iterator<Item = (&str, DeclItem)> + '_
    {
        let children = match self.context_node(context).map(|node| &node.kind) {
            Some(NodeKind::Context { children }) => Some(children),
            _ => None,
        };
        children
            .into_iter()
            .flat_map(|children| children.iter().map(|(name, item)| (name.as_str(), *item)))
    }

    /// Unqualified name of a context (empty for the root and unknown handles)
    #[must_use]
    pub fn context_name(&self, context: DeclContextId) -> &str
    {
        self.context_node(context).map_or("", |node| node.name.as_str())
    }

    /// `::`-joined name of a context; the root contributes nothing
    #[must_use]
    pub fn qualified_name(&self, context: DeclContextId) -> &str
    {
        if self.context_node(context).is_none() {
            return "";
        }
        self.qualified(context.0)
    }

    /// Enclosing context, `None` for the root
    #[must_use]
    pub fn parent_context(&self, context: DeclContextId) -> Option<DeclContextId>
    {
        self.context_node(context)?.parent
    }

    /// Unqualified declaration name
    #[must_use]
    pub fn decl_name(&self, decl: DeclId) -> &str
    {
        self.decl_node(decl).map_or("", |node| node.name.as_str())
    }

    /// Fully qualified declaration name
    #[must_use]
    pub fn decl_qualified_name(&self, decl: DeclId) -> &str
    {
        if self.decl_node(decl).is_none() {
            return "";
        }
        self.qualified(decl.0)
    }

    /// Linkage name recorded for the declaration
    #[must_use]
    pub fn decl_mangled_name(&self, decl: DeclId) -> &str
    {
        match self.decl_node(decl).map(|node| &node.kind) {
            Some(NodeKind::Decl { mangled }) => mangled,
            _ => "",
        }
    }

    /// Demangled form of the linkage name, if it is a Rust symbol
    #[must_use]
    pub fn decl_demangled_name(&self, decl: DeclId) -> Option<String>
    {
        let mangled = self.decl_mangled_name(decl);
        try_demangle(mangled).ok().map(|demangled| format!("{demangled:#}"))
    }

    /// Context a declaration lives in
    #[must_use]
    pub fn decl_context(&self, decl: DeclId) -> Option<DeclContextId>
    {
        self.decl_node(decl)?.parent
    }

    fn known_context(&self, context: DeclContextId) -> DeclContextId
    {
        if self.context_node(context).is_some() {
            context
        } else {
            self.translation_unit()
        }
    }

    fn context_node(&self, context: DeclContextId) -> Option<&DeclNode>
    {
        let node = self.nodes.get(usize::try_from(context.0).ok()?)?;
        matches!(node.kind, NodeKind::Context { .. }).then_some(node)
    }

    fn decl_node(&self, decl: DeclId) -> Option<&DeclNode>
    {
        let node = self.nodes.get(usize::try_from(decl.0).ok()?)?;
        matches!(node.kind, NodeKind::Decl { .. }).then_some(node)
    }

    fn push(&mut self, name: &str, parent: DeclContextId, kind: NodeKind) -> u32
    {
        let index = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX);
        self.nodes.push(DeclNode {
            name: name.to_string(),
            parent: Some(parent),
            qualified: OnceCell::new(),
            kind,
        });
        index
    }

    fn link(&mut self, parent: DeclContextId, name: &str, item: DeclItem)
    {
        let Some(node) = usize::try_from(parent.0).ok().and_then(|index| self.nodes.get_mut(index)) else {
            return;
        };
        if let NodeKind::Context { children } = &mut node.kind {
            children.insert(name.to_string(), item);
        }
    }

    fn qualified(&self, index: u32) -> &str
    {
        let Some(node) = usize::try_from(index).ok().and_then(|index| self.nodes.get(index)) else {
            return "";
        };
        node.qualified.get_or_init(|| {
            let prefix = node.parent.map_or("", |parent| self.qualified(parent.0));
            if prefix.is_empty() {
                node.name.clone()
            } else {
                format!("{prefix}::{}", node.name)
            }
        })
    }
}
