//! # Type Store
//!
//! The arena that owns every type node and the declaration-context tree.
//!
//! Nodes live in a `Vec` and are addressed by [`TypeId`] handles that carry
//! the store's id plus the node's position. Nodes are never removed or
//! deduplicated: every factory call mints a new handle, so the store only
//! grows until it is dropped.
//!
//! ## Lifecycle
//!
//! Leaf kinds (bool, integers, floats, pointers, arrays, typedefs, functions,
//! C-like enums) are finished the moment they are created. Aggregates go
//! through an open phase driven by an [`AggregateBuilder`]:
//!
//! ```text
//! create_struct_type ──► Open ──(add_field …)──► finish ──► Finished
//! ```
//!
//! While a slot is open its handle can be referenced by other types, but
//! queries on it return neutral answers.
//!
//! ## Legacy discriminants
//!
//! Older compilers encoded enum variants as structs whose first field is the
//! discriminant. When an enum finishes, each variant payload flagged with
//! `has_discriminant` loses that first field. A payload that is itself still
//! open is marked, and the field is stripped when the payload finishes.

mod builder;

use std::collections::BTreeMap;

use smallvec::SmallVec;
use tracing::{debug, warn};

pub use builder::{AggregateBuilder, Discriminant};

use crate::decl::DeclTree;
use crate::types::{AggregateKind, EnumLayout, FunctionType, StoreId, TypeId, TypeKind, TypeNode};

/// Name of the unit type
pub const VOID_TYPE_NAME: &str = "()";

#[derive(Debug)]
enum Slot
{
    Open
    {
        name: String,
        strip_discriminant: bool,
    },
    Ready(TypeNode),
}

/// Owner of all type nodes for one debug-info source
///
/// ## Example
///
/// ```rust
/// use typebridge_core::store::TypeStore;
///
/// let mut store = TypeStore::new(8);
/// let i32_ty = store.create_intrinsic_integral_type(true, 4);
/// let mut point = store.create_struct_type("Point", 8, false);
/// point.add_field("x", i32_ty, 0);
/// point.add_field("y", i32_ty, 4);
/// let point = store.finish(point);
///
/// assert_eq!(store.type_name(point), Some("Point"));
/// assert_eq!(store.num_children(point, true), 2);
/// ```
#[derive(Debug)]
pub struct TypeStore
{
    id: StoreId,
    pointer_byte_size: u64,
    slots: Vec<Slot>,
    decls: DeclTree,
}

impl TypeStore
{
    /// Create an empty store for a target whose pointers are `pointer_byte_size` wide
    #[must_use]
    pub fn new(pointer_byte_size: u64) -> Self
    {
        let id = StoreId::allocate();
        debug!(store = id.value(), pointer_byte_size, "created type store");
        Self {
            id,
            pointer_byte_size,
            slots: Vec::new(),
            decls: DeclTree::new(),
        }
    }

    /// Identity of this store
    #[must_use]
    pub fn id(&self) -> StoreId
    {
        self.id
    }

    /// Pointer width of the target
    #[must_use]
    pub fn pointer_byte_size(&self) -> u64
    {
        self.pointer_byte_size
    }

    /// Number of nodes (open or finished) owned by this store
    #[must_use]
    pub fn len(&self) -> usize
    {
        self.slots.len()
    }

    /// Whether the store owns no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.slots.is_empty()
    }

    /// Declaration-context tree
    #[must_use]
    pub fn decls(&self) -> &DeclTree
    {
        &self.decls
    }

    /// Mutable declaration-context tree
    pub fn decls_mut(&mut self) -> &mut DeclTree
    {
        &mut self.decls
    }

    /// Whether `id` names a node of this store (open or finished)
    #[must_use]
    pub fn is_valid(&self, id: TypeId) -> bool
    {
        self.slot_index(id).is_some()
    }

    /// Whether `id` names a finished node of this store
    #[must_use]
    pub fn is_complete(&self, id: TypeId) -> bool
    {
        self.node(id).is_some()
    }

    /// Finished node behind `id`
    ///
    /// Returns `None` for the null handle, handles of other stores, and
    /// aggregates that are still open.
    #[must_use]
    pub fn node(&self, id: TypeId) -> Option<&TypeNode>
    {
        match self.slots.get(self.slot_index(id)?)? {
            Slot::Ready(node) => Some(node),
            Slot::Open { .. } => None,
        }
    }

    /// Handles of every finished node, in creation order
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeNode)> + '_
    {
        self.slots.iter().enumerate().filter_map(move |(index, slot)| match slot {
            Slot::Ready(node) => Some((TypeId::new(self.id, index_to_u32(index)), node)),
            Slot::Open { .. } => None,
        })
    }

    /// Name of `id`, including aggregates that are still open
    pub(crate) fn name_of(&self, id: TypeId) -> Option<&str>
    {
        match self.slots.get(self.slot_index(id)?)? {
            Slot::Ready(node) => Some(node.name()),
            Slot::Open { name, .. } => Some(name),
        }
    }

    fn slot_index(&self, id: TypeId) -> Option<usize>
    {
        if id.store() != self.id {
            return None;
        }
        let index = usize::try_from(id.index()).ok()?;
        (index < self.slots.len()).then_some(index)
    }

    fn next_id(&self) -> TypeId
    {
        TypeId::new(self.id, index_to_u32(self.slots.len()))
    }

    fn insert(&mut self, node: TypeNode) -> TypeId
    {
        let id = self.next_id();
        self.slots.push(Slot::Ready(node));
        id
    }

    fn reserve(&mut self, name: String) -> TypeId
    {
        let id = self.next_id();
        self.slots.push(Slot::Open {
            name,
            strip_discriminant: false,
        });
        id
    }

    // ----------------------------------------------------------------
    // Leaf factories
    // ----------------------------------------------------------------

    /// The unit type: an empty tuple named `()`
    pub fn create_void_type(&mut self) -> TypeId
    {
        let builder = self.create_tuple_type(VOID_TYPE_NAME, 0, false);
        self.finish(builder)
    }

    /// One-byte boolean
    pub fn create_bool_type(&mut self, name: impl Into<String>) -> TypeId
    {
        self.insert(TypeNode::new(name, TypeKind::Bool))
    }

    /// Fixed-width integer
    pub fn create_integral_type(&mut self, name: impl Into<String>, signed: bool, byte_size: u64, is_char: bool) -> TypeId
    {
        self.insert(TypeNode::new(
            name,
            TypeKind::Integral {
                signed,
                byte_size,
                is_char,
            },
        ))
    }

    /// Integer named after its width, e.g. `i32` or `u8`
    pub fn create_intrinsic_integral_type(&mut self, signed: bool, byte_size: u64) -> TypeId
    {
        let prefix = if signed { 'i' } else { 'u' };
        let name = format!("{prefix}{}", byte_size.saturating_mul(8));
        self.create_integral_type(name, signed, byte_size, false)
    }

    /// The 4-byte Unicode scalar type `char`
    pub fn create_char_type(&mut self) -> TypeId
    {
        self.create_integral_type("char", false, 4, true)
    }

    /// Floating point number
    pub fn create_float_type(&mut self, name: impl Into<String>, byte_size: u64) -> TypeId
    {
        self.insert(TypeNode::new(name, TypeKind::Float { byte_size }))
    }

    /// Fixed-length array, named `[T; N]` (or `[T]` when `length` is 0)
    pub fn create_array_type(&mut self, element: TypeId, length: u64) -> TypeId
    {
        let element_name = self.name_of(element).unwrap_or_default();
        let name = if length == 0 {
            format!("[{element_name}]")
        } else {
            format!("[{element_name}; {length}]")
        };
        self.insert(TypeNode::new(name, TypeKind::Array { element, length }))
    }

    /// Pointer or reference
    pub fn create_pointer_type(&mut self, name: impl Into<String>, pointee: TypeId, byte_size: u64) -> TypeId
    {
        self.insert(TypeNode::new(name, TypeKind::Pointer { pointee, byte_size }))
    }

    /// Pointer to `pointee` named `*mut T`, with the target's pointer width
    pub fn pointer_type_to(&mut self, pointee: TypeId) -> TypeId
    {
        let name = format!("*mut {}", self.name_of(pointee).unwrap_or_default());
        self.create_pointer_type(name, pointee, self.pointer_byte_size)
    }

    /// Named alias of `underlying`
    pub fn create_typedef_type(&mut self, name: impl Into<String>, underlying: TypeId) -> TypeId
    {
        self.insert(TypeNode::new(name, TypeKind::Typedef { underlying }))
    }

    /// Function signature; its size is the target's pointer width
    pub fn create_function_type(
        &mut self,
        name: impl Into<String>,
        return_type: TypeId,
        params: impl IntoIterator<Item = TypeId>,
        template_args: impl IntoIterator<Item = TypeId>,
    ) -> TypeId
    {
        let function = FunctionType {
            byte_size: self.pointer_byte_size,
            return_type,
            params: params.into_iter().collect(),
            template_args: template_args.into_iter().collect::<SmallVec<_>>(),
        };
        self.insert(TypeNode::new(name, TypeKind::Function(function)))
    }

    /// Enumeration without payloads, stored as `underlying`
    pub fn create_c_like_enum_type(
        &mut self,
        name: impl Into<String>,
        underlying: TypeId,
        values: impl IntoIterator<Item = (u64, String)>,
    ) -> TypeId
    {
        let values: BTreeMap<u64, String> = values.into_iter().collect();
        self.insert(TypeNode::new(name, TypeKind::CLikeEnum { underlying, values }))
    }

    // ----------------------------------------------------------------
    // Aggregates
    // ----------------------------------------------------------------

    /// Begin a struct with named fields
    pub fn create_struct_type(&mut self, name: impl Into<String>, byte_size: u64, has_discriminant: bool) -> AggregateBuilder
    {
        self.open_aggregate(name.into(), AggregateKind::Struct, byte_size, has_discriminant)
    }

    /// Begin a tuple (or tuple struct)
    pub fn create_tuple_type(&mut self, name: impl Into<String>, byte_size: u64, has_discriminant: bool) -> AggregateBuilder
    {
        self.open_aggregate(name.into(), AggregateKind::Tuple, byte_size, has_discriminant)
    }

    /// Begin a union
    pub fn create_union_type(&mut self, name: impl Into<String>, byte_size: u64) -> AggregateBuilder
    {
        self.open_aggregate(name.into(), AggregateKind::Union, byte_size, false)
    }

    /// Begin a tagged enum whose discriminant lives at `discr_offset`
    ///
    /// A `discr_byte_size` of 0 means the enum carries no discriminant (it
    /// has a single variant).
    pub fn create_enum_type(&mut self, name: impl Into<String>, byte_size: u64, discr_offset: u64, discr_byte_size: u64) -> AggregateBuilder
    {
        let layout = EnumLayout::new(discr_offset, discr_byte_size);
        self.open_aggregate(name.into(), AggregateKind::Enum(layout), byte_size, false)
    }

    fn open_aggregate(&mut self, name: String, kind: AggregateKind, byte_size: u64, has_discriminant: bool) -> AggregateBuilder
    {
        let id = self.reserve(name.clone());
        AggregateBuilder::new(id, name, kind, byte_size, has_discriminant)
    }

    /// Install the aggregate described by `builder` and return its handle
    ///
    /// Enums immediately run [`finish_aggregate_initialization`]. A builder
    /// minted by a different store is rejected with [`TypeId::NULL`].
    ///
    /// [`finish_aggregate_initialization`]: TypeStore::finish_aggregate_initialization
    pub fn finish(&mut self, builder: AggregateBuilder) -> TypeId
    {
        let AggregateBuilder {
            id,
            name,
            mut aggregate,
        } = builder;

        let Some(index) = self.slot_index(id) else {
            warn!(type_id = %id, name = %name, "finishing an aggregate that belongs to another store");
            return TypeId::NULL;
        };

        let strip = match &self.slots[index] {
            Slot::Open { strip_discriminant, .. } => *strip_discriminant,
            Slot::Ready(_) => {
                warn!(type_id = %id, name = %name, "aggregate finished twice");
                return id;
            }
        };
        if strip {
            aggregate.drop_discriminant();
        }

        let is_enum = matches!(aggregate.kind, AggregateKind::Enum(_));
        debug!(
            type_id = %id,
            name = %name,
            fields = aggregate.fields.len(),
            "finished aggregate"
        );
        self.slots[index] = Slot::Ready(TypeNode::new(name, TypeKind::Aggregate(aggregate)));

        if is_enum {
            self.finish_aggregate_initialization(id);
        }
        id
    }

    /// Strip legacy discriminant fields from every variant payload of an enum
    ///
    /// Idempotent: payloads lose their first field only while they still
    /// carry the `has_discriminant` flag. Non-enum and unknown handles are
    /// ignored.
    pub fn finish_aggregate_initialization(&mut self, id: TypeId)
    {
        let variants: Vec<TypeId> = match self.node(id).and_then(TypeNode::as_aggregate) {
            Some(aggregate) if aggregate.enum_layout().is_some() => aggregate.fields().iter().map(|field| field.ty).collect(),
            _ => return,
        };
        for variant in variants {
            self.drop_discriminant(variant);
        }
    }

    fn drop_discriminant(&mut self, id: TypeId)
    {
        let Some(index) = self.slot_index(id) else {
            return;
        };
        match &mut self.slots[index] {
            Slot::Open { strip_discriminant, .. } => *strip_discriminant = true,
            Slot::Ready(node) => {
                if let TypeKind::Aggregate(aggregate) = node.kind_mut() {
                    aggregate.drop_discriminant();
                }
            }
        }
    }
}

fn index_to_u32(index: usize) -> u32
{
    u32::try_from(index).unwrap_or(u32::MAX)
}
