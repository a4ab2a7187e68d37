//! # Introspection
//!
//! Read-only queries the host debugger asks about types: classification,
//! sizes, children, fields, and signatures.
//!
//! Every query is total. The null handle, a handle of another store, or an
//! aggregate that is still open all produce a neutral answer (`None`,
//! `false`, `0`, or the `Default` variant of the classification enum).
//!
//! ## Typedef transparency
//!
//! Typedefs answer structural queries (size, format, children, fields,
//! predicates) with the answers of the type they alias. Only the identity
//! queries ([`TypeStore::type_name`], [`TypeStore::type_class`],
//! [`TypeStore::type_info`], [`TypeStore::is_typedef_type`]) see the typedef
//! itself. Chains are followed up to [`MAX_TYPEDEF_DEPTH`] links.

use crate::store::{TypeStore, VOID_TYPE_NAME};
use crate::types::{
    AggregateKind, BasicType, Encoding, Field, Format, TypeClass, TypeFlags, TypeId, TypeKind, TypeNode,
};

/// Longest typedef chain followed before giving up
pub const MAX_TYPEDEF_DEPTH: usize = 32;

/// Options for [`TypeStore::child_at_index`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChildOptions
{
    /// Expose the children of a pointed-to aggregate as the pointer's own
    pub transparent_pointers: bool,
    /// Synthesize array elements past the declared length
    pub ignore_array_bounds: bool,
}

/// A child synthesized for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildInfo
{
    /// Type of the child
    pub ty: TypeId,
    /// Display name (`field`, `[3]`, or `*parent`)
    pub name: String,
    /// Size of the child in bytes
    pub byte_size: u64,
    /// Offset from the start of the parent value (0 for dereferences)
    pub byte_offset: u64,
    /// The child is the value behind the parent pointer, not part of it
    pub is_deref_of_parent: bool,
}

impl TypeStore
{
    /// Follow typedefs from `id` to the first non-typedef node
    fn resolved(&self, id: TypeId) -> Option<(TypeId, &TypeNode)>
    {
        let mut current = id;
        for _ in 0..=MAX_TYPEDEF_DEPTH {
            let node = self.node(current)?;
            match node.kind() {
                TypeKind::Typedef { underlying } => current = *underlying,
                _ => return Some((current, node)),
            }
        }
        None
    }

    fn resolved_kind(&self, id: TypeId) -> Option<&TypeKind>
    {
        self.resolved(id).map(|(_, node)| node.kind())
    }

    // ----------------------------------------------------------------
    // Identity
    // ----------------------------------------------------------------

    /// Display name of a finished type
    #[must_use]
    pub fn type_name(&self, id: TypeId) -> Option<&str>
    {
        self.node(id).map(TypeNode::name)
    }

    /// The type with all typedef layers removed
    ///
    /// Returns [`TypeId::NULL`] for unknown handles.
    #[must_use]
    pub fn canonical_type(&self, id: TypeId) -> TypeId
    {
        self.resolved(id).map_or(TypeId::NULL, |(canonical, _)| canonical)
    }

    /// Every finished type whose display name is exactly `name`
    #[must_use]
    pub fn find_types_by_name(&self, name: &str) -> Vec<TypeId>
    {
        self.iter()
            .filter(|(_, node)| node.name() == name)
            .map(|(id, _)| id)
            .collect()
    }

    /// Classification bits of the node itself (typedefs report `IS_TYPEDEF`)
    #[must_use]
    pub fn type_info(&self, id: TypeId) -> TypeFlags
    {
        self.type_info_and_pointee(id).0
    }

    /// Classification bits plus the pointee (pointers) or element (arrays)
    #[must_use]
    pub fn type_info_and_pointee(&self, id: TypeId) -> (TypeFlags, Option<TypeId>)
    {
        let Some(node) = self.node(id) else {
            return (TypeFlags::empty(), None);
        };
        let pointee = match node.kind() {
            TypeKind::Pointer { pointee, .. } => Some(*pointee),
            TypeKind::Array { element, .. } => Some(*element),
            _ => None,
        };
        (node.kind().flags(), pointee)
    }

    /// Coarse classification of the node itself
    #[must_use]
    pub fn type_class(&self, id: TypeId) -> TypeClass
    {
        match self.node(id).map(TypeNode::kind) {
            None => TypeClass::Invalid,
            Some(TypeKind::Bool | TypeKind::Integral { .. } | TypeKind::Float { .. }) => TypeClass::Builtin,
            Some(TypeKind::Pointer { .. }) => TypeClass::Pointer,
            Some(TypeKind::Array { .. }) => TypeClass::Array,
            Some(TypeKind::Aggregate(_)) => TypeClass::Struct,
            Some(TypeKind::CLikeEnum { .. }) => TypeClass::Enumeration,
            Some(TypeKind::Function(_)) => TypeClass::Function,
            Some(TypeKind::Typedef { .. }) => TypeClass::Typedef,
        }
    }

    /// Basic type recognised by name: `()` is void, `bool` is bool
    #[must_use]
    pub fn basic_type(&self, id: TypeId) -> BasicType
    {
        match self.type_name(id) {
            Some(VOID_TYPE_NAME) => BasicType::Void,
            Some("bool") => BasicType::Bool,
            _ => BasicType::Invalid,
        }
    }

    // ----------------------------------------------------------------
    // Size and representation
    // ----------------------------------------------------------------

    /// Size of a value in bytes
    ///
    /// Arrays multiply the element size by the length; typedefs and C-like
    /// enums report the size of their underlying type.
    #[must_use]
    pub fn byte_size(&self, id: TypeId) -> Option<u64>
    {
        self.byte_size_at_depth(id, 0)
    }

    fn byte_size_at_depth(&self, id: TypeId, depth: usize) -> Option<u64>
    {
        if depth > MAX_TYPEDEF_DEPTH {
            return None;
        }
        match self.node(id)?.kind() {
            TypeKind::Bool => Some(1),
            TypeKind::Integral { byte_size, .. }
            | TypeKind::Float { byte_size }
            | TypeKind::Pointer { byte_size, .. } => Some(*byte_size),
            TypeKind::Array { element, length } => self.byte_size_at_depth(*element, depth + 1)?.checked_mul(*length),
            TypeKind::Aggregate(aggregate) => Some(aggregate.byte_size()),
            TypeKind::Function(function) => Some(function.byte_size),
            TypeKind::CLikeEnum { underlying, .. } | TypeKind::Typedef { underlying } => {
                self.byte_size_at_depth(*underlying, depth + 1)
            }
        }
    }

    /// Size of a value in bits
    #[must_use]
    pub fn bit_size(&self, id: TypeId) -> Option<u64>
    {
        self.byte_size(id)?.checked_mul(8)
    }

    /// Default display format
    #[must_use]
    pub fn format(&self, id: TypeId) -> Format
    {
        match self.resolved_kind(id) {
            None => Format::Default,
            Some(TypeKind::Bool) => Format::Boolean,
            Some(TypeKind::Integral { is_char: true, .. }) => Format::Unicode32,
            Some(TypeKind::Integral { signed: true, .. }) => Format::Decimal,
            Some(TypeKind::Integral { .. }) => Format::Unsigned,
            Some(TypeKind::Float { .. }) => Format::Float,
            Some(TypeKind::Pointer { .. }) => Format::Pointer,
            Some(TypeKind::CLikeEnum { .. }) => Format::Enum,
            Some(TypeKind::Array { .. } | TypeKind::Aggregate(_) | TypeKind::Function(_) | TypeKind::Typedef { .. }) => {
                Format::Bytes
            }
        }
    }

    /// Machine encoding of a value
    #[must_use]
    pub fn encoding(&self, id: TypeId) -> Encoding
    {
        match self.resolved_kind(id) {
            Some(TypeKind::Integral { signed: true, .. }) => Encoding::Sint,
            Some(TypeKind::Integral { .. } | TypeKind::Bool | TypeKind::Pointer { .. }) => Encoding::Uint,
            Some(TypeKind::Float { .. }) => Encoding::Ieee754,
            _ => Encoding::Invalid,
        }
    }

    // ----------------------------------------------------------------
    // Predicates
    // ----------------------------------------------------------------

    /// Struct, tuple, union, enum, or array
    #[must_use]
    pub fn is_aggregate_type(&self, id: TypeId) -> bool
    {
        matches!(self.resolved_kind(id), Some(TypeKind::Aggregate(_) | TypeKind::Array { .. }))
    }

    /// Bool, integer, char, or C-like enum
    #[must_use]
    pub fn is_scalar_type(&self, id: TypeId) -> bool
    {
        self.resolved_kind(id)
            .is_some_and(|kind| kind.flags().contains(TypeFlags::IS_SCALAR))
    }

    /// Integer (chars included, bools and C-like enums excluded)
    #[must_use]
    pub fn is_integer_type(&self, id: TypeId) -> bool
    {
        matches!(self.resolved_kind(id), Some(TypeKind::Integral { .. }))
    }

    /// Signed integer, or C-like enum stored as one
    #[must_use]
    pub fn is_signed(&self, id: TypeId) -> bool
    {
        match self.resolved_kind(id) {
            Some(TypeKind::Integral { signed, .. }) => *signed,
            Some(TypeKind::CLikeEnum { underlying, .. }) => self.is_signed(*underlying),
            _ => false,
        }
    }

    /// Unicode scalar type
    #[must_use]
    pub fn is_char_type(&self, id: TypeId) -> bool
    {
        matches!(self.resolved_kind(id), Some(TypeKind::Integral { is_char: true, .. }))
    }

    /// Boolean
    #[must_use]
    pub fn is_boolean_type(&self, id: TypeId) -> bool
    {
        matches!(self.resolved_kind(id), Some(TypeKind::Bool))
    }

    /// Floating point; `f32` and `f64` alike
    #[must_use]
    pub fn is_floating_point_type(&self, id: TypeId) -> bool
    {
        matches!(self.resolved_kind(id), Some(TypeKind::Float { .. }))
    }

    /// Pointer or reference
    #[must_use]
    pub fn is_pointer_type(&self, id: TypeId) -> bool
    {
        matches!(self.resolved_kind(id), Some(TypeKind::Pointer { .. }))
    }

    /// Function signature
    #[must_use]
    pub fn is_function_type(&self, id: TypeId) -> bool
    {
        matches!(self.resolved_kind(id), Some(TypeKind::Function(_)))
    }

    /// Pointer whose pointee is a function signature
    #[must_use]
    pub fn is_function_pointer_type(&self, id: TypeId) -> bool
    {
        self.pointee_type(id).is_some_and(|pointee| self.is_function_type(pointee))
    }

    /// Fixed-length array
    #[must_use]
    pub fn is_array_type(&self, id: TypeId) -> bool
    {
        matches!(self.resolved_kind(id), Some(TypeKind::Array { .. }))
    }

    /// The node itself is a typedef
    #[must_use]
    pub fn is_typedef_type(&self, id: TypeId) -> bool
    {
        matches!(self.node(id).map(TypeNode::kind), Some(TypeKind::Typedef { .. }))
    }

    /// The unit type: a tuple named `()` with no fields
    #[must_use]
    pub fn is_void_type(&self, id: TypeId) -> bool
    {
        self.resolved(id).is_some_and(|(_, node)| {
            node.name() == VOID_TYPE_NAME
                && node
                    .as_aggregate()
                    .is_some_and(|aggregate| aggregate.kind() == &AggregateKind::Tuple && aggregate.fields().is_empty())
        })
    }

    /// Tuple or tuple struct
    #[must_use]
    pub fn is_tuple_type(&self, id: TypeId) -> bool
    {
        matches!(
            self.resolved_kind(id),
            Some(TypeKind::Aggregate(aggregate)) if aggregate.kind() == &AggregateKind::Tuple
        )
    }

    /// The aggregate still carries a legacy discriminant as field 0
    #[must_use]
    pub fn has_discriminant(&self, id: TypeId) -> bool
    {
        self.resolved(id)
            .and_then(|(_, node)| node.as_aggregate())
            .is_some_and(|aggregate| aggregate.has_discriminant())
    }

    /// Homogeneous floating point aggregate detection is not supported
    #[must_use]
    pub fn is_homogeneous_aggregate(&self, _id: TypeId) -> Option<(TypeId, u32)>
    {
        None
    }

    /// Register passing is never claimed, so the host always goes through memory
    #[must_use]
    pub fn can_pass_in_registers(&self, _id: TypeId) -> bool
    {
        false
    }

    // ----------------------------------------------------------------
    // Component accessors
    // ----------------------------------------------------------------

    /// Pointee of a pointer
    #[must_use]
    pub fn pointee_type(&self, id: TypeId) -> Option<TypeId>
    {
        match self.resolved_kind(id)? {
            TypeKind::Pointer { pointee, .. } => Some(*pointee),
            _ => None,
        }
    }

    /// Element type and length of an array
    #[must_use]
    pub fn array_info(&self, id: TypeId) -> Option<(TypeId, u64)>
    {
        match self.resolved_kind(id)? {
            TypeKind::Array { element, length } => Some((*element, *length)),
            _ => None,
        }
    }

    /// Element type of an array
    #[must_use]
    pub fn array_element_type(&self, id: TypeId) -> Option<TypeId>
    {
        self.array_info(id).map(|(element, _)| element)
    }

    /// Type aliased by a typedef (one level)
    #[must_use]
    pub fn typedef_underlying_type(&self, id: TypeId) -> Option<TypeId>
    {
        match self.node(id)?.kind() {
            TypeKind::Typedef { underlying } => Some(*underlying),
            _ => None,
        }
    }

    /// Number of parameters of a function signature
    #[must_use]
    pub fn function_argument_count(&self, id: TypeId) -> Option<usize>
    {
        match self.resolved_kind(id)? {
            TypeKind::Function(function) => Some(function.params.len()),
            _ => None,
        }
    }

    /// Parameter `index` of a function signature
    #[must_use]
    pub fn function_argument_at(&self, id: TypeId, index: usize) -> Option<TypeId>
    {
        match self.resolved_kind(id)? {
            TypeKind::Function(function) => function.params.get(index).copied(),
            _ => None,
        }
    }

    /// Return type of a function signature
    #[must_use]
    pub fn function_return_type(&self, id: TypeId) -> Option<TypeId>
    {
        match self.resolved_kind(id)? {
            TypeKind::Function(function) => Some(function.return_type),
            _ => None,
        }
    }

    /// Number of generic arguments of an aggregate or function
    #[must_use]
    pub fn template_argument_count(&self, id: TypeId) -> usize
    {
        self.template_args(id).len()
    }

    /// Generic argument `index` of an aggregate or function
    #[must_use]
    pub fn template_argument_at(&self, id: TypeId, index: usize) -> Option<TypeId>
    {
        self.template_args(id).get(index).copied()
    }

    fn template_args(&self, id: TypeId) -> &[TypeId]
    {
        match self.resolved_kind(id) {
            Some(TypeKind::Aggregate(aggregate)) => aggregate.template_args(),
            Some(TypeKind::Function(function)) => function.template_args.as_slice(),
            _ => &[],
        }
    }

    /// Number of fields of an aggregate (variants, for enums)
    #[must_use]
    pub fn num_fields(&self, id: TypeId) -> usize
    {
        self.fields(id).len()
    }

    /// Field `index` of an aggregate
    #[must_use]
    pub fn field_at_index(&self, id: TypeId, index: usize) -> Option<&Field>
    {
        self.fields(id).get(index)
    }

    fn fields(&self, id: TypeId) -> &[Field]
    {
        match self.resolved_kind(id) {
            Some(TypeKind::Aggregate(aggregate)) => aggregate.fields(),
            _ => &[],
        }
    }

    // ----------------------------------------------------------------
    // Children
    // ----------------------------------------------------------------

    /// Number of children the host should display for a value of this type
    ///
    /// - aggregates: their field count
    /// - arrays: their length
    /// - pointers: 0 when the pointee is void or unknown, otherwise the
    ///   pointee's child count, or 1 (the dereferenced value) when that is 0
    /// - typedefs: the aliased type's count
    /// - everything else: 0
    #[must_use]
    pub fn num_children(&self, id: TypeId, omit_empty_base_classes: bool) -> usize
    {
        self.num_children_at_depth(id, omit_empty_base_classes, 0)
    }

    fn num_children_at_depth(&self, id: TypeId, omit_empty_base_classes: bool, depth: usize) -> usize
    {
        if depth > MAX_TYPEDEF_DEPTH {
            return 0;
        }
        let Some((_, node)) = self.resolved(id) else {
            return 0;
        };
        match node.kind() {
            TypeKind::Aggregate(aggregate) => aggregate.fields().len(),
            TypeKind::Array { length, .. } => usize::try_from(*length).unwrap_or(usize::MAX),
            TypeKind::Pointer { pointee, .. } => {
                if !self.is_complete(*pointee) || self.is_void_type(*pointee) {
                    return 0;
                }
                match self.num_children_at_depth(*pointee, omit_empty_base_classes, depth + 1) {
                    0 => 1,
                    count => count,
                }
            }
            _ => 0,
        }
    }

    /// Synthesize child `index` of a value of this type
    ///
    /// `parent_name` is the name of the value being expanded; it is used to
    /// name the dereference child of a pointer (`*parent`).
    ///
    /// ## Example
    ///
    /// ```rust
    /// use typebridge_core::introspect::ChildOptions;
    /// use typebridge_core::store::TypeStore;
    ///
    /// let mut store = TypeStore::new(8);
    /// let u64_ty = store.create_intrinsic_integral_type(false, 8);
    /// let array = store.create_array_type(u64_ty, 5);
    ///
    /// let child = store.child_at_index(array, 3, "values", ChildOptions::default()).unwrap();
    /// assert_eq!(child.name, "[3]");
    /// assert_eq!(child.byte_offset, 24);
    /// ```
    #[must_use]
    pub fn child_at_index(&self, id: TypeId, index: usize, parent_name: &str, options: ChildOptions) -> Option<ChildInfo>
    {
        let (_, node) = self.resolved(id)?;
        match node.kind() {
            TypeKind::Aggregate(aggregate) => {
                let field = aggregate.fields().get(index)?;
                Some(ChildInfo {
                    ty: field.ty,
                    name: field.name.clone(),
                    byte_size: self.byte_size(field.ty).unwrap_or(0),
                    byte_offset: field.offset,
                    is_deref_of_parent: false,
                })
            }
            TypeKind::Pointer { pointee, .. } => {
                let pointee = *pointee;
                if !self.is_valid(pointee) || self.is_void_type(pointee) {
                    return None;
                }
                if options.transparent_pointers && self.is_aggregate_type(pointee) {
                    return self.child_at_index(pointee, index, parent_name, options);
                }
                if index != 0 || !self.is_complete(pointee) {
                    return None;
                }
                let name = if parent_name.is_empty() {
                    String::new()
                } else {
                    format!("*{parent_name}")
                };
                Some(ChildInfo {
                    ty: pointee,
                    name,
                    byte_size: self.byte_size(pointee).unwrap_or(0),
                    byte_offset: 0,
                    is_deref_of_parent: true,
                })
            }
            TypeKind::Array { element, length } => {
                let element = *element;
                let in_bounds = u64::try_from(index).is_ok_and(|index| index < *length);
                if !(in_bounds || options.ignore_array_bounds) || !self.is_complete(element) {
                    return None;
                }
                let byte_size = self.byte_size(element).unwrap_or(0);
                let byte_offset = u64::try_from(index).ok()?.checked_mul(byte_size)?;
                Some(ChildInfo {
                    ty: element,
                    name: format!("[{index}]"),
                    byte_size,
                    byte_offset,
                    is_deref_of_parent: false,
                })
            }
            _ => None,
        }
    }

    /// Index of the direct child called `name`
    ///
    /// Pointers answer for their pointee; typedefs for the aliased type.
    #[must_use]
    pub fn index_of_child_with_name(&self, id: TypeId, name: &str, omit_empty_base_classes: bool) -> Option<usize>
    {
        self.index_of_child_at_depth(id, name, omit_empty_base_classes, 0)
    }

    fn index_of_child_at_depth(&self, id: TypeId, name: &str, omit_empty_base_classes: bool, depth: usize) -> Option<usize>
    {
        if depth > MAX_TYPEDEF_DEPTH {
            return None;
        }
        match self.resolved_kind(id)? {
            TypeKind::Aggregate(aggregate) => aggregate.fields().iter().position(|field| field.name == name),
            TypeKind::Pointer { pointee, .. } => {
                self.index_of_child_at_depth(*pointee, name, omit_empty_base_classes, depth + 1)
            }
            _ => None,
        }
    }

    /// Index path to the member called `name`: empty, or one element
    #[must_use]
    pub fn index_of_child_member_with_name(&self, id: TypeId, name: &str, omit_empty_base_classes: bool) -> Vec<usize>
    {
        self.index_of_child_with_name(id, name, omit_empty_base_classes)
            .into_iter()
            .collect()
    }

    // ----------------------------------------------------------------
    // Enums
    // ----------------------------------------------------------------

    /// Offset and width of a tagged enum's discriminant
    #[must_use]
    pub fn enum_discriminant_location(&self, id: TypeId) -> Option<(u64, u64)>
    {
        let layout = self.resolved(id)?.1.as_aggregate()?.enum_layout()?;
        Some((layout.discr_offset(), layout.discr_byte_size()))
    }

    /// Payload type of the variant selected by `discriminant`
    ///
    /// An explicit mapping wins; otherwise the default variant, if any.
    #[must_use]
    pub fn find_enum_variant(&self, id: TypeId, discriminant: u64) -> Option<TypeId>
    {
        let aggregate = self.resolved(id)?.1.as_aggregate()?;
        let layout = aggregate.enum_layout()?;
        let index = layout
            .variant_for_value(discriminant)
            .or_else(|| layout.default_variant())?;
        aggregate.fields().get(index).map(|field| field.ty)
    }
}
