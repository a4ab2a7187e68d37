//! Type node definitions.
//!
//! A type node is an immutable description of one source-language type once
//! its owning store has finished it. Nodes reference other nodes only through
//! [`TypeId`] handles, which is what lets recursive types (a struct holding a
//! pointer to itself) be represented without ownership cycles.
//!
//! ## Kinds
//!
//! | Kind | Payload |
//! |------|---------|
//! | `Bool` | nothing, always one byte |
//! | `Integral` | signedness, byte size, char flag |
//! | `Float` | byte size |
//! | `Pointer` | pointee, byte size |
//! | `Array` | element, length |
//! | `Aggregate` | struct, tuple, union, or tagged enum ([`AggregateType`]) |
//! | `CLikeEnum` | underlying integer, value → name map |
//! | `Function` | return type, parameters, template arguments |
//! | `Typedef` | underlying type |

use std::collections::{BTreeMap, HashMap};

use smallvec::SmallVec;

use super::classify::TypeFlags;
use super::id::TypeId;

/// A finished type node
#[derive(Debug, Clone, PartialEq)]
pub struct TypeNode
{
    name: String,
    kind: TypeKind,
}

impl TypeNode
{
    pub(crate) fn new(name: impl Into<String>, kind: TypeKind) -> Self
    {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Display name of the type (may be empty for anonymous tuples)
    #[must_use]
    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// Kind-specific payload
    #[must_use]
    pub fn kind(&self) -> &TypeKind
    {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut TypeKind
    {
        &mut self.kind
    }

    /// Aggregate payload, if this node is a struct, tuple, union, or enum
    #[must_use]
    pub fn as_aggregate(&self) -> Option<&AggregateType>
    {
        match &self.kind {
            TypeKind::Aggregate(aggregate) => Some(aggregate),
            _ => None,
        }
    }
}

/// The closed set of type kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind
{
    /// One-byte boolean
    Bool,
    /// Fixed-width integer, optionally flagged as a character type
    Integral
    {
        /// Whether the integer is signed
        signed: bool,
        /// Width in bytes
        byte_size: u64,
        /// Whether values are Unicode scalar values (`char`)
        is_char: bool,
    },
    /// IEEE-754 floating point number
    Float
    {
        /// Width in bytes (4 or 8)
        byte_size: u64,
    },
    /// Raw pointer or reference
    Pointer
    {
        /// Type pointed to
        pointee: TypeId,
        /// Width of the pointer itself
        byte_size: u64,
    },
    /// Fixed-length array
    Array
    {
        /// Element type
        element: TypeId,
        /// Number of elements
        length: u64,
    },
    /// Struct, tuple, union, or tagged enum
    Aggregate(AggregateType),
    /// Enumeration whose variants carry no payload
    CLikeEnum
    {
        /// Integer type the values are stored as
        underlying: TypeId,
        /// Value → variant name
        values: BTreeMap<u64, String>,
    },
    /// Function signature
    Function(FunctionType),
    /// Named alias of another type
    Typedef
    {
        /// Aliased type
        underlying: TypeId,
    },
}

impl TypeKind
{
    /// Static classification bits for this kind
    ///
    /// Typedefs report only [`TypeFlags::IS_TYPEDEF`]; callers that want the
    /// classification of the aliased type resolve the typedef first.
    #[must_use]
    pub fn flags(&self) -> TypeFlags
    {
        match self {
            TypeKind::Bool => TypeFlags::IS_BUILTIN | TypeFlags::HAS_VALUE | TypeFlags::IS_SCALAR,
            TypeKind::Integral { signed, .. } => {
                let mut flags = TypeFlags::IS_BUILTIN | TypeFlags::HAS_VALUE | TypeFlags::IS_SCALAR | TypeFlags::IS_INTEGER;
                if *signed {
                    flags |= TypeFlags::IS_SIGNED;
                }
                flags
            }
            TypeKind::Float { .. } => TypeFlags::IS_BUILTIN | TypeFlags::HAS_VALUE | TypeFlags::IS_FLOAT,
            TypeKind::Pointer { .. } => TypeFlags::IS_BUILTIN | TypeFlags::HAS_VALUE | TypeFlags::IS_POINTER,
            TypeKind::Array { .. } => TypeFlags::HAS_CHILDREN | TypeFlags::IS_ARRAY,
            TypeKind::Aggregate(_) => TypeFlags::HAS_CHILDREN | TypeFlags::IS_STRUCT_UNION,
            TypeKind::CLikeEnum { .. } => TypeFlags::HAS_VALUE | TypeFlags::IS_ENUMERATION | TypeFlags::IS_SCALAR,
            TypeKind::Function(_) => TypeFlags::IS_FUNC_PROTOTYPE | TypeFlags::HAS_VALUE,
            TypeKind::Typedef { .. } => TypeFlags::IS_TYPEDEF,
        }
    }
}

/// A named, typed member of an aggregate at a byte offset
///
/// For enums each field is one variant: its type is the variant's payload
/// aggregate and its offset is normally 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field
{
    /// Field name (empty for unnamed fields)
    pub name: String,
    /// Field type
    pub ty: TypeId,
    /// Byte offset from the start of the aggregate
    pub offset: u64,
}

/// Which flavour of aggregate a node is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateKind
{
    /// Named fields in declaration order
    Struct,
    /// Positional fields; named `0`, `1`, ... once finished
    Tuple,
    /// Overlapping fields
    Union,
    /// Tagged sum type; fields are variants
    Enum(EnumLayout),
}

/// Discriminant location and value mapping of a tagged enum
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumLayout
{
    discr_offset: u64,
    discr_byte_size: u64,
    discriminants: HashMap<u64, usize>,
    default_variant: Option<usize>,
}

impl EnumLayout
{
    pub(crate) fn new(discr_offset: u64, discr_byte_size: u64) -> Self
    {
        Self {
            discr_offset,
            discr_byte_size,
            discriminants: HashMap::new(),
            default_variant: None,
        }
    }

    /// Byte offset of the discriminant inside the enum value
    #[must_use]
    pub fn discr_offset(&self) -> u64
    {
        self.discr_offset
    }

    /// Width of the discriminant in bytes (0 when the enum has none)
    #[must_use]
    pub fn discr_byte_size(&self) -> u64
    {
        self.discr_byte_size
    }

    /// Variant index registered for an explicit discriminant value
    ///
    /// Only the low `discr_byte_size` bytes of `value` are compared, so a
    /// sign-extended `-1` and the raw byte `0xff` of a one-byte tag select the
    /// same variant.
    #[must_use]
    pub fn variant_for_value(&self, value: u64) -> Option<usize>
    {
        self.discriminants.get(&self.truncate(value)).copied()
    }

    /// Variant used when no explicit mapping matches
    #[must_use]
    pub fn default_variant(&self) -> Option<usize>
    {
        self.default_variant
    }

    /// Record `value → variant`, returning the index it replaced, if any
    pub(crate) fn map_value(&mut self, value: u64, variant: usize) -> Option<usize>
    {
        let value = self.truncate(value);
        self.discriminants.insert(value, variant)
    }

    /// Keep the bits a `discr_byte_size`-wide read can produce
    fn truncate(&self, value: u64) -> u64
    {
        match self.discr_byte_size {
            1..=7 => value & ((1u64 << (self.discr_byte_size * 8)) - 1),
            _ => value,
        }
    }

    /// Record the default variant, returning the previous one, if any
    pub(crate) fn set_default(&mut self, variant: usize) -> Option<usize>
    {
        self.default_variant.replace(variant)
    }
}

/// Struct, tuple, union, or enum payload
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateType
{
    pub(crate) kind: AggregateKind,
    pub(crate) byte_size: u64,
    pub(crate) has_discriminant: bool,
    pub(crate) fields: Vec<Field>,
    pub(crate) template_args: SmallVec<[TypeId; 2]>,
}

impl AggregateType
{
    /// Aggregate flavour
    #[must_use]
    pub fn kind(&self) -> &AggregateKind
    {
        &self.kind
    }

    /// Total size in bytes
    #[must_use]
    pub fn byte_size(&self) -> u64
    {
        self.byte_size
    }

    /// Whether field 0 is still a legacy embedded discriminant
    #[must_use]
    pub fn has_discriminant(&self) -> bool
    {
        self.has_discriminant
    }

    /// Fields (variants, for enums) in insertion order
    #[must_use]
    pub fn fields(&self) -> &[Field]
    {
        &self.fields
    }

    /// Generic arguments in insertion order
    #[must_use]
    pub fn template_args(&self) -> &[TypeId]
    {
        &self.template_args
    }

    /// Enum layout, if this aggregate is a tagged enum
    #[must_use]
    pub fn enum_layout(&self) -> Option<&EnumLayout>
    {
        match &self.kind {
            AggregateKind::Enum(layout) => Some(layout),
            _ => None,
        }
    }

    /// Strip a legacy embedded discriminant
    ///
    /// Removes field 0 and clears the flag. Tuples get their remaining fields
    /// renamed `0`, `1`, ... so positional access keeps working. Calling this
    /// on an aggregate without the flag does nothing.
    pub(crate) fn drop_discriminant(&mut self)
    {
        if !self.has_discriminant {
            return;
        }
        self.has_discriminant = false;
        if !self.fields.is_empty() {
            self.fields.remove(0);
        }
        if self.kind == AggregateKind::Tuple {
            for (index, field) in self.fields.iter_mut().enumerate() {
                field.name = index.to_string();
            }
        }
    }
}

/// Function signature payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionType
{
    /// Size of a function value (the target's pointer width)
    pub byte_size: u64,
    /// Return type (the unit type for functions returning nothing)
    pub return_type: TypeId,
    /// Parameter types in order
    pub params: SmallVec<[TypeId; 4]>,
    /// Generic arguments in order
    pub template_args: SmallVec<[TypeId; 2]>,
}
