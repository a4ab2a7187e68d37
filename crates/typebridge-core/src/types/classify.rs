//! Classification enums reported to the host debugger.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Static classification bits of a type
    ///
    /// Returned by [`TypeStore::type_info`](crate::store::TypeStore::type_info).
    /// The set is a pure function of the node's kind (and, for integers, its
    /// signedness).
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u32
    {
        /// Primitive type provided by the language
        const IS_BUILTIN = 1 << 0;
        /// Values of this type can be displayed as a single value
        const HAS_VALUE = 1 << 1;
        /// Scalar (integer, bool, char, C-like enum)
        const IS_SCALAR = 1 << 2;
        /// Struct, tuple, union, or tagged enum
        const IS_STRUCT_UNION = 1 << 3;
        /// Fixed-length array
        const IS_ARRAY = 1 << 4;
        /// Pointer or reference
        const IS_POINTER = 1 << 5;
        /// Integer
        const IS_INTEGER = 1 << 6;
        /// Signed integer
        const IS_SIGNED = 1 << 7;
        /// Floating point number
        const IS_FLOAT = 1 << 8;
        /// Values have children the host can expand
        const HAS_CHILDREN = 1 << 9;
        /// C-like enumeration
        const IS_ENUMERATION = 1 << 10;
        /// Function signature
        const IS_FUNC_PROTOTYPE = 1 << 11;
        /// Typedef
        const IS_TYPEDEF = 1 << 12;
    }
}

/// Default display format for values of a type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Format
{
    /// Let the type decide
    #[default]
    Default,
    /// `true` / `false`
    Boolean,
    /// Signed decimal
    Decimal,
    /// Unsigned decimal
    Unsigned,
    /// Hexadecimal
    Hex,
    /// Unicode scalar rendered as a char literal
    Unicode32,
    /// Floating point
    Float,
    /// Address
    Pointer,
    /// Enumerator name
    Enum,
    /// Raw bytes
    Bytes,
}

impl fmt::Display for Format
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            Format::Default => "default",
            Format::Boolean => "boolean",
            Format::Decimal => "decimal",
            Format::Unsigned => "unsigned",
            Format::Hex => "hex",
            Format::Unicode32 => "unicode32",
            Format::Float => "float",
            Format::Pointer => "pointer",
            Format::Enum => "enum",
            Format::Bytes => "bytes",
        };
        write!(f, "{label}")
    }
}

/// Machine-level encoding of a value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Encoding
{
    /// Not a scalar (aggregates, arrays, functions)
    #[default]
    Invalid,
    /// Two's complement signed integer
    Sint,
    /// Unsigned integer (also bools and pointers)
    Uint,
    /// IEEE-754 float
    Ieee754,
}

/// Coarse classification of a type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TypeClass
{
    /// Unknown or unfinished type
    #[default]
    Invalid,
    /// Bool, integer, char, float
    Builtin,
    /// Pointer or reference
    Pointer,
    /// Fixed-length array
    Array,
    /// Struct, tuple, union, or tagged enum
    Struct,
    /// C-like enumeration
    Enumeration,
    /// Function signature
    Function,
    /// Typedef
    Typedef,
}

impl fmt::Display for TypeClass
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            TypeClass::Invalid => "invalid",
            TypeClass::Builtin => "builtin",
            TypeClass::Pointer => "pointer",
            TypeClass::Array => "array",
            TypeClass::Struct => "struct",
            TypeClass::Enumeration => "enum",
            TypeClass::Function => "function",
            TypeClass::Typedef => "typedef",
        };
        write!(f, "{label}")
    }
}

/// Basic types the host evaluator knows by name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BasicType
{
    /// Not a basic type
    #[default]
    Invalid,
    /// The unit type `()`
    Void,
    /// `bool`
    Bool,
}
