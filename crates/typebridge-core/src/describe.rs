//! Human-readable rendering of types and scalar values.

use std::fmt::{self, Write};

use gimli::RunTimeEndian;

use crate::memory::read_unsigned_bytes;
use crate::store::TypeStore;
use crate::types::{AggregateKind, AggregateType, Format, TypeId, TypeKind, TypeNode};

const INDENT: &str = "  ";

/// Keyword printed before an aggregate's name
fn tag(aggregate: &AggregateType, name: &str) -> &'static str
{
    match aggregate.kind() {
        AggregateKind::Struct => "struct ",
        AggregateKind::Tuple if is_anonymous_tuple(name) => "",
        AggregateKind::Tuple => "struct ",
        AggregateKind::Union => "union ",
        AggregateKind::Enum(_) => "enum ",
    }
}

/// Tuples proper (as opposed to tuple structs) have no name or a `(..)` name
fn is_anonymous_tuple(name: &str) -> bool
{
    name.is_empty() || name.starts_with('(')
}

impl TypeStore
{
    /// Render a declaration-like description of a type
    ///
    /// Aggregates list one field per line:
    ///
    /// ```text
    /// struct Point {
    ///   x: i32,
    ///   y: i32
    /// }
    /// ```
    ///
    /// Anonymous tuples drop the keyword and name and use parentheses. Other
    /// kinds render as their name. Unknown handles render as an empty string.
    #[must_use]
    pub fn describe_type(&self, id: TypeId) -> String
    {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_description(id, &mut out);
        out
    }

    fn write_description(&self, id: TypeId, out: &mut impl Write) -> fmt::Result
    {
        let Some(node) = self.node(id) else {
            return Ok(());
        };
        let Some(aggregate) = node.as_aggregate() else {
            return out.write_str(node.name());
        };

        let tuple_like = aggregate.kind() == &AggregateKind::Tuple;
        out.write_str(tag(aggregate, node.name()))?;
        if !(tuple_like && is_anonymous_tuple(node.name())) {
            write!(out, "{} ", node.name())?;
        }
        let (opener, closer) = if tuple_like { ("(", ")") } else { ("{", "}") };
        out.write_str(opener)?;
        if aggregate.fields().is_empty() {
            return out.write_str(closer);
        }

        for (index, field) in aggregate.fields().iter().enumerate() {
            if index > 0 {
                out.write_char(',')?;
            }
            write!(out, "\n{INDENT}")?;
            if !field.name.is_empty() {
                write!(out, "{}: ", field.name)?;
            }
            out.write_str(self.type_name(field.ty).unwrap_or("<unknown>"))?;
        }
        write!(out, "\n{closer}")
    }

    /// Render a scalar value of type `id` stored in `data`
    ///
    /// Returns `Ok(false)` when the type has no scalar rendering (aggregates,
    /// arrays, functions, unknown handles) or `data` is too short. With
    /// [`Format::Default`] the type's own format is used.
    ///
    /// ## Errors
    ///
    /// Propagates errors from the sink.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use typebridge_core::store::TypeStore;
    /// use typebridge_core::types::Format;
    /// use typebridge_core::RunTimeEndian;
    ///
    /// let mut store = TypeStore::new(8);
    /// let ch = store.create_char_type();
    /// let mut out = String::new();
    /// assert!(store.dump_value(ch, &[0x0a, 0, 0, 0], RunTimeEndian::Little, Format::Default, &mut out).unwrap());
    /// assert_eq!(out, "'\\n'");
    /// ```
    pub fn dump_value(&self, id: TypeId, data: &[u8], endian: RunTimeEndian, format: Format, out: &mut impl Write) -> Result<bool, fmt::Error>
    {
        let Some((canonical, node)) = self.canonical_node(id) else {
            return Ok(false);
        };
        let format = if format == Format::Default { self.format(canonical) } else { format };
        let Some(byte_size) = self.byte_size(canonical) else {
            return Ok(false);
        };
        let Some(bytes) = usize::try_from(byte_size).ok().and_then(|size| data.get(..size)) else {
            return Ok(false);
        };

        match (node.kind(), format) {
            (TypeKind::Aggregate(_) | TypeKind::Array { .. } | TypeKind::Function(_), _) => Ok(false),
            (TypeKind::CLikeEnum { values, .. }, Format::Enum) => {
                let Ok(value) = read_unsigned_bytes(bytes, endian) else {
                    return Ok(false);
                };
                match values.get(&value) {
                    Some(variant) => write!(out, "{}::{variant}", node.name())?,
                    None => write!(out, "(invalid enum value) {value}")?,
                }
                Ok(true)
            }
            (TypeKind::Integral { is_char: true, .. }, Format::Unicode32) => {
                let Ok(value) = read_unsigned_bytes(bytes, endian) else {
                    return Ok(false);
                };
                write_char_literal(value, out)?;
                Ok(true)
            }
            (_, Format::Bytes) => {
                for (index, byte) in bytes.iter().enumerate() {
                    if index > 0 {
                        out.write_char(' ')?;
                    }
                    write!(out, "{byte:02x}")?;
                }
                Ok(true)
            }
            (_, Format::Float) => match bytes.len() {
                4 => {
                    let value = f32::from_bits(u32::try_from(read_or_zero(bytes, endian)).unwrap_or_default());
                    write!(out, "{value}")?;
                    Ok(true)
                }
                8 => {
                    write!(out, "{}", f64::from_bits(read_or_zero(bytes, endian)))?;
                    Ok(true)
                }
                _ => Ok(false),
            },
            (_, format) => {
                let Ok(value) = read_unsigned_bytes(bytes, endian) else {
                    return Ok(false);
                };
                match format {
                    Format::Boolean => write!(out, "{}", value != 0)?,
                    Format::Decimal => write!(out, "{}", sign_extend(value, bytes.len()))?,
                    Format::Hex => write!(out, "0x{value:x}")?,
                    Format::Pointer => write!(out, "0x{value:016x}")?,
                    _ => write!(out, "{value}")?,
                }
                Ok(true)
            }
        }
    }

    fn canonical_node(&self, id: TypeId) -> Option<(TypeId, &TypeNode)>
    {
        let canonical = self.canonical_type(id);
        Some((canonical, self.node(canonical)?))
    }
}

fn read_or_zero(bytes: &[u8], endian: RunTimeEndian) -> u64
{
    read_unsigned_bytes(bytes, endian).unwrap_or(0)
}

fn sign_extend(value: u64, byte_size: usize) -> i64
{
    let bits = u32::try_from(byte_size * 8).unwrap_or(64);
    if bits == 0 || bits >= 64 {
        return i64::from_ne_bytes(value.to_ne_bytes());
    }
    let shift = 64 - bits;
    i64::from_ne_bytes((value << shift).to_ne_bytes()) >> shift
}

/// Write a Rust char literal for the scalar `value`
fn write_char_literal(value: u64, out: &mut impl Write) -> fmt::Result
{
    match value {
        0x0a => out.write_str("'\\n'"),
        0x0d => out.write_str("'\\r'"),
        0x09 => out.write_str("'\\t'"),
        0x5c => out.write_str("'\\\\'"),
        0x00 => out.write_str("'\\0'"),
        0x27 => out.write_str("'\\''"),
        printable @ 0x20..=0x7e => write!(out, "'{}'", char::from(u8::try_from(printable).unwrap_or(b'?'))),
        other => write!(out, "'\\u{{{other:x}}}'"),
    }
}
