//! # C Declarations
//!
//! Renders a type as a C declaration so a value of it can be declared in a
//! generated call expression (e.g. when the host evaluates `foo(x)` by
//! compiling a C shim).
//!
//! Aggregates have no C spelling of their own, so each one gets a synthetic
//! tag (`tag0`, `tag1`, ...) the first time it is seen. Its definition is
//! appended once to the preamble held by [`TypeNameMap`]; later references,
//! including recursive ones through pointers, reuse the tag.
//!
//! ```text
//! struct Point { x: i32, y: i32 }   ──►   preamble: struct tag0 { __INT32_TYPE__ _x; __INT32_TYPE__ _y; };
//! let p: *mut Point                 ──►   struct tag0* p
//! ```
//!
//! Integers use the `__INTn_TYPE__` / `__UINTn_TYPE__` macros predefined by
//! clang and gcc so the output does not depend on `<stdint.h>`.

use std::collections::HashMap;
use std::fmt::Write;

use crate::store::TypeStore;
use crate::types::{AggregateKind, AggregateType, Field, TypeId, TypeKind};

/// Tag assignments and accumulated tag definitions for one synthesis session
///
/// Reuse the same map for every declaration that ends up in the same
/// generated source so shared aggregates are defined once.
#[derive(Debug, Default)]
pub struct TypeNameMap
{
    tags: HashMap<TypeId, String>,
    counter: u32,
    typedefs: String,
}

impl TypeNameMap
{
    /// Empty map
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Tag for `id`, and whether it was assigned by this call
    pub fn tag(&mut self, id: TypeId) -> (String, bool)
    {
        if let Some(existing) = self.tags.get(&id) {
            return (existing.clone(), false);
        }
        let tag = format!("tag{}", self.counter);
        self.counter += 1;
        self.tags.insert(id, tag.clone());
        (tag, true)
    }

    /// Number of tags assigned so far
    #[must_use]
    pub fn tag_count(&self) -> usize
    {
        self.tags.len()
    }

    /// Definitions of every tagged aggregate, in first-seen order
    #[must_use]
    pub fn typedefs(&self) -> &str
    {
        &self.typedefs
    }

    /// Consume the map, keeping only the definitions
    #[must_use]
    pub fn into_typedefs(self) -> String
    {
        self.typedefs
    }
}

/// `base` followed by the declarator, if there is one
fn declare(base: &str, varname: &str) -> String
{
    if varname.is_empty() {
        base.to_string()
    } else {
        format!("{base} {varname}")
    }
}

impl TypeStore
{
    /// C declaration of a variable `varname` of type `id`
    ///
    /// Pass an empty `varname` for an abstract declarator (a bare type, as
    /// used for parameters and return types). Returns `None` if the type, or
    /// any type it reaches, is unknown or still open. Tags assigned before
    /// the failure stay in `names`.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use typebridge_core::cdecl::TypeNameMap;
    /// use typebridge_core::store::TypeStore;
    ///
    /// let mut store = TypeStore::new(8);
    /// let u8_ty = store.create_intrinsic_integral_type(false, 1);
    /// let bytes = store.create_array_type(u8_ty, 16);
    ///
    /// let mut names = TypeNameMap::new();
    /// let decl = store.c_abi_declaration(bytes, "buf", &mut names).unwrap();
    /// assert_eq!(decl, "__UINT8_TYPE__ buf[16]");
    /// ```
    pub fn c_abi_declaration(&self, id: TypeId, varname: &str, names: &mut TypeNameMap) -> Option<String>
    {
        let node = self.node(id)?;
        match node.kind() {
            TypeKind::Bool => Some(declare("bool", varname)),
            TypeKind::Integral { signed, byte_size, .. } => {
                let unsigned = if *signed { "" } else { "U" };
                let bits = byte_size.checked_mul(8)?;
                Some(declare(&format!("__{unsigned}INT{bits}_TYPE__"), varname))
            }
            TypeKind::Float { byte_size } => Some(declare(if *byte_size == 4 { "float" } else { "double" }, varname)),
            TypeKind::CLikeEnum { underlying, .. } | TypeKind::Typedef { underlying } => {
                self.c_abi_declaration(*underlying, varname, names)
            }
            TypeKind::Pointer { pointee, .. } => {
                if self.is_function_type(*pointee) {
                    return self.c_abi_declaration(*pointee, varname, names);
                }
                let pointee = self.c_abi_declaration(*pointee, "", names)?;
                Some(declare(&format!("{pointee}*"), varname))
            }
            TypeKind::Array { element, length } => {
                let element = self.c_abi_declaration(*element, varname, names)?;
                Some(format!("{element}[{length}]"))
            }
            TypeKind::Function(function) => {
                let return_type = self.c_abi_declaration(function.return_type, "", names)?;
                let params = function
                    .params
                    .iter()
                    .map(|param| self.c_abi_declaration(*param, "", names))
                    .collect::<Option<Vec<_>>>()?;
                Some(format!("{return_type} (*{varname})({})", params.join(", ")))
            }
            TypeKind::Aggregate(aggregate) => {
                if self.is_void_type(id) {
                    return Some(declare("void", varname));
                }
                self.aggregate_declaration(id, aggregate, varname, names)
            }
        }
    }

    fn aggregate_declaration(&self, id: TypeId, aggregate: &AggregateType, varname: &str, names: &mut TypeNameMap) -> Option<String>
    {
        let keyword = match aggregate.kind() {
            AggregateKind::Union => "union",
            AggregateKind::Struct | AggregateKind::Tuple | AggregateKind::Enum(_) => "struct",
        };
        let (tag, is_new) = names.tag(id);

        if is_new {
            let mut body = String::new();
            if let AggregateKind::Enum(layout) = aggregate.kind() {
                // A leading discriminant is exposed; one elsewhere overlaps a field.
                if aggregate.fields().len() > 1 && layout.discr_offset() == 0 {
                    let bits = layout.discr_byte_size().checked_mul(8)?;
                    let _ = write!(body, "int{bits}_t __discr; ");
                }
            }
            body.push_str(&self.fields_declaration(aggregate.fields(), names)?);
            let _ = writeln!(names.typedefs, "{keyword} {tag} {{ {body}}};");
        }

        Some(declare(&format!("{keyword} {tag}"), varname))
    }

    fn fields_declaration(&self, fields: &[Field], names: &mut TypeNameMap) -> Option<String>
    {
        let mut unnamed = 0_usize;
        let mut result = String::new();
        for field in fields {
            let name = if field.name.is_empty() {
                let name = format!("__{unnamed}");
                unnamed += 1;
                name
            } else {
                format!("_{}", field.name)
            };
            result.push_str(&self.c_abi_declaration(field.ty, &name, names)?);
            result.push_str("; ");
        }
        Some(result)
    }
}
