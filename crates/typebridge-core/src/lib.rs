//! # typebridge-core
//!
//! Debugger-side model of a Rust program's types.
//!
//! A debugger needs to know, for every variable it shows, how the bytes in
//! the target are laid out and how they should be printed. This crate keeps
//! that knowledge in a [`TypeStore`]:
//! - Construction: factories for every kind of type, with a two-phase
//!   builder for structs, tuples, unions, and enums
//! - Introspection: classification, sizes, children, fields, signatures
//! - Dynamic resolution: picking the active variant of an enum value by
//!   reading its discriminant out of target memory
//! - C declarations: rendering a type so expression evaluation can declare
//!   values of it in generated C code
//! - Declaration contexts: namespaces and the functions inside them
//!
//! ## Producers
//!
//! Types can be built by hand or imported from DWARF with
//! [`dwarf::DebugImage`].
//!
//! ## Handles
//!
//! A [`TypeId`] names a node in one particular store. Handles from another
//! store, the null handle, and handles of aggregates that are still being
//! built all get neutral answers from the query API rather than errors.

pub mod cdecl;
pub mod decl;
pub mod describe;
pub mod dwarf;
pub mod dynamic;
pub mod error;
pub mod introspect;
pub mod memory;
pub mod prelude;
pub mod store;
pub mod types;

pub use error::{TypeBridgeError, TypeBridgeResult};
// Re-exported so callers can name byte orders without depending on gimli
pub use gimli::RunTimeEndian;
pub use store::TypeStore;
pub use types::{Address, TypeId};
