//! Core type definitions for the type bridge.
//!
//! This module contains the data structures the rest of the crate is built
//! on: handles, node kinds, classification enums, and target addresses.

pub mod address;
pub mod classify;
pub mod id;
pub mod node;

pub use address::Address;
pub use classify::{BasicType, Encoding, Format, TypeClass, TypeFlags};
pub use id::{StoreId, TypeId};
pub use node::{AggregateKind, AggregateType, EnumLayout, Field, FunctionType, TypeKind, TypeNode};
