//! Common module for library exports

pub use crate::cdecl::TypeNameMap;
pub use crate::decl::{DeclContextId, DeclId, DeclItem, DeclTree};
pub use crate::dwarf::DebugImage;
pub use crate::dynamic::{AddressKind, DynamicTypeError, DynamicValue};
pub use crate::error::{TypeBridgeError, TypeBridgeResult};
pub use crate::introspect::{ChildInfo, ChildOptions};
pub use crate::memory::{MemoryReader, MemorySnapshot};
pub use crate::store::{AggregateBuilder, Discriminant, TypeStore};
pub use crate::types::{Address, BasicType, Encoding, Format, TypeClass, TypeFlags, TypeId, TypeKind};
pub use crate::RunTimeEndian;
