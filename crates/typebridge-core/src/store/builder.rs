//! Aggregate builder.
//!
//! Aggregates are built in two phases. A `create_*_type` call on the store
//! reserves a handle and hands back an [`AggregateBuilder`]; the handle is
//! usable immediately (other types may point at it, which is how recursive
//! types are expressed) but every query on it answers as if the type were
//! unknown. Fields, variants, and generic arguments are added to the builder,
//! and [`TypeStore::finish`](super::TypeStore::finish) installs the finished
//! node. Once finished, a node never changes again apart from the one-time
//! discriminant stripping performed when its owning enum finishes.

use smallvec::SmallVec;
use tracing::warn;

use crate::types::{AggregateKind, AggregateType, Field, TypeId};

/// How a variant is selected by the enum's discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discriminant
{
    /// Selected when no explicit value matches
    Default,
    /// Selected when the discriminant equals this value
    Value(u64),
}

/// In-progress struct, tuple, union, or enum
///
/// ## Example
///
/// ```rust
/// use typebridge_core::store::{Discriminant, TypeStore};
///
/// let mut store = TypeStore::new(8);
/// let u32_ty = store.create_intrinsic_integral_type(false, 4);
///
/// let mut some = store.create_tuple_type("Some", 8, false);
/// some.add_field("__0", u32_ty, 4);
/// let some = store.finish(some);
///
/// let none = store.create_tuple_type("None", 8, false);
/// let none = store.finish(none);
///
/// let mut option = store.create_enum_type("Option<u32>", 8, 0, 4);
/// option.add_variant("None", none, 0, Discriminant::Value(0));
/// option.add_variant("Some", some, 0, Discriminant::Value(1));
/// let option = store.finish(option);
///
/// assert_eq!(store.find_enum_variant(option, 1), Some(some));
/// ```
#[derive(Debug)]
pub struct AggregateBuilder
{
    pub(crate) id: TypeId,
    pub(crate) name: String,
    pub(crate) aggregate: AggregateType,
}

impl AggregateBuilder
{
    pub(crate) fn new(id: TypeId, name: String, kind: AggregateKind, byte_size: u64, has_discriminant: bool) -> Self
    {
        Self {
            id,
            name,
            aggregate: AggregateType {
                kind,
                byte_size,
                has_discriminant,
                fields: Vec::new(),
                template_args: SmallVec::new(),
            },
        }
    }

    /// Handle reserved for this aggregate
    #[must_use]
    pub fn id(&self) -> TypeId
    {
        self.id
    }

    /// Name the aggregate will be finished with
    #[must_use]
    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// Number of fields (or variants) added so far
    #[must_use]
    pub fn field_count(&self) -> usize
    {
        self.aggregate.fields.len()
    }

    /// Append a field; field order is insertion order
    pub fn add_field(&mut self, name: impl Into<String>, ty: TypeId, offset: u64) -> &mut Self
    {
        self.aggregate.fields.push(Field {
            name: name.into(),
            ty,
            offset,
        });
        self
    }

    /// Append an enum variant and register how it is selected
    ///
    /// An explicit value always wins over the default variant. Registering
    /// the same value (or the default) twice keeps the later variant.
    ///
    /// On a non-enum aggregate the variant is added as a plain field and the
    /// discriminant is ignored.
    pub fn add_variant(&mut self, name: impl Into<String>, ty: TypeId, offset: u64, discriminant: Discriminant) -> &mut Self
    {
        let name = name.into();
        let index = self.aggregate.fields.len();

        match &mut self.aggregate.kind {
            AggregateKind::Enum(layout) => match discriminant {
                Discriminant::Value(value) => {
                    if let Some(previous) = layout.map_value(value, index) {
                        warn!(
                            enum_name = %self.name,
                            value,
                            previous,
                            "discriminant value registered twice, keeping variant {index}"
                        );
                    }
                }
                Discriminant::Default => {
                    if let Some(previous) = layout.set_default(index) {
                        warn!(
                            enum_name = %self.name,
                            previous,
                            "default variant registered twice, keeping variant {index}"
                        );
                    }
                }
            },
            _ => warn!(aggregate = %self.name, variant = %name, "variant added to a non-enum aggregate"),
        }

        self.add_field(name, ty, offset)
    }

    /// Append a generic argument
    pub fn add_template_argument(&mut self, ty: TypeId) -> &mut Self
    {
        self.aggregate.template_args.push(ty);
        self
    }
}
