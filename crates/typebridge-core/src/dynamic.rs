//! # Dynamic Type Resolution
//!
//! Narrows the static type of an enum value to the payload type of the
//! variant that is actually active, by reading the discriminant out of target
//! memory.
//!
//! ```text
//! static type: Option<u32>      (enum, discriminant at +0, 4 bytes)
//! value at:    0x1000
//! memory:      [01 00 00 00 | 2a 00 00 00]
//!               └ discriminant 1 → variant "Some"
//! dynamic:     Some (tuple, field 0: u32 at +4), still at 0x1000
//! ```
//!
//! Every failure is reported as a [`DynamicTypeError`]; the host is expected
//! to fall back to the static type.

use thiserror::Error;
use tracing::debug;

use crate::error::TypeBridgeError;
use crate::memory::MemoryReader;
use crate::store::TypeStore;
use crate::types::{Address, TypeId};

/// How the address of a resolved value should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind
{
    /// A load address inside the running target
    LoadAddress,
}

/// Result of a successful resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicValue
{
    /// Payload type of the active variant
    pub ty: TypeId,
    /// Address of the value (unchanged from the input)
    pub address: Address,
    /// Interpretation of `address`
    pub address_kind: AddressKind,
}

/// Reasons a dynamic type could not be determined
#[derive(Error, Debug)]
pub enum DynamicTypeError
{
    /// The static type is not a tagged enum
    #[error("{0} is not a dynamic type")]
    NotDynamic(TypeId),

    /// `address + discriminant offset` does not fit in the address space
    #[error("discriminant location overflows: {address} + {offset}")]
    InvalidAddress
    {
        /// Address of the value
        address: Address,
        /// Offset of the discriminant within the value
        offset: u64,
    },

    /// The enum has no discriminant and no default variant to fall back on
    #[error("{0} has no discriminant location")]
    NoDiscriminantLocation(TypeId),

    /// Reading the discriminant failed
    #[error("failed to read discriminant: {0}")]
    MemoryRead(#[source] TypeBridgeError),

    /// No variant is registered for the discriminant and there is no default
    #[error("no variant for discriminant {value} of {ty}")]
    NoMatchingVariant
    {
        /// Enum being resolved
        ty: TypeId,
        /// Discriminant read from memory
        value: u64,
    },
}

impl TypeStore
{
    /// Whether values of this type may have a more specific runtime type
    ///
    /// True exactly for tagged enums (through typedefs).
    #[must_use]
    pub fn could_have_dynamic_value(&self, id: TypeId) -> bool
    {
        self.enum_discriminant_location(id).is_some()
    }

    /// Resolve the active variant of the enum value at `address`
    ///
    /// Reads an unsigned integer of the discriminant's width at `address +
    /// discriminant offset` and maps it through the enum's discriminant
    /// table, falling back to the default variant. Enums without a
    /// discriminant (width 0) resolve straight to their default variant.
    ///
    /// ## Errors
    ///
    /// See [`DynamicTypeError`]; none of them are fatal to the caller.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use typebridge_core::dynamic::AddressKind;
    /// use typebridge_core::memory::MemorySnapshot;
    /// use typebridge_core::store::{Discriminant, TypeStore};
    /// use typebridge_core::types::Address;
    /// use typebridge_core::RunTimeEndian;
    ///
    /// let mut store = TypeStore::new(8);
    /// let ok = store.create_struct_type("Ok", 8, false);
    /// let ok = store.finish(ok);
    /// let err = store.create_struct_type("Err", 8, false);
    /// let err = store.finish(err);
    /// let mut result = store.create_enum_type("Result", 8, 0, 1);
    /// result.add_variant("Ok", ok, 0, Discriminant::Value(0));
    /// result.add_variant("Err", err, 0, Discriminant::Value(1));
    /// let result = store.finish(result);
    ///
    /// let memory = MemorySnapshot::new(Address::new(0x2000), vec![1, 0, 0, 0, 0, 0, 0, 0], RunTimeEndian::Little);
    /// let value = store.resolve_dynamic_type(result, Address::new(0x2000), &memory).unwrap();
    /// assert_eq!(value.ty, err);
    /// assert_eq!(value.address, Address::new(0x2000));
    /// assert_eq!(value.address_kind, AddressKind::LoadAddress);
    /// ```
    pub fn resolve_dynamic_type(
        &self,
        id: TypeId,
        address: Address,
        reader: &dyn MemoryReader,
    ) -> Result<DynamicValue, DynamicTypeError>
    {
        let Some((offset, byte_size)) = self.enum_discriminant_location(id) else {
            return Err(DynamicTypeError::NotDynamic(id));
        };

        let variant = if byte_size == 0 {
            self.default_variant_type(id)
                .ok_or(DynamicTypeError::NoDiscriminantLocation(id))?
        } else {
            let location = address
                .checked_add(offset)
                .ok_or(DynamicTypeError::InvalidAddress { address, offset })?;
            let value = reader
                .read_unsigned(location, byte_size)
                .map_err(DynamicTypeError::MemoryRead)?;
            let variant = self
                .find_enum_variant(id, value)
                .ok_or(DynamicTypeError::NoMatchingVariant { ty: id, value })?;
            debug!(type_id = %id, %location, value, variant = %variant, "resolved enum variant");
            variant
        };

        Ok(DynamicValue {
            ty: variant,
            address,
            address_kind: AddressKind::LoadAddress,
        })
    }

    fn default_variant_type(&self, id: TypeId) -> Option<TypeId>
    {
        let aggregate = self.node(self.canonical_type(id))?.as_aggregate()?;
        let index = aggregate.enum_layout()?.default_variant()?;
        aggregate.fields().get(index).map(|field| field.ty)
    }
}
