//! Target address type.

use std::fmt;

/// Load address of a value in the debuggee
///
/// The dynamic resolver receives the address of a value and hands it back
/// unchanged after picking the active variant; discriminant reads are done at
/// `address + discriminant_offset`. Wrapping the raw `u64` keeps offsets and
/// addresses from being mixed up in those computations.
///
/// ## Example
///
/// ```rust
/// use typebridge_core::types::Address;
///
/// let value = Address::new(0x1000);
/// assert_eq!(value.checked_add(8), Some(Address::new(0x1008)));
/// assert_eq!(value.to_string(), "0x0000000000001000");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address
{
    /// Create a new address from a `u64` value
    #[must_use]
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Raw `u64` value of this address
    #[must_use]
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Offset this address, returning `None` when it would leave the address space
    ///
    /// Used for discriminant reads, where an overflowing location means the
    /// value's address was garbage to begin with.
    #[must_use]
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }

    /// Distance from `base` to this address, if this address is not below it
    #[must_use]
    pub fn offset_from(self, base: Address) -> Option<u64>
    {
        self.0.checked_sub(base.0)
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}
