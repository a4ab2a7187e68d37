//! Target memory access.
//!
//! The dynamic resolver never talks to a process directly. It reads through a
//! [`MemoryReader`], which the host debugger implements on top of whatever
//! process-control layer it has. [`MemorySnapshot`] is a reader over a byte
//! buffer captured earlier (or fabricated, in tests).

use gimli::{Endianity, RunTimeEndian};

use crate::error::{TypeBridgeError, TypeBridgeResult};
use crate::types::Address;

/// Reads unsigned integers out of the debuggee's memory
pub trait MemoryReader
{
    /// Read a `byte_size`-byte unsigned integer at `address`
    ///
    /// Implementations support widths 1, 2, 4, and 8 and zero-extend the
    /// result.
    ///
    /// ## Errors
    ///
    /// Returns [`TypeBridgeError::MemoryRead`] when the range is not readable
    /// and [`TypeBridgeError::InvalidArgument`] for unsupported widths.
    fn read_unsigned(&self, address: Address, byte_size: u64) -> TypeBridgeResult<u64>;
}

impl<T: MemoryReader + ?Sized> MemoryReader for &T
{
    fn read_unsigned(&self, address: Address, byte_size: u64) -> TypeBridgeResult<u64>
    {
        (**self).read_unsigned(address, byte_size)
    }
}

/// A captured region of target memory
///
/// ## Example
///
/// ```rust
/// use typebridge_core::memory::{MemoryReader, MemorySnapshot};
/// use typebridge_core::types::Address;
/// use typebridge_core::RunTimeEndian;
///
/// let snapshot = MemorySnapshot::new(Address::new(0x1000), vec![0x34, 0x12, 0, 0], RunTimeEndian::Little);
/// assert_eq!(snapshot.read_unsigned(Address::new(0x1000), 2).unwrap(), 0x1234);
/// assert!(snapshot.read_unsigned(Address::new(0x1003), 2).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MemorySnapshot
{
    base: Address,
    bytes: Vec<u8>,
    endian: RunTimeEndian,
}

impl MemorySnapshot
{
    /// Snapshot of `bytes` starting at `base`
    #[must_use]
    pub fn new(base: Address, bytes: Vec<u8>, endian: RunTimeEndian) -> Self
    {
        Self { base, bytes, endian }
    }

    /// First address covered by the snapshot
    #[must_use]
    pub fn base(&self) -> Address
    {
        self.base
    }

    /// Captured bytes
    #[must_use]
    pub fn bytes(&self) -> &[u8]
    {
        &self.bytes
    }

    /// One past the last captured byte, clamped to the top of the address space
    fn end(&self) -> Address
    {
        let len = u64::try_from(self.bytes.len()).unwrap_or(u64::MAX);
        Address::new(self.base.value().saturating_add(len))
    }

    fn slice(&self, address: Address, byte_size: u64) -> Option<&[u8]>
    {
        let start = usize::try_from(address.offset_from(self.base)?).ok()?;
        let end = start.checked_add(usize::try_from(byte_size).ok()?)?;
        self.bytes.get(start..end)
    }
}

impl MemoryReader for MemorySnapshot
{
    fn read_unsigned(&self, address: Address, byte_size: u64) -> TypeBridgeResult<u64>
    {
        let bytes = self.slice(address, byte_size).ok_or_else(|| TypeBridgeError::MemoryRead {
            address,
            size: byte_size,
            details: format!("outside snapshot {}..{}", self.base, self.end()),
        })?;
        read_unsigned_bytes(bytes, self.endian)
    }
}

/// Decode an unsigned integer of 1, 2, 4, or 8 bytes
pub(crate) fn read_unsigned_bytes(bytes: &[u8], endian: RunTimeEndian) -> TypeBridgeResult<u64>
{
    match bytes.len() {
        1 => Ok(u64::from(bytes[0])),
        2 => Ok(u64::from(endian.read_u16(bytes))),
        4 => Ok(u64::from(endian.read_u32(bytes))),
        8 => Ok(endian.read_u64(bytes)),
        other => Err(TypeBridgeError::InvalidArgument(format!(
            "cannot read a {other}-byte integer"
        ))),
    }
}
