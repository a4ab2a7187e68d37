//! # Error Types
//!
//! Error handling for the type bridge.
//!
//! Most of the query surface never fails: an invalid or foreign handle simply
//! yields a neutral answer (`None`, `false`, `0`). Errors are reserved for the
//! places that talk to the outside world: loading object files, decoding
//! DWARF, and reading target memory.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use thiserror::Error;

use crate::types::Address;

/// Main error type for type bridge operations
///
/// ## Error Categories
///
/// 1. **Input errors**: InvalidArgument
/// 2. **Debug info errors**: Dwarf, ObjectParse
/// 3. **Target errors**: MemoryRead
/// 4. **I/O errors**: Io (for reading binaries from disk)
#[derive(Error, Debug)]
pub enum TypeBridgeError
{
    /// Invalid argument passed to a type bridge function
    ///
    /// Examples:
    /// - Reading an integer with an unsupported byte width
    /// - A hex string that does not decode to bytes
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failed to decode DWARF debug information
    ///
    /// The `context` describes what the importer was doing when `gimli`
    /// reported the problem (e.g. "reading DW_AT_byte_size").
    #[error("DWARF error while {context}: {source}")]
    Dwarf
    {
        /// Operation that was being performed
        context: String,
        /// Underlying decoder error
        #[source]
        source: gimli::Error,
    },

    /// The object file could not be parsed
    ///
    /// This happens when:
    /// - The file is not an ELF, Mach-O, or other supported container
    /// - A debug section is compressed with an unsupported algorithm
    #[error("Failed to parse object file: {0}")]
    ObjectParse(String),

    /// Failed to read memory from the target
    ///
    /// Produced by [`MemoryReader`](crate::memory::MemoryReader)
    /// implementations when the requested range is not readable.
    #[error("Failed to read {size} bytes at {address}: {details}")]
    MemoryRead
    {
        /// Start of the requested range
        address: Address,
        /// Number of bytes requested
        size: u64,
        /// Additional error details
        details: String,
    },

    /// I/O error (for reading binaries from disk, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, TypeBridgeError>`
///
/// ```rust
/// use typebridge_core::error::TypeBridgeResult;
/// fn foo() -> TypeBridgeResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type TypeBridgeResult<T> = std::result::Result<T, TypeBridgeError>;

/// Map a gimli DWARF error to a `TypeBridgeError` with context.
pub(crate) fn map_dwarf_error(context: &str, err: gimli::Error) -> TypeBridgeError
{
    TypeBridgeError::Dwarf {
        context: context.to_string(),
        source: err,
    }
}
