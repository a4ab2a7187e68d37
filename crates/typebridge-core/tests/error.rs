//! Tests for error handling

use typebridge_core::dwarf::DebugImage;
use typebridge_core::types::Address;
use typebridge_core::{TypeBridgeError, TypeBridgeResult};

#[test]
fn test_invalid_argument_message()
{
    let error = TypeBridgeError::InvalidArgument("bad width".to_string());
    assert_eq!(error.to_string(), "Invalid argument: bad width");
}

#[test]
fn test_memory_read_message()
{
    let error = TypeBridgeError::MemoryRead {
        address: Address::new(0x1000),
        size: 4,
        details: "unmapped".to_string(),
    };
    let message = error.to_string();
    assert!(message.contains("0x0000000000001000"));
    assert!(message.contains("unmapped"));
}

#[test]
fn test_io_error_conversion()
{
    fn open_missing() -> TypeBridgeResult<()>
    {
        std::fs::read("/nonexistent/typebridge/binary")?;
        Ok(())
    }

    assert!(matches!(open_missing(), Err(TypeBridgeError::Io(_))));
}

#[test]
fn test_open_missing_binary()
{
    let result = DebugImage::open("/nonexistent/typebridge/binary");
    assert!(matches!(result, Err(TypeBridgeError::Io(_))));
}

#[test]
fn test_parse_garbage_object()
{
    let result = DebugImage::parse(b"definitely not an object file");
    assert!(matches!(result, Err(TypeBridgeError::ObjectParse(_))));
}
