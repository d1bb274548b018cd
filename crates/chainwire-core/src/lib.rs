//! # chainwire-core
//!
//! Positional binary codecs shared by every ChainWire crate:
//!
//! - [`numeric`]: fixed-width integers (8 to 256 bits, signed and unsigned)
//! - [`args`]: untagged argument buffers used as a contract calling convention
//! - [`arrays`]: fixed-stride native arrays
//! - [`serializable`]: the self-terminating object capability and object arrays
//! - [`varint`]: LEB128 integers used by the operation wire format

pub mod args;
pub mod arrays;
pub mod error;
pub mod numeric;
pub mod serializable;
pub mod varint;

pub use args::Args;
pub use arrays::{
    bytes_to_native_type_array, native_type_array_to_bytes, NativeUnit, NativeValue,
    MAX_STRING_CHARS,
};
pub use error::CodecError;
pub use numeric::{FixedInt, IntKind, Integer, Number};
pub use serializable::{
    bytes_to_serializable_object_array, serializable_objects_array_to_bytes, Serializable,
};
