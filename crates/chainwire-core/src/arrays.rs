//! Homogeneous native-type arrays.
//!
//! Elements are written back-to-back at a fixed stride given by the array's
//! [`NativeUnit`]. Strings are the odd one out: each takes a zero-padded slot
//! of `MAX_STRING_CHARS` bytes so the stride stays fixed.

use std::fmt;

use alloy_primitives::{I256, U256};

use crate::error::CodecError;
use crate::numeric::FixedInt;

/// Default slot size, in bytes, for string elements.
pub const MAX_STRING_CHARS: usize = 100;

/// The element type of a native array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeUnit {
    Str,
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    I8,
    I16,
    I32,
    I64,
    I128,
    I256,
    F32,
    F64,
}

impl NativeUnit {
    /// Stride in bytes, using `string_slot` for string elements.
    pub fn size_with_slot(&self, string_slot: usize) -> usize {
        match self {
            NativeUnit::Str => string_slot,
            NativeUnit::Bool | NativeUnit::U8 | NativeUnit::I8 => 1,
            NativeUnit::U16 | NativeUnit::I16 => 2,
            NativeUnit::U32 | NativeUnit::I32 | NativeUnit::F32 => 4,
            NativeUnit::U64 | NativeUnit::I64 | NativeUnit::F64 => 8,
            NativeUnit::U128 | NativeUnit::I128 => 16,
            NativeUnit::U256 | NativeUnit::I256 => 32,
        }
    }

    pub fn size(&self) -> usize {
        self.size_with_slot(MAX_STRING_CHARS)
    }
}

impl fmt::Display for NativeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NativeUnit::Str => "string",
            NativeUnit::Bool => "bool",
            NativeUnit::U8 => "u8",
            NativeUnit::U16 => "u16",
            NativeUnit::U32 => "u32",
            NativeUnit::U64 => "u64",
            NativeUnit::U128 => "u128",
            NativeUnit::U256 => "u256",
            NativeUnit::I8 => "i8",
            NativeUnit::I16 => "i16",
            NativeUnit::I32 => "i32",
            NativeUnit::I64 => "i64",
            NativeUnit::I128 => "i128",
            NativeUnit::I256 => "i256",
            NativeUnit::F32 => "f32",
            NativeUnit::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// One element of a native array.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Str(String),
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    U256(U256),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    I256(I256),
    F32(f32),
    F64(f64),
}

impl NativeValue {
    pub fn unit(&self) -> NativeUnit {
        match self {
            NativeValue::Str(_) => NativeUnit::Str,
            NativeValue::Bool(_) => NativeUnit::Bool,
            NativeValue::U8(_) => NativeUnit::U8,
            NativeValue::U16(_) => NativeUnit::U16,
            NativeValue::U32(_) => NativeUnit::U32,
            NativeValue::U64(_) => NativeUnit::U64,
            NativeValue::U128(_) => NativeUnit::U128,
            NativeValue::U256(_) => NativeUnit::U256,
            NativeValue::I8(_) => NativeUnit::I8,
            NativeValue::I16(_) => NativeUnit::I16,
            NativeValue::I32(_) => NativeUnit::I32,
            NativeValue::I64(_) => NativeUnit::I64,
            NativeValue::I128(_) => NativeUnit::I128,
            NativeValue::I256(_) => NativeUnit::I256,
            NativeValue::F32(_) => NativeUnit::F32,
            NativeValue::F64(_) => NativeUnit::F64,
        }
    }
}

/// Encode `values` at the stride of `unit`, with the default string slot.
pub fn native_type_array_to_bytes(
    values: &[NativeValue],
    unit: NativeUnit,
) -> Result<Vec<u8>, CodecError> {
    native_type_array_to_bytes_with_slot(values, unit, MAX_STRING_CHARS)
}

pub fn native_type_array_to_bytes_with_slot(
    values: &[NativeValue],
    unit: NativeUnit,
    string_slot: usize,
) -> Result<Vec<u8>, CodecError> {
    let stride = unit.size_with_slot(string_slot);
    let mut out = Vec::with_capacity(values.len() * stride);
    for value in values {
        if value.unit() != unit {
            return Err(CodecError::UnsupportedType {
                unit: unit.to_string(),
                got: value.unit().to_string(),
            });
        }
        match value {
            NativeValue::Str(s) => {
                if s.len() > string_slot {
                    return Err(CodecError::StringTooLong {
                        len: s.len(),
                        max: string_slot,
                    });
                }
                out.extend_from_slice(s.as_bytes());
                out.resize(out.len() + string_slot - s.len(), 0);
            }
            NativeValue::Bool(b) => out.push(u8::from(*b)),
            NativeValue::U8(v) => out.extend(v.to_bytes()),
            NativeValue::U16(v) => out.extend(v.to_bytes()),
            NativeValue::U32(v) => out.extend(v.to_bytes()),
            NativeValue::U64(v) => out.extend(v.to_bytes()),
            NativeValue::U128(v) => out.extend(v.to_bytes()),
            NativeValue::U256(v) => out.extend(FixedInt::to_bytes(*v)),
            NativeValue::I8(v) => out.extend(v.to_bytes()),
            NativeValue::I16(v) => out.extend(v.to_bytes()),
            NativeValue::I32(v) => out.extend(v.to_bytes()),
            NativeValue::I64(v) => out.extend(v.to_bytes()),
            NativeValue::I128(v) => out.extend(v.to_bytes()),
            NativeValue::I256(v) => out.extend(FixedInt::to_bytes(*v)),
            NativeValue::F32(v) => out.extend_from_slice(&v.to_le_bytes()),
            NativeValue::F64(v) => out.extend_from_slice(&v.to_le_bytes()),
        }
    }
    Ok(out)
}

/// Decode a native array, with the default string slot.
pub fn bytes_to_native_type_array(
    data: &[u8],
    unit: NativeUnit,
) -> Result<Vec<NativeValue>, CodecError> {
    bytes_to_native_type_array_with_slot(data, unit, MAX_STRING_CHARS)
}

pub fn bytes_to_native_type_array_with_slot(
    data: &[u8],
    unit: NativeUnit,
    string_slot: usize,
) -> Result<Vec<NativeValue>, CodecError> {
    let stride = unit.size_with_slot(string_slot);
    if stride == 0 || data.len() % stride != 0 {
        return Err(CodecError::NonIntegerElementCount {
            len: data.len(),
            stride,
        });
    }

    data.chunks_exact(stride)
        .enumerate()
        .map(|(i, chunk)| decode_element(chunk, unit, i * stride))
        .collect()
}

fn decode_element(chunk: &[u8], unit: NativeUnit, offset: usize) -> Result<NativeValue, CodecError> {
    let value = match unit {
        NativeUnit::Str => {
            let bytes: Vec<u8> = chunk.iter().copied().filter(|&b| b != 0).collect();
            let s = String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8 { offset })?;
            NativeValue::Str(s)
        }
        NativeUnit::Bool => NativeValue::Bool(chunk[0] == 1),
        NativeUnit::U8 => NativeValue::U8(u8::from_le_slice(chunk)),
        NativeUnit::U16 => NativeValue::U16(u16::from_le_slice(chunk)),
        NativeUnit::U32 => NativeValue::U32(u32::from_le_slice(chunk)),
        NativeUnit::U64 => NativeValue::U64(u64::from_le_slice(chunk)),
        NativeUnit::U128 => NativeValue::U128(u128::from_le_slice(chunk)),
        NativeUnit::U256 => NativeValue::U256(<U256 as FixedInt>::from_le_slice(chunk)),
        NativeUnit::I8 => NativeValue::I8(i8::from_le_slice(chunk)),
        NativeUnit::I16 => NativeValue::I16(i16::from_le_slice(chunk)),
        NativeUnit::I32 => NativeValue::I32(i32::from_le_slice(chunk)),
        NativeUnit::I64 => NativeValue::I64(i64::from_le_slice(chunk)),
        NativeUnit::I128 => NativeValue::I128(i128::from_le_slice(chunk)),
        NativeUnit::I256 => NativeValue::I256(<I256 as FixedInt>::from_le_slice(chunk)),
        NativeUnit::F32 => {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(chunk);
            NativeValue::F32(f32::from_le_bytes(raw))
        }
        NativeUnit::F64 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            NativeValue::F64(f64::from_le_bytes(raw))
        }
    };
    Ok(value)
}
