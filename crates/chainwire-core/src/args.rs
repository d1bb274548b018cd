//! Positional argument buffers.
//!
//! `Args` is the calling convention between a client and a contract
//! function: values are appended in order with no type tags, and the callee
//! reads them back in the same order with the matching `next_*` calls.
//!
//! ```
//! use chainwire_core::Args;
//!
//! let bytes = Args::new().add_string("hi").add_u64(42).serialize();
//! assert_eq!(&bytes[..6], &[2, 0, 0, 0, b'h', b'i']);
//!
//! let mut args = Args::from_bytes(bytes);
//! assert_eq!(args.next_string().unwrap(), "hi");
//! assert_eq!(args.next_u64().unwrap(), 42);
//! ```

use alloy_primitives::{I256, U256};

use crate::arrays::{bytes_to_native_type_array, native_type_array_to_bytes, NativeUnit, NativeValue};
use crate::error::CodecError;
use crate::numeric::{take, FixedInt, IntKind, Integer};
use crate::serializable::{
    bytes_to_serializable_object_array, serializable_objects_array_to_bytes, Serializable,
};

/// An ordered, untagged sequence of encoded values with a read cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    serialized: Vec<u8>,
    offset: usize,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing buffer for reading, cursor at 0.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            serialized: bytes.into(),
            offset: 0,
        }
    }

    /// Move the read cursor.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.serialized.len().saturating_sub(self.offset)
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.serialized.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.serialized
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.serialized
    }

    // ─── Builder ──────────────────────────────────────────────────────────────

    pub fn add_string(self, value: &str) -> Self {
        self.add_uint8_array(value.as_bytes())
    }

    pub fn add_bool(mut self, value: bool) -> Self {
        self.serialized.push(u8::from(value));
        self
    }

    pub fn add_f32(mut self, value: f32) -> Self {
        self.serialized.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn add_f64(mut self, value: f64) -> Self {
        self.serialized.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Append any native fixed-width integer.
    pub fn add_int<T: FixedInt>(mut self, value: T) -> Self {
        self.serialized.extend(value.to_bytes());
        self
    }

    /// Append a big-integer value at `kind`'s width, range-checked.
    pub fn add_integer(mut self, kind: IntKind, value: impl Into<Integer>) -> Result<Self, CodecError> {
        self.serialized.extend(kind.to_bytes(value)?);
        Ok(self)
    }

    pub fn add_u8(self, value: u8) -> Self {
        self.add_int(value)
    }

    pub fn add_u16(self, value: u16) -> Self {
        self.add_int(value)
    }

    pub fn add_u32(self, value: u32) -> Self {
        self.add_int(value)
    }

    pub fn add_u64(self, value: u64) -> Self {
        self.add_int(value)
    }

    pub fn add_u128(self, value: u128) -> Self {
        self.add_int(value)
    }

    pub fn add_u256(self, value: U256) -> Self {
        self.add_int(value)
    }

    pub fn add_i8(self, value: i8) -> Self {
        self.add_int(value)
    }

    pub fn add_i16(self, value: i16) -> Self {
        self.add_int(value)
    }

    pub fn add_i32(self, value: i32) -> Self {
        self.add_int(value)
    }

    pub fn add_i64(self, value: i64) -> Self {
        self.add_int(value)
    }

    pub fn add_i128(self, value: i128) -> Self {
        self.add_int(value)
    }

    pub fn add_i256(self, value: I256) -> Self {
        self.add_int(value)
    }

    /// Append raw bytes behind a 4-byte little-endian length.
    ///
    /// # Panics
    ///
    /// If `value` is longer than `u32::MAX` bytes. Use
    /// [`Args::try_add_uint8_array`] for input of unknown size.
    pub fn add_uint8_array(self, value: &[u8]) -> Self {
        match self.try_add_uint8_array(value) {
            Ok(args) => args,
            Err(err) => panic!("{err}"),
        }
    }

    /// Append raw bytes behind a 4-byte little-endian length, failing with
    /// [`CodecError::LengthPrefixTooLarge`] past `u32::MAX` bytes.
    pub fn try_add_uint8_array(mut self, value: &[u8]) -> Result<Self, CodecError> {
        let len = length_prefix(value.len())?;
        self.serialized.extend_from_slice(&len);
        self.serialized.extend_from_slice(value);
        Ok(self)
    }

    /// Append an object's own encoding, unprefixed.
    pub fn add_serializable<T: Serializable>(mut self, value: &T) -> Self {
        self.serialized.extend(value.serialize());
        self
    }

    /// Append a concatenated object array behind a length prefix.
    pub fn add_serializable_object_array<T: Serializable>(self, values: &[T]) -> Self {
        let bytes = serializable_objects_array_to_bytes(values);
        self.add_uint8_array(&bytes)
    }

    /// Append a fixed-stride native array behind a length prefix.
    pub fn add_array(self, values: &[NativeValue], unit: NativeUnit) -> Result<Self, CodecError> {
        let bytes = native_type_array_to_bytes(values, unit)?;
        self.try_add_uint8_array(&bytes)
    }

    // ─── Reader ───────────────────────────────────────────────────────────────

    fn read(&mut self, len: usize) -> Result<&[u8], CodecError> {
        let start = self.offset;
        let chunk = take(&self.serialized, start, len)?;
        self.offset = start + len;
        Ok(chunk)
    }

    pub fn next_string(&mut self) -> Result<String, CodecError> {
        let start = self.offset;
        let bytes = self.next_uint8_array()?;
        String::from_utf8(bytes).map_err(|_| {
            self.offset = start;
            CodecError::InvalidUtf8 { offset: start }
        })
    }

    pub fn next_bool(&mut self) -> Result<bool, CodecError> {
        Ok(self.read(1)?[0] != 0)
    }

    pub fn next_f32(&mut self) -> Result<f32, CodecError> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.read(4)?);
        Ok(f32::from_le_bytes(raw))
    }

    pub fn next_f64(&mut self) -> Result<f64, CodecError> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.read(8)?);
        Ok(f64::from_le_bytes(raw))
    }

    /// Read any native fixed-width integer.
    pub fn next_int<T: FixedInt>(&mut self) -> Result<T, CodecError> {
        let (value, next) = T::from_buffer(&self.serialized, self.offset)?;
        self.offset = next;
        Ok(value)
    }

    /// Read a value of `kind`'s width as a big integer.
    pub fn next_integer(&mut self, kind: IntKind) -> Result<Integer, CodecError> {
        let (value, next) = kind.from_buffer(&self.serialized, self.offset)?;
        self.offset = next;
        Ok(value)
    }

    pub fn next_u8(&mut self) -> Result<u8, CodecError> {
        self.next_int()
    }

    pub fn next_u16(&mut self) -> Result<u16, CodecError> {
        self.next_int()
    }

    pub fn next_u32(&mut self) -> Result<u32, CodecError> {
        self.next_int()
    }

    pub fn next_u64(&mut self) -> Result<u64, CodecError> {
        self.next_int()
    }

    pub fn next_u128(&mut self) -> Result<u128, CodecError> {
        self.next_int()
    }

    pub fn next_u256(&mut self) -> Result<U256, CodecError> {
        self.next_int()
    }

    pub fn next_i8(&mut self) -> Result<i8, CodecError> {
        self.next_int()
    }

    pub fn next_i16(&mut self) -> Result<i16, CodecError> {
        self.next_int()
    }

    pub fn next_i32(&mut self) -> Result<i32, CodecError> {
        self.next_int()
    }

    pub fn next_i64(&mut self) -> Result<i64, CodecError> {
        self.next_int()
    }

    pub fn next_i128(&mut self) -> Result<i128, CodecError> {
        self.next_int()
    }

    pub fn next_i256(&mut self) -> Result<I256, CodecError> {
        self.next_int()
    }

    /// Read a length-prefixed byte array.
    pub fn next_uint8_array(&mut self) -> Result<Vec<u8>, CodecError> {
        let start = self.offset;
        let len = self.next_u32()? as usize;
        let available = self.remaining();
        if len > available {
            self.offset = start;
            return Err(CodecError::LengthPrefixOverflow {
                offset: start,
                declared: len,
                available,
            });
        }
        Ok(self.read(len)?.to_vec())
    }

    pub fn next_serializable<T: Serializable>(&mut self) -> Result<T, CodecError> {
        let (value, next) = T::deserialize(&self.serialized, self.offset)?;
        self.offset = next;
        Ok(value)
    }

    pub fn next_serializable_object_array<T: Serializable>(&mut self) -> Result<Vec<T>, CodecError> {
        let bytes = self.next_uint8_array()?;
        bytes_to_serializable_object_array(&bytes)
    }

    pub fn next_array(&mut self, unit: NativeUnit) -> Result<Vec<NativeValue>, CodecError> {
        let bytes = self.next_uint8_array()?;
        bytes_to_native_type_array(&bytes, unit)
    }
}

fn length_prefix(len: usize) -> Result<[u8; 4], CodecError> {
    u32::try_from(len)
        .map(u32::to_le_bytes)
        .map_err(|_| CodecError::LengthPrefixTooLarge { len })
}

impl From<Args> for Vec<u8> {
    fn from(args: Args) -> Self {
        args.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializable::tests::Holder;

    #[test]
    fn string_then_u64_layout() {
        let bytes = Args::new().add_string("hi").add_u64(42).serialize();
        assert_eq!(
            bytes,
            vec![2, 0, 0, 0, b'h', b'i', 42, 0, 0, 0, 0, 0, 0, 0]
        );
        let mut args = Args::from_bytes(bytes);
        assert_eq!(args.next_string().unwrap(), "hi");
        assert_eq!(args.next_u64().unwrap(), 42);
        assert_eq!(args.remaining(), 0);
    }

    #[test]
    fn every_scalar_round_trips() {
        let bytes = Args::new()
            .add_string("")
            .add_string("日本語 ✓")
            .add_bool(true)
            .add_bool(false)
            .add_f32(1.25)
            .add_f64(-2.5e-10)
            .add_u8(u8::MAX)
            .add_u16(0xBEEF)
            .add_u32(7)
            .add_u64(u64::MAX)
            .add_u128(u128::MAX)
            .add_u256(U256::from(1u8) << 200)
            .add_i8(i8::MIN)
            .add_i16(-2)
            .add_i32(i32::MIN)
            .add_i64(-1)
            .add_i128(i128::MIN)
            .add_i256(I256::MIN)
            .add_uint8_array(&[9, 8, 7])
            .serialize();

        let mut args = Args::from_bytes(bytes);
        assert_eq!(args.next_string().unwrap(), "");
        assert_eq!(args.next_string().unwrap(), "日本語 ✓");
        assert!(args.next_bool().unwrap());
        assert!(!args.next_bool().unwrap());
        assert_eq!(args.next_f32().unwrap(), 1.25);
        assert_eq!(args.next_f64().unwrap(), -2.5e-10);
        assert_eq!(args.next_u8().unwrap(), u8::MAX);
        assert_eq!(args.next_u16().unwrap(), 0xBEEF);
        assert_eq!(args.next_u32().unwrap(), 7);
        assert_eq!(args.next_u64().unwrap(), u64::MAX);
        assert_eq!(args.next_u128().unwrap(), u128::MAX);
        assert_eq!(args.next_u256().unwrap(), U256::from(1u8) << 200);
        assert_eq!(args.next_i8().unwrap(), i8::MIN);
        assert_eq!(args.next_i16().unwrap(), -2);
        assert_eq!(args.next_i32().unwrap(), i32::MIN);
        assert_eq!(args.next_i64().unwrap(), -1);
        assert_eq!(args.next_i128().unwrap(), i128::MIN);
        assert_eq!(args.next_i256().unwrap(), I256::MIN);
        assert_eq!(args.next_uint8_array().unwrap(), vec![9, 8, 7]);
        assert_eq!(args.remaining(), 0);
    }

    #[test]
    fn nested_objects_and_arrays() {
        let single = Holder {
            name: "solo".into(),
            amount: 1,
        };
        let many = vec![
            Holder {
                name: "a".into(),
                amount: 2,
            },
            Holder {
                name: "bb".into(),
                amount: 3,
            },
        ];
        let numbers = vec![NativeValue::U32(5), NativeValue::U32(6)];

        let bytes = Args::new()
            .add_serializable(&single)
            .add_serializable_object_array(&many)
            .add_array(&numbers, NativeUnit::U32)
            .unwrap()
            .add_bool(true)
            .serialize();

        let mut args = Args::from_bytes(bytes);
        assert_eq!(args.next_serializable::<Holder>().unwrap(), single);
        assert_eq!(args.next_serializable_object_array::<Holder>().unwrap(), many);
        assert_eq!(args.next_array(NativeUnit::U32).unwrap(), numbers);
        assert!(args.next_bool().unwrap());
    }

    #[test]
    fn big_integer_entry_points() {
        let max = IntKind::U256.max();
        let bytes = Args::new()
            .add_integer(IntKind::U256, max)
            .unwrap()
            .serialize();
        let mut args = Args::from_bytes(bytes);
        assert_eq!(args.next_integer(IntKind::U256).unwrap(), max);

        let err = Args::new().add_integer(IntKind::U8, 256u16).unwrap_err();
        assert!(err.is_range_error());
    }

    #[test]
    fn reading_past_the_end() {
        let mut args = Args::from_bytes(vec![1, 2, 3]);
        let err = args.next_u32().unwrap_err();
        assert_eq!(
            err,
            CodecError::InsufficientBytes {
                offset: 0,
                needed: 4,
                available: 3
            }
        );
        assert_eq!(args.offset(), 0);
        assert_eq!(args.next_u8().unwrap(), 1);
    }

    #[test]
    fn length_prefix_larger_than_buffer() {
        let mut bytes = 10u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"abc");
        let mut args = Args::from_bytes(bytes);
        assert_eq!(
            args.next_string().unwrap_err(),
            CodecError::LengthPrefixOverflow {
                offset: 0,
                declared: 10,
                available: 3
            }
        );
        assert_eq!(args.offset(), 0);
    }

    #[test]
    fn length_prefix_is_bounded_by_u32() {
        assert_eq!(length_prefix(3).unwrap(), [3, 0, 0, 0]);
        assert_eq!(length_prefix(u32::MAX as usize).unwrap(), [0xFF; 4]);
        #[cfg(target_pointer_width = "64")]
        {
            let err = length_prefix(u32::MAX as usize + 1).unwrap_err();
            assert_eq!(err, CodecError::LengthPrefixTooLarge { len: 1 << 32 });
            assert!(err.is_range_error());
        }

        let args = Args::new().try_add_uint8_array(&[7, 7]).unwrap();
        assert_eq!(args.as_bytes(), &[2, 0, 0, 0, 7, 7]);
    }

    #[test]
    fn invalid_utf8_string() {
        let bytes = Args::new().add_uint8_array(&[0xFF, 0xFE]).serialize();
        let mut args = Args::from_bytes(bytes);
        assert_eq!(
            args.next_string().unwrap_err(),
            CodecError::InvalidUtf8 { offset: 0 }
        );
    }

    #[test]
    fn mismatched_schema_reads_garbage_not_errors() {
        // No type tags: reading a u64 as two u32s succeeds silently.
        let mut args = Args::from_bytes(Args::new().add_u64((1 << 32) | 5).serialize());
        assert_eq!(args.next_u32().unwrap(), 5);
        assert_eq!(args.next_u32().unwrap(), 1);
    }
}
