//! Fixed-width integer codec.
//!
//! Every published width (8 to 256 bits, signed or unsigned) goes through the
//! same routine on [`IntKind`]: values are carried as a sign-magnitude
//! [`Integer`], range-checked against the width's bounds, then written as the
//! low `bits / 8` bytes of their 256-bit two's-complement word, little-endian.
//!
//! [`FixedInt`] exposes the same codec on native carriers (`u8`..`u128`,
//! `i8`..`i128`, `U256`, `I256`) so callers never have to go through
//! `Integer` when the value is already well-typed.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use alloy_primitives::{I256, U256};

use crate::error::CodecError;

/// Largest integer a binary64 float represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

// ─── Integer ──────────────────────────────────────────────────────────────────

/// A sign-magnitude integer able to hold the bounds of every published width,
/// from `I256::MIN` up to `U256::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Integer {
    negative: bool,
    magnitude: U256,
}

impl Integer {
    pub const ZERO: Integer = Integer {
        negative: false,
        magnitude: U256::ZERO,
    };

    /// Build from a sign and a magnitude. Zero is always non-negative.
    pub fn new(negative: bool, magnitude: U256) -> Self {
        Self {
            negative: negative && !magnitude.is_zero(),
            magnitude,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn magnitude(&self) -> U256 {
        self.magnitude
    }

    /// `self + 1`, or `None` past `U256::MAX`.
    pub fn succ(self) -> Option<Self> {
        if self.negative {
            Some(Self::new(true, self.magnitude - U256::from(1u8)))
        } else {
            self.magnitude
                .checked_add(U256::from(1u8))
                .map(|m| Self::new(false, m))
        }
    }

    /// `self - 1`, or `None` below `-U256::MAX`.
    pub fn pred(self) -> Option<Self> {
        if self.negative {
            self.magnitude
                .checked_add(U256::from(1u8))
                .map(|m| Self::new(true, m))
        } else if self.magnitude.is_zero() {
            Some(Self::new(true, U256::from(1u8)))
        } else {
            Some(Self::new(false, self.magnitude - U256::from(1u8)))
        }
    }

    /// The 256-bit two's-complement word for this value.
    fn to_word(self) -> U256 {
        if self.negative {
            self.magnitude.wrapping_neg()
        } else {
            self.magnitude
        }
    }

    /// Inverse of `to_word`. For signed words bit 255 is the sign bit.
    fn from_word(word: U256, signed: bool) -> Self {
        if signed && word.bit(255) {
            Self::new(true, word.wrapping_neg())
        } else {
            Self::new(false, word)
        }
    }
}

impl Ord for Integer {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, false) => self.magnitude.cmp(&other.magnitude),
            (true, true) => other.magnitude.cmp(&self.magnitude),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Integer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.magnitude)
        } else {
            write!(f, "{}", self.magnitude)
        }
    }
}

impl FromStr for Integer {
    type Err = CodecError;

    /// Parse a decimal integer with an optional leading `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::NotAnInteger { value: s.to_string() });
        }
        let magnitude = U256::from_str_radix(digits, 10).map_err(|_| CodecError::OutOfRange {
            kind: "integer".into(),
            value: s.to_string(),
            min: format!("-{}", U256::MAX),
            max: U256::MAX.to_string(),
        })?;
        Ok(Self::new(negative, magnitude))
    }
}

macro_rules! integer_from_unsigned {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Integer {
            fn from(v: $ty) -> Self {
                Self::new(false, U256::from(v))
            }
        }
    )*};
}

macro_rules! integer_from_signed {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Integer {
            fn from(v: $ty) -> Self {
                Self::new(v < 0, U256::from(v.unsigned_abs()))
            }
        }
    )*};
}

integer_from_unsigned!(u8, u16, u32, u64, u128);
integer_from_signed!(i8, i16, i32, i64, i128);

impl From<U256> for Integer {
    fn from(v: U256) -> Self {
        Self::new(false, v)
    }
}

impl From<I256> for Integer {
    fn from(v: I256) -> Self {
        Self::new(v.is_negative(), v.unsigned_abs())
    }
}

// ─── Number input ─────────────────────────────────────────────────────────────

/// Input accepted by `from_number`: a float that must hold an integral value,
/// or an already-integral big integer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Float(f64),
    Int(Integer),
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Float(v)
    }
}

impl From<f32> for Number {
    fn from(v: f32) -> Self {
        Number::Float(f64::from(v))
    }
}

impl From<Integer> for Number {
    fn from(v: Integer) -> Self {
        Number::Int(v)
    }
}

macro_rules! number_from_int {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Number {
            fn from(v: $ty) -> Self {
                Number::Int(Integer::from(v))
            }
        }
    )*};
}

number_from_int!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128, U256, I256);

// ─── IntKind: the generic width codec ─────────────────────────────────────────

/// A (bit width, signedness) pair. All integer encoding goes through here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntKind {
    bits: usize,
    signed: bool,
}

impl IntKind {
    pub const U8: IntKind = IntKind::unsigned(8);
    pub const U16: IntKind = IntKind::unsigned(16);
    pub const U32: IntKind = IntKind::unsigned(32);
    pub const U64: IntKind = IntKind::unsigned(64);
    pub const U128: IntKind = IntKind::unsigned(128);
    pub const U256: IntKind = IntKind::unsigned(256);
    pub const I8: IntKind = IntKind::signed(8);
    pub const I16: IntKind = IntKind::signed(16);
    pub const I32: IntKind = IntKind::signed(32);
    pub const I64: IntKind = IntKind::signed(64);
    pub const I128: IntKind = IntKind::signed(128);
    pub const I256: IntKind = IntKind::signed(256);

    /// Every published width, unsigned first.
    pub const ALL: [IntKind; 12] = [
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::U128,
        Self::U256,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::I128,
        Self::I256,
    ];

    const fn unsigned(bits: usize) -> Self {
        Self { bits, signed: false }
    }

    const fn signed(bits: usize) -> Self {
        Self { bits, signed: true }
    }

    /// Look up a published width; `None` for anything outside [`Self::ALL`].
    pub fn from_width(bits: usize, signed: bool) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.bits == bits && kind.signed == signed)
    }

    pub const fn bits(&self) -> usize {
        self.bits
    }

    /// Encoded size in bytes.
    pub const fn size(&self) -> usize {
        self.bits / 8
    }

    pub const fn is_signed(&self) -> bool {
        self.signed
    }

    pub fn min(&self) -> Integer {
        if self.signed {
            Integer::new(true, U256::from(1u8) << (self.bits - 1))
        } else {
            Integer::ZERO
        }
    }

    pub fn max(&self) -> Integer {
        let value_bits = if self.signed { self.bits - 1 } else { self.bits };
        let magnitude = if value_bits == 256 {
            U256::MAX
        } else {
            (U256::from(1u8) << value_bits) - U256::from(1u8)
        };
        Integer::new(false, magnitude)
    }

    /// Ensure `value` lies within `[min, max]`.
    pub fn check(&self, value: Integer) -> Result<Integer, CodecError> {
        let (min, max) = (self.min(), self.max());
        if value < min || value > max {
            return Err(CodecError::OutOfRange {
                kind: self.to_string(),
                value: value.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        Ok(value)
    }

    /// Little-endian two's-complement encoding of `value`.
    pub fn to_bytes(&self, value: impl Into<Integer>) -> Result<Vec<u8>, CodecError> {
        let value = self.check(value.into())?;
        Ok(self.encode_unchecked(value))
    }

    /// Decode from the start of `bytes`.
    ///
    /// Bytes past `size()` are ignored so that a value can be read off the
    /// front of a composite buffer; callers concatenating buffers upstream
    /// must get the order right since nothing here will notice.
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<Integer, CodecError> {
        self.from_buffer(bytes, 0).map(|(value, _)| value)
    }

    /// Decode at `offset`, returning the value and the offset just past it.
    pub fn from_buffer(&self, buffer: &[u8], offset: usize) -> Result<(Integer, usize), CodecError> {
        let chunk = take(buffer, offset, self.size())?;
        let fill = if self.signed && chunk[chunk.len() - 1] & 0x80 != 0 {
            0xFF
        } else {
            0x00
        };
        let mut word = [fill; 32];
        word[..chunk.len()].copy_from_slice(chunk);
        let value = Integer::from_word(U256::from_le_bytes(word), self.signed);
        Ok((value, offset + self.size()))
    }

    /// Range-checked conversion from a float or big-integer input.
    pub fn from_number(&self, value: impl Into<Number>) -> Result<Integer, CodecError> {
        let integer = match value.into() {
            Number::Int(i) => i,
            Number::Float(f) => {
                if !f.is_finite() || f.fract() != 0.0 || f.abs() > MAX_SAFE_INTEGER {
                    return Err(CodecError::NotAnInteger { value: f.to_string() });
                }
                Integer::from(f as i64)
            }
        };
        self.check(integer)
    }

    fn encode_unchecked(&self, value: Integer) -> Vec<u8> {
        value.to_word().to_le_bytes::<32>()[..self.size()].to_vec()
    }
}

impl fmt::Display for IntKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.signed { 'i' } else { 'u' };
        write!(f, "{prefix}{}", self.bits)
    }
}

/// Borrow `len` bytes at `offset` or report how short the buffer is.
pub(crate) fn take(buffer: &[u8], offset: usize, len: usize) -> Result<&[u8], CodecError> {
    offset
        .checked_add(len)
        .filter(|&end| end <= buffer.len())
        .map(|end| &buffer[offset..end])
        .ok_or_else(|| CodecError::insufficient(offset, len, buffer.len()))
}

// ─── FixedInt: native carriers ────────────────────────────────────────────────

/// A native Rust type that carries exactly one published width.
///
/// Native values are in range by construction, so `to_bytes` cannot fail;
/// the range-checked entry points are `from_integer` and `from_number`.
pub trait FixedInt: Copy + Into<Integer> {
    const KIND: IntKind;

    fn to_bytes(self) -> Vec<u8>;

    /// Build from exactly `KIND.size()` little-endian bytes.
    fn from_le_slice(bytes: &[u8]) -> Self;

    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        Self::from_buffer(bytes, 0).map(|(value, _)| value)
    }

    fn from_buffer(buffer: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let chunk = take(buffer, offset, Self::KIND.size())?;
        Ok((Self::from_le_slice(chunk), offset + Self::KIND.size()))
    }

    fn from_integer(value: Integer) -> Result<Self, CodecError> {
        let bytes = Self::KIND.to_bytes(value)?;
        Ok(Self::from_le_slice(&bytes))
    }

    fn from_number(value: impl Into<Number>) -> Result<Self, CodecError> {
        let integer = Self::KIND.from_number(value)?;
        Ok(Self::from_le_slice(&Self::KIND.encode_unchecked(integer)))
    }
}

macro_rules! impl_fixed_int {
    ($($ty:ty => $kind:expr),* $(,)?) => {$(
        impl FixedInt for $ty {
            const KIND: IntKind = $kind;

            fn to_bytes(self) -> Vec<u8> {
                self.to_le_bytes().to_vec()
            }

            fn from_le_slice(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                <$ty>::from_le_bytes(raw)
            }
        }
    )*};
}

impl_fixed_int!(
    u8 => IntKind::U8,
    u16 => IntKind::U16,
    u32 => IntKind::U32,
    u64 => IntKind::U64,
    u128 => IntKind::U128,
    i8 => IntKind::I8,
    i16 => IntKind::I16,
    i32 => IntKind::I32,
    i64 => IntKind::I64,
    i128 => IntKind::I128,
);

impl FixedInt for U256 {
    const KIND: IntKind = IntKind::U256;

    fn to_bytes(self) -> Vec<u8> {
        self.to_le_bytes::<32>().to_vec()
    }

    fn from_le_slice(bytes: &[u8]) -> Self {
        U256::from_le_slice(bytes)
    }
}

impl FixedInt for I256 {
    const KIND: IntKind = IntKind::I256;

    fn to_bytes(self) -> Vec<u8> {
        self.into_raw().to_le_bytes::<32>().to_vec()
    }

    fn from_le_slice(bytes: &[u8]) -> Self {
        I256::from_raw(U256::from_le_slice(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_round_trip_for_every_width() {
        for kind in IntKind::ALL {
            for value in [kind.min(), kind.max(), Integer::ZERO] {
                let bytes = kind.to_bytes(value).unwrap();
                assert_eq!(bytes.len(), kind.size(), "{kind}");
                assert_eq!(kind.from_bytes(&bytes).unwrap(), value, "{kind}");
            }
        }
    }

    #[test]
    fn one_past_the_bounds_is_rejected() {
        for kind in IntKind::ALL {
            let below = kind.min().pred().unwrap();
            let err = kind.to_bytes(below).unwrap_err();
            assert!(err.is_range_error(), "{kind}: {err}");

            if let Some(above) = kind.max().succ() {
                assert!(kind.to_bytes(above).unwrap_err().is_range_error(), "{kind}");
            }
        }
    }

    #[test]
    fn only_published_widths_exist() {
        assert_eq!(IntKind::from_width(64, false), Some(IntKind::U64));
        assert_eq!(IntKind::from_width(256, true), Some(IntKind::I256));
        for (bits, signed) in [(0, true), (0, false), (7, false), (24, true), (512, false)] {
            assert_eq!(IntKind::from_width(bits, signed), None, "{bits} bits");
        }
        for kind in IntKind::ALL {
            assert_eq!(IntKind::from_width(kind.bits(), kind.is_signed()), Some(kind));
        }
    }

    #[test]
    fn i128_min_round_trips_and_min_minus_one_fails() {
        let min: Integer = "-170141183460469231731687303715884105728".parse().unwrap();
        assert_eq!(min, IntKind::I128.min());
        let bytes = IntKind::I128.to_bytes(min).unwrap();
        let mut expected = vec![0u8; 15];
        expected.push(0x80);
        assert_eq!(bytes, expected);
        assert_eq!(IntKind::I128.from_bytes(&bytes).unwrap(), min);
        assert_eq!(i128::from_bytes(&bytes).unwrap(), i128::MIN);

        let below: Integer = "-170141183460469231731687303715884105729".parse().unwrap();
        assert!(matches!(
            IntKind::I128.to_bytes(below),
            Err(CodecError::OutOfRange { .. })
        ));
    }

    #[test]
    fn twos_complement_layout() {
        assert_eq!(IntKind::I8.to_bytes(-1i8).unwrap(), vec![0xFF]);
        assert_eq!(IntKind::I16.to_bytes(-2i16).unwrap(), vec![0xFE, 0xFF]);
        assert_eq!(IntKind::U32.to_bytes(1u32).unwrap(), vec![1, 0, 0, 0]);
        assert_eq!(IntKind::U256.to_bytes(U256::MAX).unwrap(), vec![0xFF; 32]);

        let mut i256_min = vec![0u8; 31];
        i256_min.push(0x80);
        assert_eq!(IntKind::I256.to_bytes(I256::MIN).unwrap(), i256_min);
        assert_eq!(I256::MIN.to_bytes(), i256_min);
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let bytes = [0x2A, 0, 0, 0, 0, 0, 0, 0, 0xDE, 0xAD];
        assert_eq!(u64::from_bytes(&bytes).unwrap(), 42);
        assert_eq!(IntKind::U64.from_bytes(&bytes).unwrap(), Integer::from(42u8));
    }

    #[test]
    fn short_buffer_is_a_decode_error() {
        let err = IntKind::U32.from_bytes(&[1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            CodecError::InsufficientBytes {
                offset: 0,
                needed: 4,
                available: 3
            }
        );
    }

    #[test]
    fn from_buffer_advances_the_cursor() {
        let mut buf = 7u16.to_bytes();
        buf.extend((-3i32).to_bytes());
        let (a, offset) = u16::from_buffer(&buf, 0).unwrap();
        let (b, offset) = i32::from_buffer(&buf, offset).unwrap();
        assert_eq!((a, b, offset), (7, -3, 6));
        assert!(u8::from_buffer(&buf, offset).unwrap_err().is_decode_error());
    }

    #[test]
    fn from_number_accepts_integral_floats_only() {
        assert_eq!(u8::from_number(255.0).unwrap(), 255);
        assert_eq!(i64::from_number(-12.0).unwrap(), -12);
        assert!(matches!(
            u8::from_number(1.5),
            Err(CodecError::NotAnInteger { .. })
        ));
        assert!(u8::from_number(f64::NAN).is_err());
        assert!(u64::from_number(9_007_199_254_740_992.0).is_err());
        assert!(u8::from_number(256.0).unwrap_err().is_range_error());
        assert!(u32::from_number(-1.0).unwrap_err().is_range_error());
    }

    #[test]
    fn from_number_accepts_big_integers() {
        let max = IntKind::U256.max();
        assert_eq!(U256::from_number(max).unwrap(), U256::MAX);
        assert!(u128::from_number(max).is_err());
        assert_eq!(
            I256::from_number(IntKind::I256.min()).unwrap(),
            I256::MIN
        );
    }

    #[test]
    fn integer_ordering_and_display() {
        let a: Integer = "-5".parse().unwrap();
        let b: Integer = "3".parse().unwrap();
        assert!(a < b);
        assert!(a < Integer::ZERO);
        assert_eq!(a.to_string(), "-5");
        assert_eq!("-0".parse::<Integer>().unwrap(), Integer::ZERO);
        assert!("12a".parse::<Integer>().is_err());
        assert_eq!(Integer::ZERO.pred().unwrap().to_string(), "-1");
        assert_eq!(a.succ().unwrap().to_string(), "-4");
    }

    #[test]
    fn kind_display() {
        assert_eq!(IntKind::U64.to_string(), "u64");
        assert_eq!(IntKind::I256.to_string(), "i256");
    }
}
