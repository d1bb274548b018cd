//! Error types for the ChainWire codecs.

use thiserror::Error;

/// Errors raised while encoding or decoding positional binary data.
///
/// Every variant is a programming error on the caller's side (a value that
/// does not fit its declared width, a buffer that does not match the agreed
/// layout). None of them are worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("{value} is out of range for {kind} [{min}, {max}]")]
    OutOfRange {
        kind: String,
        value: String,
        min: String,
        max: String,
    },

    #[error("{value} is not a safe integer")]
    NotAnInteger { value: String },

    #[error("need {needed} bytes at offset {offset}, only {available} available")]
    InsufficientBytes {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("length prefix at offset {offset} declares {declared} bytes, only {available} available")]
    LengthPrefixOverflow {
        offset: usize,
        declared: usize,
        available: usize,
    },

    #[error("{len} bytes do not fit a 4-byte length prefix")]
    LengthPrefixTooLarge { len: usize },

    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("varint at offset {offset} does not fit in 64 bits")]
    VarintOverflow { offset: usize },

    #[error("deserializer made no progress at offset {offset}")]
    NoProgress { offset: usize },

    #[error("unsupported value {got} in a {unit} array")]
    UnsupportedType { unit: String, got: String },

    #[error("string of {len} bytes exceeds the {max}-byte slot")]
    StringTooLong { len: usize, max: usize },

    #[error("non-integer element count: {len} bytes is not a multiple of stride {stride}")]
    NonIntegerElementCount { len: usize, stride: usize },
}

impl CodecError {
    /// `true` for errors raised because a value does not fit its width.
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            Self::OutOfRange { .. } | Self::NotAnInteger { .. } | Self::LengthPrefixTooLarge { .. }
        )
    }

    /// `true` for errors raised because a buffer is shorter or shaped
    /// differently than the reader expected.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::InsufficientBytes { .. }
                | Self::LengthPrefixOverflow { .. }
                | Self::InvalidUtf8 { .. }
                | Self::VarintOverflow { .. }
                | Self::NoProgress { .. }
                | Self::NonIntegerElementCount { .. }
        )
    }

    pub(crate) fn insufficient(offset: usize, needed: usize, buffer_len: usize) -> Self {
        Self::InsufficientBytes {
            offset,
            needed,
            available: buffer_len.saturating_sub(offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let range = CodecError::NotAnInteger { value: "1.5".into() };
        assert!(range.is_range_error());
        assert!(!range.is_decode_error());

        let short = CodecError::insufficient(6, 8, 10);
        assert_eq!(
            short,
            CodecError::InsufficientBytes {
                offset: 6,
                needed: 8,
                available: 4
            }
        );
        assert!(short.is_decode_error());
    }

    #[test]
    fn insufficient_past_end_reports_zero_available() {
        let err = CodecError::insufficient(12, 4, 10);
        assert_eq!(
            err.to_string(),
            "need 4 bytes at offset 12, only 0 available"
        );
    }
}
