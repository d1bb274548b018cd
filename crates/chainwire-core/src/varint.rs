//! Unsigned LEB128 varints, the integer encoding used by the operation wire
//! format (fees, periods, amounts, lengths).

use crate::error::CodecError;

/// Append the LEB128 encoding of `value` to `out`.
pub fn write_u64(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// LEB128 encoding of `value` as a fresh buffer.
pub fn encode_u64(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    write_u64(&mut out, value);
    out
}

/// Read a varint at `offset`, returning the value and the offset past it.
pub fn read_u64(buffer: &[u8], offset: usize) -> Result<(u64, usize), CodecError> {
    let mut value: u64 = 0;
    let mut shift = 0u32;
    let mut cursor = offset;
    loop {
        let byte = *buffer
            .get(cursor)
            .ok_or_else(|| CodecError::insufficient(cursor, 1, buffer.len()))?;
        let low = u64::from(byte & 0x7F);
        if (shift == 63 && low > 1) || shift > 63 {
            return Err(CodecError::VarintOverflow { offset });
        }
        value |= low << shift;
        cursor += 1;
        if byte & 0x80 == 0 {
            return Ok((value, cursor));
        }
        shift += 7;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_encodings() {
        assert_eq!(encode_u64(0), vec![0x00]);
        assert_eq!(encode_u64(127), vec![0x7F]);
        assert_eq!(encode_u64(128), vec![0x80, 0x01]);
        assert_eq!(encode_u64(1234), vec![0xD2, 0x09]);
        assert_eq!(encode_u64(1_000_000_000), vec![0x80, 0x94, 0xEB, 0xDC, 0x03]);
        assert_eq!(encode_u64(u64::MAX).len(), 10);
    }

    #[test]
    fn read_back() {
        for value in [0, 1, 300, 10_000_000, u64::MAX] {
            let mut buf = vec![0xAA];
            write_u64(&mut buf, value);
            let (decoded, end) = read_u64(&buf, 1).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(end, buf.len());
        }
    }

    #[test]
    fn truncated_varint() {
        let err = read_u64(&[0x80, 0x80], 0).unwrap_err();
        assert!(matches!(err, CodecError::InsufficientBytes { offset: 2, .. }));
    }

    #[test]
    fn overflowing_varint() {
        let mut bytes = vec![0xFF; 9];
        bytes.push(0x02);
        assert_eq!(
            read_u64(&bytes, 0).unwrap_err(),
            CodecError::VarintOverflow { offset: 0 }
        );
    }
}
