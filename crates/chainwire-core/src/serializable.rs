//! The `Serializable` capability for nested value types.

use crate::error::CodecError;

/// A value with its own self-terminating binary form.
///
/// `deserialize` must report exactly how many bytes it consumed by returning
/// the offset just past the instance. Object arrays are stored as plain
/// concatenations, so a type that gets this wrong corrupts every element
/// that follows it.
pub trait Serializable: Sized {
    fn serialize(&self) -> Vec<u8>;

    /// Decode an instance starting at `offset`; returns it together with the
    /// offset of the first byte it did not consume.
    fn deserialize(data: &[u8], offset: usize) -> Result<(Self, usize), CodecError>;
}

/// Concatenate each object's own encoding. No count, no separators.
pub fn serializable_objects_array_to_bytes<T: Serializable>(objects: &[T]) -> Vec<u8> {
    let parts: Vec<Vec<u8>> = objects.iter().map(Serializable::serialize).collect();
    let mut out = Vec::with_capacity(parts.iter().map(Vec::len).sum());
    for part in parts {
        out.extend_from_slice(&part);
    }
    out
}

/// Decode objects back-to-back until the buffer is consumed.
pub fn bytes_to_serializable_object_array<T: Serializable>(
    data: &[u8],
) -> Result<Vec<T>, CodecError> {
    let mut objects = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        let (object, next) = T::deserialize(data, offset)?;
        if next <= offset {
            return Err(CodecError::NoProgress { offset });
        }
        objects.push(object);
        offset = next;
    }
    Ok(objects)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::args::Args;

    /// A small record used to exercise nesting throughout the crate's tests.
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct Holder {
        pub name: String,
        pub amount: u64,
    }

    impl Serializable for Holder {
        fn serialize(&self) -> Vec<u8> {
            Args::new()
                .add_string(&self.name)
                .add_u64(self.amount)
                .serialize()
        }

        fn deserialize(data: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
            let mut args = Args::from_bytes(data).with_offset(offset);
            let name = args.next_string()?;
            let amount = args.next_u64()?;
            Ok((Holder { name, amount }, args.offset()))
        }
    }

    /// Deliberately reports one byte short.
    struct Liar(u8);

    impl Serializable for Liar {
        fn serialize(&self) -> Vec<u8> {
            vec![self.0, self.0]
        }

        fn deserialize(data: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
            Ok((Liar(data[offset]), offset + 1))
        }
    }

    #[test]
    fn holder_reports_exact_consumed_length() {
        let holder = Holder {
            name: "héllo".into(),
            amount: 9,
        };
        let mut bytes = holder.serialize();
        let own_len = bytes.len();
        assert_eq!(own_len, 4 + "héllo".len() + 8);
        bytes.extend([0xEE, 0xEE]);
        let (back, end) = Holder::deserialize(&bytes, 0).unwrap();
        assert_eq!(back, holder);
        assert_eq!(end, own_len);
    }

    #[test]
    fn object_array_round_trip_keeps_order() {
        let holders: Vec<Holder> = (0..5)
            .map(|i| Holder {
                name: "x".repeat(i),
                amount: i as u64 * 10,
            })
            .collect();
        let bytes = serializable_objects_array_to_bytes(&holders);
        let back: Vec<Holder> = bytes_to_serializable_object_array(&bytes).unwrap();
        assert_eq!(back, holders);
    }

    #[test]
    fn empty_array() {
        let bytes = serializable_objects_array_to_bytes::<Holder>(&[]);
        assert!(bytes.is_empty());
        let back: Vec<Holder> = bytes_to_serializable_object_array(&bytes).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn misreported_length_corrupts_following_elements() {
        let bytes = serializable_objects_array_to_bytes(&[Liar(1), Liar(2)]);
        let back: Vec<Liar> = bytes_to_serializable_object_array(&bytes).unwrap();
        // Four objects come back instead of two.
        assert_eq!(back.iter().map(|l| l.0).collect::<Vec<_>>(), vec![1, 1, 2, 2]);
    }

    #[test]
    fn truncated_element_fails() {
        let mut bytes = serializable_objects_array_to_bytes(&[Holder {
            name: "ab".into(),
            amount: 1,
        }]);
        bytes.pop();
        let err = bytes_to_serializable_object_array::<Holder>(&bytes).unwrap_err();
        assert!(err.is_decode_error());
    }
}
