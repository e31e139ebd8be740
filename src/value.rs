use crate::{key::Key, varint, Error};
use log::trace;
use std::hash::{Hash, Hasher};

/// The tagged payload of a [`Value`].
///
/// Variant names and the 0..10 numeric tag mapping follow the wire format's
/// value-type discriminator exactly (see [`ValueType::tag`]).
#[derive(Debug, Clone, PartialEq)]
pub enum ValueType {
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    True,
    False,
    Float(f32),
    Double(f64),
    Data(Vec<u8>),
    Nil,
    ObjectReference(u32),
}

impl ValueType {
    /// The wire tag byte for this variant, 0..10.
    pub fn tag(&self) -> u8 {
        match self {
            ValueType::UInt8(_) => 0,
            ValueType::UInt16(_) => 1,
            ValueType::UInt32(_) => 2,
            ValueType::UInt64(_) => 3,
            ValueType::True => 4,
            ValueType::False => 5,
            ValueType::Float(_) => 6,
            ValueType::Double(_) => 7,
            ValueType::Data(_) => 8,
            ValueType::Nil => 9,
            ValueType::ObjectReference(_) => 10,
        }
    }

    /// The on-wire payload bytes for this variant (little-endian), not
    /// including the tag byte or, for `Data`, its length prefix.
    fn payload_bytes(&self) -> Vec<u8> {
        match self {
            ValueType::UInt8(v) => v.to_le_bytes().to_vec(),
            ValueType::UInt16(v) => v.to_le_bytes().to_vec(),
            ValueType::UInt32(v) => v.to_le_bytes().to_vec(),
            ValueType::UInt64(v) => v.to_le_bytes().to_vec(),
            ValueType::True | ValueType::False | ValueType::Nil => Vec::new(),
            ValueType::Float(v) => v.to_le_bytes().to_vec(),
            ValueType::Double(v) => v.to_le_bytes().to_vec(),
            ValueType::Data(v) => v.clone(),
            ValueType::ObjectReference(v) => v.to_le_bytes().to_vec(),
        }
    }

    fn read(bytes: &[u8], offset: &mut usize, tag: u8, index: usize) -> Result<Self, Error> {
        let read_fixed = |bytes: &[u8], offset: &mut usize, n: usize| -> Result<&[u8], Error> {
            let start = *offset;
            let end = start.checked_add(n).ok_or_else(|| {
                Error::InvalidData(format!("value {index}: payload length overflows"))
            })?;
            let slice = bytes.get(start..end).ok_or_else(|| {
                Error::InvalidData(format!(
                    "value {index}: truncated payload (wanted {n} bytes at {start})"
                ))
            })?;
            *offset = end;
            Ok(slice)
        };

        Ok(match tag {
            0 => ValueType::UInt8(read_fixed(bytes, offset, 1)?[0]),
            1 => ValueType::UInt16(u16::from_le_bytes(
                read_fixed(bytes, offset, 2)?.try_into().unwrap(),
            )),
            2 => ValueType::UInt32(u32::from_le_bytes(
                read_fixed(bytes, offset, 4)?.try_into().unwrap(),
            )),
            3 => ValueType::UInt64(u64::from_le_bytes(
                read_fixed(bytes, offset, 8)?.try_into().unwrap(),
            )),
            4 => ValueType::True,
            5 => ValueType::False,
            6 => ValueType::Float(f32::from_le_bytes(
                read_fixed(bytes, offset, 4)?.try_into().unwrap(),
            )),
            7 => ValueType::Double(f64::from_le_bytes(
                read_fixed(bytes, offset, 8)?.try_into().unwrap(),
            )),
            8 => {
                let length = varint::read_u32(bytes, offset).map_err(|_| {
                    Error::InvalidData(format!("value {index}: failed to read data length"))
                })? as usize;
                ValueType::Data(read_fixed(bytes, offset, length)?.to_vec())
            }
            9 => ValueType::Nil,
            10 => ValueType::ObjectReference(u32::from_le_bytes(
                read_fixed(bytes, offset, 4)?.try_into().unwrap(),
            )),
            _ => {
                return Err(Error::ValueReadType {
                    index,
                    type_byte: Some(tag),
                })
            }
        })
    }

    fn write(&self, buf: &mut Vec<u8>) {
        buf.push(self.tag());
        match self {
            ValueType::Data(v) => {
                varint::write(buf, v.len() as u64);
                buf.extend_from_slice(v);
            }
            ValueType::True | ValueType::False | ValueType::Nil => {}
            other => buf.extend_from_slice(&other.payload_bytes()),
        }
    }
}

/// A single entry in the values table: a key index paired with a tagged
/// payload.
///
/// Equality and hashing are defined over `(key_index, type tag, payload
/// bytes)`, per the wire contract, not over `ValueType`'s derived
/// structural equality, which would be unable to implement `Hash` for the
/// `Float`/`Double` variants.
#[derive(Debug, Clone)]
pub struct Value {
    key_index: u32,
    value_type: ValueType,
}

impl Value {
    /// Creates a value from an already-typed payload. The primary,
    /// idiomatic constructor: misuse (wrong payload length for the tag) is
    /// unrepresentable because `ValueType` carries typed fields, not raw
    /// bytes.
    pub fn new(key_index: u32, value_type: ValueType) -> Self {
        Self {
            key_index,
            value_type,
        }
    }

    /// Creates an object-reference value pointing at `object_index`.
    pub fn new_object_reference(key_index: u32, object_index: u32) -> Self {
        Self::new(key_index, ValueType::ObjectReference(object_index))
    }

    /// Creates a `Data`-typed value from raw bytes.
    pub fn new_data(key_index: u32, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(key_index, ValueType::Data(bytes.into()))
    }

    /// Creates a value from a raw wire tag byte and payload bytes, the way
    /// the decoder itself builds values. Returns [`Error::InvalidData`] if
    /// `type_tag` isn't 0..10, or if `payload`'s length doesn't match what
    /// `type_tag` requires.
    pub fn from_payload(key_index: u32, type_tag: u8, payload: &[u8]) -> Result<Self, Error> {
        let mut offset = 0;
        // Re-use the wire reader against a buffer that's just the payload
        // plus (for Data) its own length prefix, so length mismatches are
        // caught the same way truncation is during decode.
        let mut framed = Vec::with_capacity(payload.len() + 4);
        if type_tag == 8 {
            varint::write(&mut framed, payload.len() as u64);
        }
        framed.extend_from_slice(payload);
        let value_type = ValueType::read(&framed, &mut offset, type_tag, usize::MAX)
            .map_err(|_| Error::InvalidData(format!("payload does not match type tag {type_tag}")))?;
        if offset != framed.len() {
            return Err(Error::InvalidData(format!(
                "payload has {} trailing bytes for type tag {type_tag}",
                framed.len() - offset
            )));
        }
        Ok(Self::new(key_index, value_type))
    }

    pub(crate) fn read(bytes: &[u8], offset: &mut usize, index: usize) -> Result<Self, Error> {
        let key_index = varint::read_u32(bytes, offset)
            .map_err(|_| Error::ValueReadKeyIndex { index })?;
        let tag = *bytes.get(*offset).ok_or(Error::ValueReadType {
            index,
            type_byte: None,
        })?;
        *offset += 1;
        let value_type = ValueType::read(bytes, offset, tag, index)?;
        trace!("value[{index}]: key_index={key_index} tag={tag}");
        Ok(Self { key_index, value_type })
    }

    pub(crate) fn write(&self, buf: &mut Vec<u8>) {
        varint::write(buf, self.key_index as u64);
        self.value_type.write(buf);
    }

    /// The index into the keys table this value is named by.
    pub fn key_index(&self) -> u32 {
        self.key_index
    }

    /// The key associated with this value.
    ///
    /// Pass the return value of [`crate::NIBArchive::keys`] for a correct
    /// result.
    pub fn key<'a>(&self, keys: &'a [Key]) -> &'a Key {
        &keys[self.key_index as usize]
    }

    /// The typed payload.
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// The on-wire type tag, 0..10.
    pub fn tag(&self) -> u8 {
        self.value_type.tag()
    }

    /// Consumes itself, returning `(key_index, value_type)`.
    pub fn into_inner(self) -> (u32, ValueType) {
        (self.key_index, self.value_type)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.key_index == other.key_index
            && self.tag() == other.tag()
            && self.value_type.payload_bytes() == other.value_type.payload_bytes()
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_index.hash(state);
        self.tag().hash(state);
        self.value_type.payload_bytes().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: Value) {
        let mut buf = Vec::new();
        value.write(&mut buf);
        let mut offset = 0;
        let decoded = Value::read(&buf, &mut offset, 0).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(offset, buf.len());
    }

    #[test]
    fn round_trips_every_variant() {
        round_trip(Value::new(0, ValueType::UInt8(7)));
        round_trip(Value::new(1, ValueType::UInt16(300)));
        round_trip(Value::new(2, ValueType::UInt32(70_000)));
        round_trip(Value::new(3, ValueType::UInt64(u64::MAX)));
        round_trip(Value::new(4, ValueType::True));
        round_trip(Value::new(5, ValueType::False));
        round_trip(Value::new(6, ValueType::Float(1.5)));
        round_trip(Value::new(7, ValueType::Double(-2.25)));
        round_trip(Value::new_data(8, vec![1, 2, 3]));
        round_trip(Value::new(9, ValueType::Nil));
        round_trip(Value::new_object_reference(10, 4));
    }

    #[test]
    fn unknown_type_tag_is_rejected() {
        let mut buf = Vec::new();
        varint::write(&mut buf, 0); // key index
        buf.push(200); // bogus tag
        let mut offset = 0;
        let err = Value::read(&buf, &mut offset, 0).unwrap_err();
        assert_eq!(
            err,
            Error::ValueReadType {
                index: 0,
                type_byte: Some(200)
            }
        );
    }

    #[test]
    fn equality_is_value_based_not_float_bitwise() {
        let a = Value::new(0, ValueType::Float(1.0));
        let b = Value::new(0, ValueType::Float(1.0));
        assert_eq!(a, b);
        let mut hasher_a = std::collections::hash_map::DefaultHasher::new();
        let mut hasher_b = std::collections::hash_map::DefaultHasher::new();
        a.hash(&mut hasher_a);
        b.hash(&mut hasher_b);
        assert_eq!(hasher_a.finish(), hasher_b.finish());
    }

    #[test]
    fn from_payload_rejects_mismatched_length() {
        assert!(Value::from_payload(0, 2 /* UInt32 */, &[1, 2]).is_err());
        assert!(Value::from_payload(0, 2, &[1, 2, 3, 4]).is_ok());
    }

    #[test]
    fn truncated_before_key_index_is_read_key_index_error() {
        let buf: Vec<u8> = Vec::new();
        let mut offset = 0;
        let err = Value::read(&buf, &mut offset, 4).unwrap_err();
        assert_eq!(err, Error::ValueReadKeyIndex { index: 4 });
    }
}
