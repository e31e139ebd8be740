//! Decoder/encoder for NIBArchive files: a compact binary format for
//! persisting object graphs, historically produced by interface-design
//! tools.
//!
//! A NIBArchive is four parallel tables, [`Object`]s, [`Key`]s,
//! [`Value`]s and [`ClassName`]s, plus a fixed header, laid out with a
//! variable-length integer encoding throughout. [`NIBArchive`] is the
//! façade over those tables: build one from a buffer with
//! [`NIBArchive::from_buffer`], or from tables with
//! [`NIBArchive::from_tables`], and it round-trips byte-exactly back to
//! the original layout.
//!
//! This crate is a pure byte-buffer codec. It does not reconstruct a live
//! object graph, does not know about any particular UI toolkit, and has no
//! file I/O or CLI surface; callers bring their own buffers.

mod class_name;
mod decoder;
mod encoder;
mod error;
mod header;
mod key;
mod object;
mod value;
mod varint;

pub use crate::{class_name::ClassName, error::*, key::Key, object::Object, value::*};

use decoder::Tables;

/// A decoded or to-be-encoded NIB Archive: four ordered tables plus the
/// serialized buffer they correspond to.
///
/// Construct-once, read-many: there are no mutation methods. To change an
/// archive, take its tables apart with [`Self::into_inner`], build new
/// ones, and construct a fresh archive with [`Self::from_tables`].
#[derive(Debug, Clone, PartialEq)]
pub struct NIBArchive {
    buffer: Vec<u8>,
    objects: Vec<Object>,
    keys: Vec<Key>,
    values: Vec<Value>,
    class_names: Vec<ClassName>,
}

impl NIBArchive {
    /// An archive with four empty tables and an empty buffer. No encoding
    /// is performed; [`Self::buffer`] returns an empty slice until the
    /// archive is rebuilt through [`Self::from_tables`].
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            objects: Vec::new(),
            keys: Vec::new(),
            values: Vec::new(),
            class_names: Vec::new(),
        }
    }

    /// Decodes an archive from a byte buffer.
    ///
    /// The buffer is copied into the returned archive; it need not outlive
    /// the call. On failure, the input is untouched and no archive is
    /// produced.
    pub fn from_buffer(bytes: impl AsRef<[u8]>) -> Result<Self, Error> {
        let bytes = bytes.as_ref();
        let tables = decoder::decode(bytes)?;
        Ok(Self {
            buffer: bytes.to_vec(),
            objects: tables.objects,
            keys: tables.keys,
            values: tables.values,
            class_names: tables.class_names,
        })
    }

    /// Encodes an archive from four tables.
    ///
    /// Validates every cross-table reference (object → class name, object
    /// → values window, value → key, value → object) before encoding; see
    /// the crate's error variants for what each violation reports.
    pub fn from_tables(
        objects: Vec<Object>,
        keys: Vec<Key>,
        values: Vec<Value>,
        class_names: Vec<ClassName>,
    ) -> Result<Self, Error> {
        let tables = Tables {
            objects,
            keys,
            values,
            class_names,
        };
        let buffer = encoder::encode(&tables)?;
        Ok(Self {
            buffer,
            objects: tables.objects,
            keys: tables.keys,
            values: tables.values,
            class_names: tables.class_names,
        })
    }

    /// The serialized bytes this archive was constructed from (via
    /// [`Self::from_buffer`]) or produced (via [`Self::from_tables`]).
    /// Empty for [`Self::new`].
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// The objects table.
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// The keys table.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// The values table.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The class names table.
    pub fn class_names(&self) -> &[ClassName] {
        &self.class_names
    }

    /// Consumes the archive, returning its four tables.
    pub fn into_inner(self) -> (Vec<Object>, Vec<Key>, Vec<Value>, Vec<ClassName>) {
        (self.objects, self.keys, self.values, self.class_names)
    }
}

impl Default for NIBArchive {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_archive_encodes_to_fifty_bytes() {
        let archive = NIBArchive::from_tables(vec![], vec![], vec![], vec![]).unwrap();
        assert_eq!(archive.buffer().len(), 50);
        // magic + version(1,9) + four (0, 50) pairs
        let mut expected = Vec::new();
        expected.extend_from_slice(b"NIBArchive");
        expected.extend_from_slice(&1u32.to_le_bytes());
        expected.extend_from_slice(&9u32.to_le_bytes());
        for _ in 0..4 {
            expected.extend_from_slice(&0u32.to_le_bytes());
            expected.extend_from_slice(&50u32.to_le_bytes());
        }
        assert_eq!(archive.buffer(), expected.as_slice());

        let decoded = NIBArchive::from_buffer(archive.buffer()).unwrap();
        assert!(decoded.objects().is_empty());
        assert!(decoded.keys().is_empty());
        assert!(decoded.values().is_empty());
        assert!(decoded.class_names().is_empty());
    }

    #[test]
    fn new_archive_has_no_buffer() {
        let archive = NIBArchive::new();
        assert!(archive.buffer().is_empty());
        assert!(archive.objects().is_empty());
    }

    #[test]
    fn single_value_round_trips_byte_for_byte() {
        let archive = NIBArchive::from_tables(
            vec![Object::new(0, 0, 1)],
            vec![Key::from("k")],
            vec![Value::new(0, ValueType::True)],
            vec![ClassName::new("X", vec![])],
        )
        .unwrap();

        let decoded = NIBArchive::from_buffer(archive.buffer()).unwrap();
        assert_eq!(decoded.objects(), archive.objects());
        assert_eq!(decoded.keys(), archive.keys());
        assert_eq!(decoded.values(), archive.values());
        assert_eq!(decoded.class_names(), archive.class_names());

        let re_encoded = NIBArchive::from_tables(
            decoded.objects().to_vec(),
            decoded.keys().to_vec(),
            decoded.values().to_vec(),
            decoded.class_names().to_vec(),
        )
        .unwrap();
        assert_eq!(re_encoded.buffer(), archive.buffer());
    }

    #[test]
    fn object_reference_validity_boundary() {
        let objects = vec![Object::new(0, 0, 0), Object::new(0, 0, 0)];
        let keys = vec![Key::from("k")];
        let class_names = vec![ClassName::new("X", vec![])];

        let ok = NIBArchive::from_tables(
            objects.clone(),
            keys.clone(),
            vec![Value::new_object_reference(0, 1)],
            class_names.clone(),
        );
        assert!(ok.is_ok());

        let err = NIBArchive::from_tables(
            objects,
            keys,
            vec![Value::new_object_reference(0, 2)],
            class_names,
        );
        assert_eq!(
            err.unwrap_err(),
            Error::ValueInvalidObjectReference {
                index: 0,
                object_index: 2,
                objects_len: 2
            }
        );
    }

    #[test]
    fn truncation_is_rejected() {
        let archive = NIBArchive::from_tables(
            vec![Object::new(0, 0, 1)],
            vec![Key::from("k")],
            vec![Value::new(0, ValueType::True)],
            vec![ClassName::new("X", vec![])],
        )
        .unwrap();

        for len in 1..archive.buffer().len() {
            assert!(
                NIBArchive::from_buffer(&archive.buffer()[..len]).is_err(),
                "buffer truncated to {len} bytes should fail to decode"
            );
        }
    }

    #[test]
    fn bad_magic_is_rejected() {
        let archive = NIBArchive::from_tables(vec![], vec![], vec![], vec![]).unwrap();
        let mut bytes = archive.buffer().to_vec();
        bytes[0] = b'X';
        assert!(matches!(
            NIBArchive::from_buffer(&bytes),
            Err(Error::InvalidHeader(_))
        ));
    }

    #[test]
    fn value_type_byte_mutation_is_rejected() {
        let archive = NIBArchive::from_tables(
            vec![Object::new(0, 0, 1)],
            vec![Key::from("k")],
            vec![Value::new(0, ValueType::True)],
            vec![ClassName::new("X", vec![])],
        )
        .unwrap();

        let mut offset = 0;
        let header = crate::header::Header::read(archive.buffer(), &mut offset).unwrap();
        let mut bytes = archive.buffer().to_vec();
        // The value's type byte sits right after its 1-byte VarInt key
        // index, at the start of the values section.
        let type_byte_offset = header.offset_values as usize + 1;
        bytes[type_byte_offset] = 200;
        let err = NIBArchive::from_buffer(&bytes).unwrap_err();
        assert_eq!(
            err,
            Error::ValueReadType {
                index: 0,
                type_byte: Some(200)
            }
        );
    }

    #[test]
    fn determinism() {
        let make = || {
            NIBArchive::from_tables(
                vec![Object::new(0, 0, 1)],
                vec![Key::from("k")],
                vec![Value::new(0, ValueType::True)],
                vec![ClassName::new("X", vec![])],
            )
            .unwrap()
        };
        assert_eq!(make().buffer(), make().buffer());
    }

    #[test]
    fn empty_key_is_rejected_by_encoder() {
        let err = NIBArchive::from_tables(vec![], vec![Key::new(Vec::new())], vec![], vec![])
            .unwrap_err();
        assert!(matches!(err, Error::KeyInvalidClass { index: 0, .. }));
    }
}
