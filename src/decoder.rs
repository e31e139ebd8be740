//! Parses a byte buffer into validated tables.
//!
//! Parsing happens in two passes: first each section is read sequentially
//! (§4.2's per-record layouts), then every cross-table reference is
//! checked (object → class name, object → values window, value → key,
//! value → object). The first violation in either pass aborts decoding.

use crate::{
    class_name::ClassName,
    header::{Header, HEADER_LEN},
    key::Key,
    object::Object,
    value::{Value, ValueType},
    Error,
};
use log::debug;

/// The four parsed tables, in the order the façade exposes them.
pub(crate) struct Tables {
    pub objects: Vec<Object>,
    pub keys: Vec<Key>,
    pub values: Vec<Value>,
    pub class_names: Vec<ClassName>,
}

pub(crate) fn decode(bytes: &[u8]) -> Result<Tables, Error> {
    let mut offset = 0;
    let header = Header::read(bytes, &mut offset)?;

    for (name, section_offset) in [
        ("objects", header.offset_objects),
        ("keys", header.offset_keys),
        ("values", header.offset_values),
        ("class names", header.offset_class_names),
    ] {
        if (section_offset as usize) < HEADER_LEN || section_offset as usize > bytes.len() {
            return Err(Error::InvalidData(format!(
                "{name} offset {section_offset} is outside the buffer (len {})",
                bytes.len()
            )));
        }
    }

    let mut offset = header.offset_objects as usize;
    let mut objects = Vec::with_capacity(header.object_count as usize);
    for i in 0..header.object_count as usize {
        objects.push(Object::read(bytes, &mut offset, i)?);
    }
    debug!("decoded {} object(s)", objects.len());

    let mut offset = header.offset_keys as usize;
    let mut keys = Vec::with_capacity(header.key_count as usize);
    for i in 0..header.key_count as usize {
        keys.push(Key::read(bytes, &mut offset, i)?);
    }
    debug!("decoded {} key(s)", keys.len());

    let mut offset = header.offset_values as usize;
    let mut values = Vec::with_capacity(header.value_count as usize);
    for i in 0..header.value_count as usize {
        values.push(Value::read(bytes, &mut offset, i)?);
    }
    debug!("decoded {} value(s)", values.len());

    let mut offset = header.offset_class_names as usize;
    let mut class_names = Vec::with_capacity(header.class_name_count as usize);
    for i in 0..header.class_name_count as usize {
        class_names.push(ClassName::read(bytes, &mut offset, i)?);
    }
    debug!("decoded {} class name(s)", class_names.len());

    validate_cross_references(&objects, &keys, &values, &class_names)?;

    Ok(Tables {
        objects,
        keys,
        values,
        class_names,
    })
}

pub(crate) fn validate_cross_references(
    objects: &[Object],
    keys: &[Key],
    values: &[Value],
    class_names: &[ClassName],
) -> Result<(), Error> {
    for (index, object) in objects.iter().enumerate() {
        if object.class_name_index() as usize >= class_names.len() {
            return Err(Error::ObjectInvalidClassNameIndex {
                index,
                class_name_index: object.class_name_index(),
                class_names_len: class_names.len(),
            });
        }
        if object.values_index() as usize > values.len() {
            return Err(Error::ObjectInvalidValuesOffset {
                index,
                values_offset: object.values_index(),
                values_len: values.len(),
            });
        }
        let end = object.values_index() as u64 + object.value_count() as u64;
        if end > values.len() as u64 {
            return Err(Error::ObjectInvalidValuesCount {
                index,
                values_offset: object.values_index(),
                values_count: object.value_count(),
                values_len: values.len(),
            });
        }
    }

    for (index, value) in values.iter().enumerate() {
        if value.key_index() as usize >= keys.len() {
            return Err(Error::ValueInvalidKeyIndex {
                index,
                key_index: value.key_index(),
                keys_len: keys.len(),
            });
        }
        if let ValueType::ObjectReference(object_index) = value.value_type() {
            if *object_index as usize >= objects.len() {
                return Err(Error::ValueInvalidObjectReference {
                    index,
                    object_index: *object_index,
                    objects_len: objects.len(),
                });
            }
        }
    }

    Ok(())
}
