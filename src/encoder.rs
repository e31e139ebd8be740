//! Serializes validated tables back into the canonical byte layout.
//!
//! Section order is fixed: objects, keys, values, class names. Offsets
//! are absolute positions computed from the cumulative length of
//! everything written before them. Given identical input tables, the
//! output is byte-identical every time: section sizes are a pure function
//! of the records themselves.

use crate::{
    decoder::{validate_cross_references, Tables},
    header::{Header, HEADER_LEN, SUPPORTED_MAJOR_VERSION, SUPPORTED_MINOR_VERSION},
    Error,
};
use log::trace;

pub(crate) fn encode(tables: &Tables) -> Result<Vec<u8>, Error> {
    validate_cross_references(
        &tables.objects,
        &tables.keys,
        &tables.values,
        &tables.class_names,
    )?;
    for (index, key) in tables.keys.iter().enumerate() {
        if key.as_bytes().is_empty() {
            return Err(Error::KeyInvalidClass {
                index,
                reason: "key must not be empty".into(),
            });
        }
    }

    let mut objects_bytes = Vec::with_capacity(tables.objects.len() * 6);
    for object in &tables.objects {
        object.write(&mut objects_bytes);
    }

    let mut keys_bytes = Vec::with_capacity(tables.keys.len() * 18);
    for key in &tables.keys {
        key.write(&mut keys_bytes);
    }

    let mut values_bytes = Vec::with_capacity(tables.values.len() * 10);
    for value in &tables.values {
        value.write(&mut values_bytes);
    }

    let mut class_names_bytes = Vec::with_capacity(tables.class_names.len() * 16);
    for class_name in &tables.class_names {
        class_name.write(&mut class_names_bytes);
    }

    let offset_objects = HEADER_LEN;
    let offset_keys = offset_objects + objects_bytes.len();
    let offset_values = offset_keys + keys_bytes.len();
    let offset_class_names = offset_values + values_bytes.len();
    trace!(
        "section layout: objects@{offset_objects} keys@{offset_keys} values@{offset_values} class_names@{offset_class_names}"
    );

    let header = Header {
        major_version: SUPPORTED_MAJOR_VERSION,
        minor_version: SUPPORTED_MINOR_VERSION,
        object_count: tables.objects.len() as u32,
        offset_objects: offset_objects as u32,
        key_count: tables.keys.len() as u32,
        offset_keys: offset_keys as u32,
        value_count: tables.values.len() as u32,
        offset_values: offset_values as u32,
        class_name_count: tables.class_names.len() as u32,
        offset_class_names: offset_class_names as u32,
    };

    let mut buffer = Vec::with_capacity(
        HEADER_LEN
            + objects_bytes.len()
            + keys_bytes.len()
            + values_bytes.len()
            + class_names_bytes.len(),
    );
    header.write(&mut buffer);
    buffer.extend_from_slice(&objects_bytes);
    buffer.extend_from_slice(&keys_bytes);
    buffer.extend_from_slice(&values_bytes);
    buffer.extend_from_slice(&class_names_bytes);

    Ok(buffer)
}
