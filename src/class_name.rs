use crate::{varint, Error};
use log::trace;

/// A single entry in the class-names table.
///
/// `fallback_class_indices` is an ordered, possibly-empty list of indices
/// into the class-names table; their meaning is opaque to the codec and is
/// not validated against `class_names.len()` (the codec's cross-table
/// validation covers object/value/key cross-references only; see the
/// crate's design notes on this open question).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassName {
    name: String,
    fallback_class_indices: Vec<u32>,
}

impl ClassName {
    /// Creates a new class name entry.
    pub fn new(name: impl Into<String>, fallback_class_indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            fallback_class_indices,
        }
    }

    /// The class's name, with the wire format's trailing NUL already
    /// stripped.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Indices of this class's fallback classes.
    pub fn fallback_class_indices(&self) -> &[u32] {
        &self.fallback_class_indices
    }

    /// Resolves [`Self::fallback_class_indices`] against a class-names
    /// table. Pass the return value of [`crate::NIBArchive::class_names`].
    ///
    /// Panics if an index is out of bounds; the codec does not validate
    /// these indices (see the struct docs), so out-of-range values can
    /// only come from a table a caller assembled by hand.
    pub fn fallback_classes<'a>(&self, class_names: &'a [ClassName]) -> Vec<&'a ClassName> {
        self.fallback_class_indices
            .iter()
            .map(|&i| &class_names[i as usize])
            .collect()
    }

    pub(crate) fn read(bytes: &[u8], offset: &mut usize, index: usize) -> Result<Self, Error> {
        let name_length = varint::read_u32(bytes, offset).map_err(|_| {
            Error::InvalidData(format!("class name {index}: failed to read name length"))
        })? as usize;
        let fallback_count = varint::read_u32(bytes, offset).map_err(|_| {
            Error::InvalidData(format!(
                "class name {index}: failed to read fallback class count"
            ))
        })?;

        let mut fallback_class_indices = Vec::with_capacity(fallback_count as usize);
        for _ in 0..fallback_count {
            let start = *offset;
            let end = start.checked_add(4).ok_or_else(|| {
                Error::InvalidData(format!("class name {index}: fallback index overflows"))
            })?;
            let raw = bytes.get(start..end).ok_or_else(|| {
                Error::InvalidData(format!(
                    "class name {index}: truncated fallback class index at {start}"
                ))
            })?;
            *offset = end;
            fallback_class_indices.push(u32::from_le_bytes(raw.try_into().unwrap()));
        }

        if name_length == 0 {
            return Err(Error::InvalidData(format!(
                "class name {index}: name length 0 cannot hold a NUL terminator"
            )));
        }
        let start = *offset;
        let end = start.checked_add(name_length).ok_or_else(|| {
            Error::InvalidData(format!("class name {index}: name length {name_length} overflows"))
        })?;
        let mut name_bytes = bytes
            .get(start..end)
            .ok_or_else(|| {
                Error::InvalidData(format!(
                    "class name {index}: truncated name (wanted {name_length} bytes at {start})"
                ))
            })?
            .to_vec();
        *offset = end;
        if name_bytes.pop() != Some(0) {
            return Err(Error::InvalidData(format!(
                "class name {index}: name is not NUL-terminated"
            )));
        }
        let name = String::from_utf8(name_bytes).map_err(|e| {
            Error::InvalidData(format!("class name {index}: name is not valid UTF-8: {e}"))
        })?;

        trace!("class_name[{index}]: {name:?} with {fallback_count} fallback(s)");
        Ok(Self {
            name,
            fallback_class_indices,
        })
    }

    pub(crate) fn write(&self, buf: &mut Vec<u8>) {
        varint::write(buf, self.name.len() as u64 + 1);
        varint::write(buf, self.fallback_class_indices.len() as u64);
        for &index in &self.fallback_class_indices {
            buf.extend_from_slice(&index.to_le_bytes());
        }
        buf.extend_from_slice(self.name.as_bytes());
        buf.push(0x00);
    }

    /// Consumes itself, returning `(name, fallback_class_indices)`.
    pub fn into_inner(self) -> (String, Vec<u32>) {
        (self.name, self.fallback_class_indices)
    }
}
