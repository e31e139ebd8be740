use crate::{value::Value, varint, ClassName, Error};
use log::trace;

/// A single entry in the objects table: a class name plus a window into
/// the values table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Object {
    class_name_index: u32,
    values_index: u32,
    value_count: u32,
}

impl Object {
    /// Creates a new object entry. Does not check `class_name_index` or
    /// the values window against any table; those invariants are enforced
    /// when the object is fed to the encoder.
    pub fn new(class_name_index: u32, values_index: u32, value_count: u32) -> Self {
        Self {
            class_name_index,
            values_index,
            value_count,
        }
    }

    /// Index of the [`ClassName`] describing this object.
    pub fn class_name_index(&self) -> u32 {
        self.class_name_index
    }

    /// Index of the first [`Value`] this object owns.
    pub fn values_index(&self) -> u32 {
        self.values_index
    }

    /// Number of [`Value`]s this object owns, starting at
    /// [`Self::values_index`].
    pub fn value_count(&self) -> u32 {
        self.value_count
    }

    /// The slice of values this object owns. Pass the return value of
    /// [`crate::NIBArchive::values`] for a correct result.
    pub fn values<'a>(&self, values: &'a [Value]) -> &'a [Value] {
        let start = self.values_index as usize;
        let end = start + self.value_count as usize;
        &values[start..end]
    }

    /// The class name describing this object. Pass the return value of
    /// [`crate::NIBArchive::class_names`] for a correct result.
    pub fn class_name<'a>(&self, class_names: &'a [ClassName]) -> &'a ClassName {
        &class_names[self.class_name_index as usize]
    }

    pub(crate) fn read(bytes: &[u8], offset: &mut usize, index: usize) -> Result<Self, Error> {
        let class_name_index = varint::read_u32(bytes, offset)
            .map_err(|_| Error::ObjectReadClassNameIndex { index })?;
        let values_index = varint::read_u32(bytes, offset)
            .map_err(|_| Error::ObjectReadValuesOffset { index })?;
        let value_count = varint::read_u32(bytes, offset)
            .map_err(|_| Error::ObjectReadValuesCount { index })?;
        trace!(
            "object[{index}]: class_name_index={class_name_index} values_index={values_index} value_count={value_count}"
        );
        Ok(Self {
            class_name_index,
            values_index,
            value_count,
        })
    }

    pub(crate) fn write(&self, buf: &mut Vec<u8>) {
        varint::write(buf, self.class_name_index as u64);
        varint::write(buf, self.values_index as u64);
        varint::write(buf, self.value_count as u64);
    }

    /// Consumes itself, returning `(class_name_index, values_index, value_count)`.
    pub fn into_inner(self) -> (u32, u32, u32) {
        (self.class_name_index, self.values_index, self.value_count)
    }
}
