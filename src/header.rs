use crate::Error;

/// The format's magic bytes, the first 10 bytes of every archive.
pub(crate) const MAGIC_BYTES: &[u8; 10] = b"NIBArchive";

pub(crate) const SUPPORTED_MAJOR_VERSION: u32 = 1;
pub(crate) const SUPPORTED_MINOR_VERSION: u32 = 9;

/// Total size in bytes of the fixed header: 10-byte magic plus 10 `u32`
/// fields (2 version words + 4 `(count, offset)` pairs).
pub(crate) const HEADER_LEN: usize = 10 + 10 * 4;

/// The fixed 50-byte header: magic, version, and the four `(count,
/// offset)` pairs naming each section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Header {
    pub major_version: u32,
    pub minor_version: u32,
    pub object_count: u32,
    pub offset_objects: u32,
    pub key_count: u32,
    pub offset_keys: u32,
    pub value_count: u32,
    pub offset_values: u32,
    pub class_name_count: u32,
    pub offset_class_names: u32,
}

fn read_u32(bytes: &[u8], offset: &mut usize) -> Result<u32, Error> {
    let start = *offset;
    let end = start + 4;
    let raw = bytes
        .get(start..end)
        .ok_or_else(|| Error::InvalidHeader(format!("truncated header at offset {start}")))?;
    *offset = end;
    Ok(u32::from_le_bytes(raw.try_into().unwrap()))
}

impl Header {
    /// Reads the magic bytes and the 40 bytes of `u32` fields that follow
    /// them, validating the magic and the supported version. `offset` must
    /// point at byte 0 of the archive.
    pub(crate) fn read(bytes: &[u8], offset: &mut usize) -> Result<Self, Error> {
        let magic = bytes
            .get(0..10)
            .ok_or_else(|| Error::InvalidHeader("buffer shorter than magic bytes".into()))?;
        if magic != MAGIC_BYTES {
            return Err(Error::InvalidHeader(
                "magic bytes do not match \"NIBArchive\"".into(),
            ));
        }
        *offset = 10;

        let major_version = read_u32(bytes, offset)?;
        let minor_version = read_u32(bytes, offset)?;
        if major_version != SUPPORTED_MAJOR_VERSION || minor_version != SUPPORTED_MINOR_VERSION {
            return Err(Error::InvalidHeader(format!(
                "unsupported version {major_version}.{minor_version}, expected {SUPPORTED_MAJOR_VERSION}.{SUPPORTED_MINOR_VERSION}"
            )));
        }

        let object_count = read_u32(bytes, offset)?;
        let offset_objects = read_u32(bytes, offset)?;
        let key_count = read_u32(bytes, offset)?;
        let offset_keys = read_u32(bytes, offset)?;
        let value_count = read_u32(bytes, offset)?;
        let offset_values = read_u32(bytes, offset)?;
        let class_name_count = read_u32(bytes, offset)?;
        let offset_class_names = read_u32(bytes, offset)?;

        Ok(Self {
            major_version,
            minor_version,
            object_count,
            offset_objects,
            key_count,
            offset_keys,
            value_count,
            offset_values,
            class_name_count,
            offset_class_names,
        })
    }

    pub(crate) fn write(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(MAGIC_BYTES);
        buf.extend_from_slice(&self.major_version.to_le_bytes());
        buf.extend_from_slice(&self.minor_version.to_le_bytes());
        buf.extend_from_slice(&self.object_count.to_le_bytes());
        buf.extend_from_slice(&self.offset_objects.to_le_bytes());
        buf.extend_from_slice(&self.key_count.to_le_bytes());
        buf.extend_from_slice(&self.offset_keys.to_le_bytes());
        buf.extend_from_slice(&self.value_count.to_le_bytes());
        buf.extend_from_slice(&self.offset_values.to_le_bytes());
        buf.extend_from_slice(&self.class_name_count.to_le_bytes());
        buf.extend_from_slice(&self.offset_class_names.to_le_bytes());
    }
}
