use crate::{varint, Error};
use log::trace;

/// A single entry in the keys table: a raw name byte-string.
///
/// Keys are opaque bytes to the codec, typically printable ASCII, but
/// nothing here requires valid UTF-8. Values refer to keys by index, not by
/// name, so uniqueness is not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(Vec<u8>);

impl Key {
    /// Creates a key from raw bytes. Does not check non-emptiness; that
    /// invariant is enforced when a `Key` is fed to the encoder, not at
    /// construction, matching the façade's "check at the boundary" contract.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The key's raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub(crate) fn read(bytes: &[u8], offset: &mut usize, index: usize) -> Result<Self, Error> {
        let length = varint::read_u32(bytes, offset).map_err(|_| {
            Error::InvalidData(format!("key {index}: failed to read length"))
        })? as usize;
        let start = *offset;
        let end = start.checked_add(length).ok_or_else(|| {
            Error::InvalidData(format!("key {index}: length {length} overflows"))
        })?;
        let raw = bytes.get(start..end).ok_or_else(|| {
            Error::InvalidData(format!("key {index}: truncated name (wanted {length} bytes at {start})"))
        })?;
        *offset = end;
        trace!("key[{index}]: {length} bytes at {start}");
        Ok(Self(raw.to_vec()))
    }

    pub(crate) fn write(&self, buf: &mut Vec<u8>) {
        varint::write(buf, self.0.len() as u64);
        buf.extend_from_slice(&self.0);
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_wire_bytes() {
        let key = Key::from("someKey");
        let mut buf = Vec::new();
        key.write(&mut buf);
        let mut offset = 0;
        let decoded = Key::read(&buf, &mut offset, 0).unwrap();
        assert_eq!(decoded, key);
        assert_eq!(offset, buf.len());
    }

    #[test]
    fn non_utf8_bytes_are_preserved() {
        let raw = vec![0xff, 0x00, 0x80, b'x'];
        let key = Key::new(raw.clone());
        assert_eq!(key.as_bytes(), raw.as_slice());
    }
}
