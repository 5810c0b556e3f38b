//! TKey records: the header ROOT writes in front of every stored object.

use crate::decompress::decompress;
use crate::error::{Result, RootError};
use crate::rbuffer::RBuffer;

/// A parsed TKey header.
#[derive(Debug, Clone)]
pub struct Key {
    /// Key header plus (possibly compressed) object bytes.
    pub n_bytes: u32,
    /// Key class version; above 1000 means 64-bit seeks.
    pub version: u16,
    /// Uncompressed object length.
    pub obj_len: u32,
    /// Length of this header.
    pub key_len: u16,
    /// Cycle number within the directory.
    pub cycle: u16,
    /// Absolute position of the key in the file.
    pub seek_key: u64,
    /// Class of the stored object (`TTree`, `TH1D`, `TDirectoryFile`, ...).
    pub class_name: String,
    /// Object name.
    pub name: String,
    /// Object title.
    pub title: String,
}

/// Name/class/cycle triple returned by `RootFile::list_keys`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    /// Object name.
    pub name: String,
    /// Object class.
    pub class_name: String,
    /// Cycle number.
    pub cycle: u16,
}

impl From<&Key> for KeyInfo {
    fn from(key: &Key) -> Self {
        Self { name: key.name.clone(), class_name: key.class_name.clone(), cycle: key.cycle }
    }
}

impl Key {
    /// Parse a key header at the reader's position.
    pub fn read(r: &mut RBuffer, file_is_large: bool) -> Result<Self> {
        let n_bytes = r.read_u32()?;
        let version = r.read_u16()?;
        let obj_len = r.read_u32()?;
        let _datime = r.read_u32()?;
        let key_len = r.read_u16()?;
        let cycle = r.read_u16()?;

        let large = file_is_large || version > 1000;
        let seek_key = r.read_seek(large)?;
        let _seek_pdir = r.read_seek(large)?;

        let class_name = r.read_string()?;
        let name = r.read_string()?;
        let title = r.read_string()?;

        Ok(Key { n_bytes, version, obj_len, key_len, cycle, seek_key, class_name, name, title })
    }

    /// Whether the stored object is compressed.
    pub fn is_compressed(&self) -> bool {
        self.obj_len != self.n_bytes.saturating_sub(u32::from(self.key_len))
    }

    /// Read the object bytes behind this key, inflating them when needed.
    pub fn payload(&self, file: &[u8]) -> Result<Vec<u8>> {
        let start = self.seek_key as usize;
        let end = start + self.n_bytes as usize;
        let record = file.get(start..end).ok_or(RootError::BufferUnderflow {
            offset: start,
            need: self.n_bytes as usize,
            have: file.len().saturating_sub(start),
        })?;
        let body = record.get(usize::from(self.key_len)..).ok_or_else(|| {
            RootError::Deserialization(format!(
                "key '{}' header length {} exceeds record size {}",
                self.name, self.key_len, self.n_bytes
            ))
        })?;

        if self.is_compressed() {
            decompress(body, self.obj_len as usize)
        } else {
            Ok(body.to_vec())
        }
    }
}
