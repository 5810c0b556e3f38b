//! TDirectory key lists.

use crate::error::Result;
use crate::key::Key;
use crate::rbuffer::RBuffer;

/// The keys of one directory, in file order.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    keys: Vec<Key>,
}

/// Location fields of a streamed `TDirectory`.
#[derive(Debug, Clone, Copy)]
pub struct DirectoryHeader {
    /// Size of the key list record.
    pub nbytes_keys: u32,
    /// Position of the key list record (0 when empty).
    pub seek_keys: u64,
}

impl DirectoryHeader {
    /// Parse a `TDirectory` streamer at the reader's position.
    pub fn read(r: &mut RBuffer) -> Result<Self> {
        let version = r.read_u16()?;
        let _datime_c = r.read_u32()?;
        let _datime_m = r.read_u32()?;
        let nbytes_keys = r.read_u32()?;
        let _nbytes_name = r.read_u32()?;

        let large = version > 1000;
        let _seek_dir = r.read_seek(large)?;
        let _seek_parent = r.read_seek(large)?;
        let seek_keys = r.read_seek(large)?;
        Ok(Self { nbytes_keys, seek_keys })
    }
}

impl Directory {
    /// Read the key list stored at `seek_keys`.
    ///
    /// The list is itself wrapped in a TKey header, followed by a `u32` count
    /// and that many key headers.
    pub fn read_key_list(file: &[u8], seek_keys: u64, file_is_large: bool) -> Result<Self> {
        if seek_keys == 0 {
            return Ok(Self::default());
        }
        let mut r = RBuffer::at(file, seek_keys as usize);
        let _list_key = Key::read(&mut r, file_is_large)?;
        let n_keys = r.read_u32()? as usize;

        let mut keys = Vec::with_capacity(n_keys.min(4096));
        for _ in 0..n_keys {
            keys.push(Key::read(&mut r, file_is_large)?);
        }
        Ok(Self { keys })
    }

    /// All keys.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Key with this name and the highest cycle.
    pub fn find_key(&self, name: &str) -> Option<&Key> {
        self.keys.iter().filter(|k| k.name == name).max_by_key(|k| k.cycle)
    }
}
