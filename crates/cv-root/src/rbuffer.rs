//! Cursor over ROOT's big-endian streamer encoding.

use crate::error::{Result, RootError};

/// Bit set on the leading u32 of a streamed object when a byte count follows.
pub const K_BYTE_COUNT_MASK: u32 = 0x4000_0000;

/// A big-endian reader over a borrowed byte slice.
pub struct RBuffer<'a> {
    data: &'a [u8],
    pos: usize,
}

macro_rules! read_be {
    ($(#[$doc:meta] $name:ident -> $ty:ty),* $(,)?) => {
        $(
            #[$doc]
            pub fn $name(&mut self) -> Result<$ty> {
                const N: usize = std::mem::size_of::<$ty>();
                let bytes = self.read_bytes(N)?;
                let mut raw = [0u8; N];
                raw.copy_from_slice(bytes);
                Ok(<$ty>::from_be_bytes(raw))
            }
        )*
    };
}

impl<'a> RBuffer<'a> {
    /// Reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Reader positioned at `pos`.
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    /// Current absolute position.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Move the cursor to an absolute position.
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Advance the cursor by `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Borrow the next `n` bytes and advance.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    read_be! {
        /// Read one byte.
        read_u8 -> u8,
        /// Read a big-endian `u16`.
        read_u16 -> u16,
        /// Read a big-endian `u32`.
        read_u32 -> u32,
        /// Read a big-endian `i32`.
        read_i32 -> i32,
        /// Read a big-endian `u64`.
        read_u64 -> u64,
        /// Read a big-endian `i64`.
        read_i64 -> i64,
        /// Read a big-endian `f64`.
        read_f64 -> f64,
    }

    /// Read a seek pointer: 64-bit when `large`, 32-bit otherwise.
    pub fn read_seek(&mut self, large: bool) -> Result<u64> {
        if large { self.read_u64() } else { self.read_u32().map(u64::from) }
    }

    /// Read a ROOT string: one length byte, or `255` followed by a `u32` length.
    pub fn read_string(&mut self) -> Result<String> {
        let len = match self.read_u8()? {
            255 => self.read_u32()? as usize,
            n => n as usize,
        };
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read a NUL-terminated C string (class names in object arrays).
    pub fn read_cstring(&mut self) -> Result<String> {
        let rest = &self.data[self.pos.min(self.data.len())..];
        let nul = rest.iter().position(|&b| b == 0).ok_or(RootError::BufferUnderflow {
            offset: self.pos,
            need: rest.len() + 1,
            have: rest.len(),
        })?;
        let s = String::from_utf8_lossy(&rest[..nul]).into_owned();
        self.pos += nul + 1;
        Ok(s)
    }

    /// Read a streamer version header.
    ///
    /// Returns the class version and, when the byte-count bit is set, the
    /// absolute position where the object ends.
    pub fn read_version(&mut self) -> Result<(u16, Option<usize>)> {
        let start = self.pos;
        let head = self.read_u32()?;
        if head & K_BYTE_COUNT_MASK == 0 {
            // No byte count: the first two bytes were the version.
            self.pos = start + 2;
            return Ok(((head >> 16) as u16, None));
        }
        let count = (head & !K_BYTE_COUNT_MASK) as usize;
        let version = self.read_u16()?;
        Ok((version, Some(start + 4 + count)))
    }

    /// Skip a versioned object using its byte count.
    pub fn skip_versioned(&mut self) -> Result<()> {
        if let (_, Some(end)) = self.read_version()? {
            self.pos = end;
        }
        Ok(())
    }

    /// Read a `TObject` header, returning `fBits`.
    pub fn read_tobject(&mut self) -> Result<u32> {
        let _version = self.read_u16()?;
        let _unique_id = self.read_u32()?;
        let bits = self.read_u32()?;
        if bits & 0x0800_0000 != 0 {
            // kIsReferenced: a 2-byte process id follows.
            self.skip(2)?;
        }
        Ok(bits)
    }

    /// Read a `TNamed` (versioned `TObject` + name + title).
    pub fn read_tnamed(&mut self) -> Result<(String, String)> {
        self.read_version()?;
        self.read_tobject()?;
        let name = self.read_string()?;
        let title = self.read_string()?;
        Ok((name, title))
    }

    fn ensure(&self, n: usize) -> Result<()> {
        let have = self.remaining();
        if n > have {
            return Err(RootError::BufferUnderflow { offset: self.pos, need: n, have });
        }
        Ok(())
    }
}
