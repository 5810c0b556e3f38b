//! Backing bytes of an open ROOT file.

use std::ops::Deref;

/// File contents, either memory-mapped from disk or owned in memory.
pub enum DataSource {
    /// In-memory bytes (`RootFile::from_bytes`, tests).
    Owned(Vec<u8>),
    /// Read-only memory map of a file on disk.
    Mapped(memmap2::Mmap),
}

impl Deref for DataSource {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        match self {
            DataSource::Owned(v) => v,
            DataSource::Mapped(m) => m,
        }
    }
}
