//! TFile header parsing and the top-level file interface.

use std::fs;
use std::path::{Path, PathBuf};

use crate::branch_reader::{BranchReader, parse_indexed_branch_name};
use crate::datasource::DataSource;
use crate::directory::{Directory, DirectoryHeader};
use crate::error::{Result, RootError};
use crate::key::KeyInfo;
use crate::objects;
use crate::rbuffer::RBuffer;
use crate::tree::Tree;

const ROOT_MAGIC: &[u8; 4] = b"root";

/// Fields of the file header that locate the top directory.
#[derive(Debug, Clone, Copy)]
struct FileHeader {
    /// 64-bit seek pointers (`fVersion >= 1000000`).
    is_large: bool,
    /// Position of the top directory's key list.
    seek_keys: u64,
}

/// A ROOT file opened for reading trees.
pub struct RootFile {
    data: DataSource,
    header: FileHeader,
    path: PathBuf,
}

impl RootFile {
    /// Open a file from disk using a read-only memory map.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = fs::File::open(&path)?;
        // SAFETY: the map is read-only; a file truncated underneath us is
        // outside what this reader supports.
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        let out = Self::from_datasource(DataSource::Mapped(mmap), path)?;
        tracing::debug!(path = %out.path.display(), bytes = out.data.len(), "opened ROOT file");
        Ok(out)
    }

    /// Parse a file held in memory.
    pub fn from_bytes(data: Vec<u8>, path: impl Into<PathBuf>) -> Result<Self> {
        Self::from_datasource(DataSource::Owned(data), path.into())
    }

    fn from_datasource(data: DataSource, path: PathBuf) -> Result<Self> {
        if data.len() < 64 || &data[0..4] != ROOT_MAGIC {
            return Err(RootError::BadMagic);
        }
        let header = parse_header(&data)?;
        Ok(Self { data, header, path })
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file uses 64-bit seek pointers.
    pub fn is_large(&self) -> bool {
        self.header.is_large
    }

    /// Keys of the top-level directory, in file order.
    pub fn list_keys(&self) -> Result<Vec<KeyInfo>> {
        let dir = self.top_directory()?;
        Ok(dir.keys().iter().map(KeyInfo::from).collect())
    }

    /// Read the tree stored under `name` in the top directory.
    pub fn get_tree(&self, name: &str) -> Result<Tree> {
        let dir = self.top_directory()?;
        let key = dir.find_key(name).ok_or_else(|| RootError::TreeNotFound(name.to_string()))?;
        if key.class_name != "TTree" {
            return Err(RootError::TreeNotFound(format!(
                "'{name}' is {} not TTree",
                key.class_name
            )));
        }
        let payload = key.payload(&self.data)?;
        objects::read_ttree(&payload, usize::from(key.key_len))
    }

    /// All entries of a branch as `f64`.
    ///
    /// `name[i]` selects element `i` of a fixed-length array branch.
    pub fn branch_data(&self, tree: &Tree, branch: &str) -> Result<Vec<f64>> {
        if let Some(info) = tree.find_branch(branch) {
            let reader = BranchReader::new(&self.data, info, self.header.is_large);
            return if info.leaf_len == 1 {
                reader.as_f64()
            } else {
                Err(RootError::TypeMismatch(format!(
                    "branch '{branch}' holds {} values per entry; index it as {branch}[i]",
                    info.leaf_len
                )))
            };
        }
        if let Some((base, index)) = parse_indexed_branch_name(branch)
            && let Some(info) = tree.find_branch(base)
        {
            return BranchReader::new(&self.data, info, self.header.is_large)
                .as_f64_indexed(index);
        }
        Err(RootError::BranchNotFound(branch.to_string()))
    }

    fn top_directory(&self) -> Result<Directory> {
        Directory::read_key_list(&self.data, self.header.seek_keys, self.header.is_large)
    }
}

/// Parse the file header and the top `TDirectory` at `fBEGIN + fNbytesName`.
///
/// ```text
/// offset  size  field
///    0      4   magic "root"
///    4      4   fVersion
///    8      4   fBEGIN
///   12    4|8   fEND
///         4|8   fSeekFree
///           4   fNbytesFree
///           4   nfree
///           4   fNbytesName
/// ```
fn parse_header(data: &[u8]) -> Result<FileHeader> {
    let mut r = RBuffer::new(data);
    r.skip(4)?;
    let version = r.read_u32()?;
    let is_large = version >= 1_000_000;
    let begin = r.read_u32()? as usize;
    let _end = r.read_seek(is_large)?;
    let _seek_free = r.read_seek(is_large)?;
    let _nbytes_free = r.read_u32()?;
    let _nfree = r.read_u32()?;
    let nbytes_name = r.read_u32()? as usize;

    let dir_offset = begin + nbytes_name;
    if dir_offset >= data.len() {
        return Err(RootError::Deserialization("TDirectory offset past end of file".into()));
    }
    let dir = DirectoryHeader::read(&mut RBuffer::at(data, dir_offset))?;
    tracing::trace!(version, is_large, seek_keys = dir.seek_keys, "parsed file header");
    Ok(FileHeader { is_large, seek_keys: dir.seek_keys })
}
