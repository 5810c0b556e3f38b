//! Column extraction from TTree branches.

use crate::basket::Basket;
use crate::error::{Result, RootError};
use crate::tree::{BranchInfo, LeafType};

/// Reads every basket of one branch and decodes it to `f64`.
pub struct BranchReader<'a> {
    file: &'a [u8],
    branch: &'a BranchInfo,
    is_large: bool,
}

impl<'a> BranchReader<'a> {
    /// Reader over `branch` in `file`.
    pub fn new(file: &'a [u8], branch: &'a BranchInfo, is_large: bool) -> Self {
        Self { file, branch, is_large }
    }

    /// All values in entry order; `entries * leaf_len` of them.
    pub fn as_f64(&self) -> Result<Vec<f64>> {
        let expected = self.branch.entries as usize * self.branch.leaf_len;
        let mut out = Vec::with_capacity(expected);
        for i in 0..self.branch.n_baskets() {
            let seek = self.branch.basket_seek[i];
            let basket = Basket::read(self.file, seek, self.is_large)?;
            let data = basket.data(self.file)?;
            decode_into(&data, self.branch.leaf_type, &mut out);
        }
        tracing::trace!(branch = %self.branch.name, values = out.len(), "decoded branch");

        if out.len() != expected {
            return Err(RootError::TypeMismatch(format!(
                "branch '{}' decoded {} values as {:?}, expected {} ({} entries x {})",
                self.branch.name,
                out.len(),
                self.branch.leaf_type,
                expected,
                self.branch.entries,
                self.branch.leaf_len
            )));
        }
        Ok(out)
    }

    /// Element `index` of a fixed-length array branch, one value per entry.
    pub fn as_f64_indexed(&self, index: usize) -> Result<Vec<f64>> {
        let len = self.branch.leaf_len;
        if index >= len {
            return Err(RootError::BranchNotFound(format!(
                "{}[{index}] (array length is {len})",
                self.branch.name
            )));
        }
        let flat = self.as_f64()?;
        Ok(flat.chunks_exact(len).map(|row| row[index]).collect())
    }
}

/// Append big-endian values of `leaf_type` to `out`. A trailing partial
/// element is ignored; the caller checks the total count.
fn decode_into(data: &[u8], leaf_type: LeafType, out: &mut Vec<f64>) {
    macro_rules! be {
        ($ty:ty) => {
            out.extend(data.chunks_exact(std::mem::size_of::<$ty>()).map(|c| {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(c);
                <$ty>::from_be_bytes(raw) as f64
            }))
        };
    }
    match leaf_type {
        LeafType::Bool => out.extend(data.iter().map(|&b| if b != 0 { 1.0 } else { 0.0 })),
        LeafType::I8 => out.extend(data.iter().map(|&b| b as i8 as f64)),
        LeafType::U8 => out.extend(data.iter().map(|&b| b as f64)),
        LeafType::I16 => be!(i16),
        LeafType::U16 => be!(u16),
        LeafType::I32 => be!(i32),
        LeafType::U32 => be!(u32),
        LeafType::I64 => be!(i64),
        LeafType::U64 => be!(u64),
        LeafType::F32 => be!(f32),
        LeafType::F64 => be!(f64),
    }
}

/// Split `name[3]` into `("name", 3)`.
pub(crate) fn parse_indexed_branch_name(s: &str) -> Option<(&str, usize)> {
    let inner = s.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let (base, idx) = inner.split_at(open);
    if base.is_empty() {
        return None;
    }
    let idx = idx[1..].parse().ok()?;
    Some((base, idx))
}
