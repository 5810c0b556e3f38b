//! TTree / TBranch / TLeaf streamers.

use crate::error::{Result, RootError};
use crate::rbuffer::{K_BYTE_COUNT_MASK, RBuffer};
use crate::tree::{BranchInfo, LeafType, Tree};

const K_NEW_CLASS_TAG: u32 = 0xFFFF_FFFF;
const K_CLASS_MASK: u32 = 0x8000_0000;
/// Offset ROOT adds to buffer positions when recording class references.
const K_MAP_OFFSET: usize = 2;

/// Class names seen so far in one object buffer, keyed by the reference
/// offset ROOT will use to point back at them.
///
/// The map is shared by every `TObjArray` in the buffer: a `TLeafF` first
/// streamed under one branch is referenced by position from the next.
struct ClassRefs {
    /// Position of payload byte 0 relative to the start of the key record.
    displacement: usize,
    seen: Vec<(usize, String)>,
}

impl ClassRefs {
    fn new(key_len: usize) -> Self {
        Self { displacement: key_len, seen: Vec::new() }
    }

    /// Read one array slot. `None` for a null slot, else the element's class
    /// and the absolute end position of its byte-counted body.
    fn read_slot(&mut self, r: &mut RBuffer) -> Result<Option<(String, usize)>> {
        let head_pos = r.pos();
        let head = r.read_u32()?;
        if head == 0 {
            return Ok(None);
        }
        if head & K_BYTE_COUNT_MASK == 0 {
            return Err(RootError::Deserialization(format!(
                "object array slot at {head_pos} has no byte count (tag {head:#010x})"
            )));
        }
        let end = head_pos + 4 + (head & !K_BYTE_COUNT_MASK) as usize;

        let tag_pos = r.pos();
        let tag = r.read_u32()?;
        let class_name = if tag == K_NEW_CLASS_TAG {
            let name = r.read_cstring()?;
            self.seen.push((tag_pos + self.displacement + K_MAP_OFFSET, name.clone()));
            name
        } else if tag & K_CLASS_MASK != 0 {
            let offset = (tag & !K_CLASS_MASK) as usize;
            self.seen
                .iter()
                .find(|(at, _)| *at == offset)
                .map(|(_, name)| name.clone())
                .ok_or_else(|| {
                    RootError::Deserialization(format!(
                        "class reference {offset} at {tag_pos} does not match any streamed class"
                    ))
                })?
        } else {
            return Err(RootError::Deserialization(format!(
                "unexpected class tag {tag:#010x} at {tag_pos}"
            )));
        };
        Ok(Some((class_name, end)))
    }
}

/// Parse a TTree from its key payload. `key_len` is the length of the key
/// header the payload was stored behind.
pub fn read_ttree(payload: &[u8], key_len: usize) -> Result<Tree> {
    let mut r = RBuffer::new(payload);
    let mut refs = ClassRefs::new(key_len);

    let (version, end) = r.read_version()?;
    let end = end.ok_or_else(|| RootError::Deserialization("TTree without byte count".into()))?;
    if version < 16 {
        return Err(RootError::Deserialization(format!(
            "TTree class version {version} is older than supported (16)"
        )));
    }

    let (name, title) = r.read_tnamed()?;
    // TAttLine, TAttFill, TAttMarker
    for _ in 0..3 {
        r.skip_versioned()?;
    }

    let entries = r.read_i64()?.max(0) as u64;
    let _tot_bytes = r.read_i64()?;
    let _zip_bytes = r.read_i64()?;
    let _saved_bytes = r.read_i64()?;
    if version >= 18 {
        let _flushed_bytes = r.read_i64()?;
    }
    let _weight = r.read_f64()?;
    let _timer_interval = r.read_i32()?;
    let _scan_field = r.read_i32()?;
    let _update = r.read_i32()?;
    if version >= 18 {
        let _default_entry_offset_len = r.read_i32()?;
    }
    let n_cluster_range = if version >= 19 { r.read_i32()?.max(0) as usize } else { 0 };
    let _max_entries = r.read_i64()?;
    let _max_entry_loop = r.read_i64()?;
    let _max_virtual_size = r.read_i64()?;
    let _auto_save = r.read_i64()?;
    if version >= 18 {
        let _auto_flush = r.read_i64()?;
    }
    let _estimate = r.read_i64()?;

    if version >= 19 {
        // fClusterRangeEnd, fClusterSize: array flag byte + i64[n]
        for _ in 0..2 {
            r.read_u8()?;
            r.skip(8 * n_cluster_range)?;
        }
    }
    if version >= 20 {
        // fIOFeatures
        r.skip_versioned()?;
    }

    let branches = read_branch_array(&mut r, &mut refs)?;
    r.set_pos(end);

    tracing::debug!(tree = %name, entries, n_branches = branches.len(), "parsed TTree");
    Ok(Tree { name, title, entries, branches })
}

/// Read the header of a `TObjArray` and return `(element count, end)`.
fn read_array_header(r: &mut RBuffer, what: &str) -> Result<(usize, usize)> {
    let (_version, end) = r.read_version()?;
    let end =
        end.ok_or_else(|| RootError::Deserialization(format!("{what} array without byte count")))?;
    r.read_tobject()?;
    let _name = r.read_string()?;
    let count = r.read_i32()?.max(0) as usize;
    let _low_bound = r.read_i32()?;
    Ok((count, end))
}

fn read_branch_array(r: &mut RBuffer, refs: &mut ClassRefs) -> Result<Vec<BranchInfo>> {
    let (count, end) = read_array_header(r, "branch")?;
    let mut branches = Vec::with_capacity(count);

    for _ in 0..count {
        let Some((class_name, slot_end)) = refs.read_slot(r)? else {
            continue;
        };
        let parsed = match class_name.as_str() {
            "TBranch" => read_tbranch(r, refs),
            "TBranchElement" | "TBranchObject" => {
                // Derived streamers wrap the TBranch base in their own version header.
                r.read_version().and_then(|_| read_tbranch(r, refs))
            }
            other => Err(RootError::Deserialization(format!("unsupported branch class {other}"))),
        };
        match parsed {
            Ok(Some(branch)) => branches.push(branch),
            Ok(None) => {}
            Err(e) => tracing::debug!(class = %class_name, error = %e, "skipping branch"),
        }
        r.set_pos(slot_end);
    }

    r.set_pos(end);
    Ok(branches)
}

/// Parse a TBranch body. Returns `None` when the branch has no numeric leaf.
fn read_tbranch(r: &mut RBuffer, refs: &mut ClassRefs) -> Result<Option<BranchInfo>> {
    let (version, end) = r.read_version()?;
    let (name, _title) = r.read_tnamed()?;
    r.skip_versioned()?; // TAttFill

    let _compress = r.read_i32()?;
    let _basket_size = r.read_i32()?;
    let entry_offset_len = r.read_i32()?;
    let write_basket = r.read_i32()?.max(0) as usize;
    let _entry_number = r.read_i64()?;
    if version >= 13 {
        r.skip_versioned()?; // fIOFeatures
    }
    let _offset = r.read_i32()?;
    let max_baskets = r.read_i32()?.max(0) as usize;
    let _split_level = r.read_i32()?;
    let entries = r.read_i64()?.max(0) as u64;
    if version >= 11 {
        let _first_entry = r.read_i64()?;
    }
    let _tot_bytes = r.read_i64()?;
    let _zip_bytes = r.read_i64()?;

    // Sub-branches are not followed; flat ntuples keep leaves at top level.
    let (_, sub_end) = r.read_version()?;
    if let Some(sub_end) = sub_end {
        r.set_pos(sub_end);
    }

    let leaf = read_leaf_array(r, refs)?;

    r.skip_versioned()?; // fBaskets

    // fBasketBytes (i32), fBasketEntry (i64), fBasketSeek (i64); each array is
    // preceded by a one-byte flag and holds fMaxBaskets slots.
    r.read_u8()?;
    r.skip(4 * max_baskets)?;

    r.read_u8()?;
    let mut basket_entry = Vec::with_capacity(write_basket + 1);
    for i in 0..max_baskets {
        let v = r.read_i64()?.max(0) as u64;
        if i <= write_basket {
            basket_entry.push(v);
        }
    }

    r.read_u8()?;
    let mut basket_seek = Vec::with_capacity(write_basket);
    for i in 0..max_baskets {
        let v = r.read_i64()?.max(0) as u64;
        if i < write_basket {
            basket_seek.push(v);
        }
    }

    if let Some(end) = end {
        r.set_pos(end);
    }

    let Some((leaf_type, leaf_len)) = leaf else {
        tracing::debug!(branch = %name, "branch has no numeric leaf");
        return Ok(None);
    };
    Ok(Some(BranchInfo {
        name,
        leaf_type,
        leaf_len,
        entries,
        entry_offset_len,
        basket_entry,
        basket_seek,
    }))
}

/// Read `fLeaves` and return the type and length of the first numeric leaf.
fn read_leaf_array(r: &mut RBuffer, refs: &mut ClassRefs) -> Result<Option<(LeafType, usize)>> {
    let (count, end) = read_array_header(r, "leaf")?;
    let mut first = None;

    for _ in 0..count {
        let Some((class_name, slot_end)) = refs.read_slot(r)? else {
            continue;
        };
        if first.is_none() {
            let (len, unsigned) = read_tleaf_base(r)?;
            first = LeafType::from_class(&class_name, unsigned).map(|t| (t, len.max(1)));
        }
        r.set_pos(slot_end);
    }

    r.set_pos(end);
    Ok(first)
}

/// Read the `TLeaf` base of a concrete leaf: returns `(fLen, fIsUnsigned)`.
fn read_tleaf_base(r: &mut RBuffer) -> Result<(usize, bool)> {
    r.read_version()?; // TLeafX
    r.read_version()?; // TLeaf
    r.read_tnamed()?;
    let len = r.read_i32()?.max(0) as usize;
    let _len_type = r.read_i32()?;
    let _offset = r.read_i32()?;
    let _is_range = r.read_u8()?;
    let unsigned = r.read_u8()? != 0;
    Ok((len, unsigned))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counted(body: &[u8]) -> Vec<u8> {
        let mut out = (K_BYTE_COUNT_MASK | body.len() as u32).to_be_bytes().to_vec();
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn class_refs_resolve_back_references() {
        // slot 1 introduces TLeafF, slot 2 points back at it
        let key_len = 60;
        let mut buf = Vec::new();
        let mut first = Vec::new();
        first.extend_from_slice(&K_NEW_CLASS_TAG.to_be_bytes());
        first.extend_from_slice(b"TLeafF\0");
        buf.extend(counted(&first));
        let tag_pos = 4;

        let back = (K_CLASS_MASK | (tag_pos + key_len + K_MAP_OFFSET) as u32).to_be_bytes();
        buf.extend(counted(&back));

        let mut refs = ClassRefs::new(key_len);
        let mut r = RBuffer::new(&buf);
        let (a, a_end) = refs.read_slot(&mut r).unwrap().unwrap();
        r.set_pos(a_end);
        let (b, b_end) = refs.read_slot(&mut r).unwrap().unwrap();
        assert_eq!(a, "TLeafF");
        assert_eq!(b, "TLeafF");
        assert_eq!(b_end, buf.len());
    }

    #[test]
    fn null_slot_and_dangling_reference() {
        let mut buf = 0u32.to_be_bytes().to_vec();
        buf.extend(counted(&(K_CLASS_MASK | 1234).to_be_bytes()));
        let mut refs = ClassRefs::new(0);
        let mut r = RBuffer::new(&buf);
        assert!(refs.read_slot(&mut r).unwrap().is_none());
        assert!(refs.read_slot(&mut r).is_err());
    }

    #[test]
    fn old_tree_versions_are_rejected() {
        let mut body = 5u16.to_be_bytes().to_vec();
        body.extend_from_slice(&[0u8; 16]);
        let payload = counted(&body);
        let err = read_ttree(&payload, 0).unwrap_err();
        assert!(err.to_string().contains("older than supported"));
    }
}
