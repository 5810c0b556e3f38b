//! Writes small ROOT files holding one flat TTree, laid out the way ROOT 6
//! writes 32-bit-seek files: file header, top directory, one TBasket key per
//! basket, the TTree key (TTree v20, TBranch v13, TLeaf v2 streamers with
//! class back-references) and the directory's key list.
//!
//! Shared by the integration tests of several crates through `#[path]`.

#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

const K_BYTE_COUNT_MASK: u32 = 0x4000_0000;
const K_NEW_CLASS_TAG: u32 = 0xFFFF_FFFF;
const K_CLASS_MASK: u32 = 0x8000_0000;
const K_MAP_OFFSET: usize = 2;

const FILE_VERSION: u32 = 62_806;
const BEGIN: usize = 100;
const OBJECT_BITS: u32 = 0x0300_0000;
const FILE_NAME: &str = "cvvar.root";
/// TBasket fields stored after the plain key header.
const BASKET_EXTRA_LEN: usize = 2 + 4 + 4 + 4 + 4 + 1;
/// TDirectory v5 record plus its UUID.
const DIRECTORY_LEN: usize = 2 + 4 * 7 + 2 + 16;

/// Element type of a branch leaf.
#[derive(Debug, Clone, Copy)]
pub enum Leaf {
    F64,
    F32,
    I32,
}

impl Leaf {
    fn class(self) -> &'static str {
        match self {
            Leaf::F64 => "TLeafD",
            Leaf::F32 => "TLeafF",
            Leaf::I32 => "TLeafI",
        }
    }

    fn code(self) -> char {
        match self {
            Leaf::F64 => 'D',
            Leaf::F32 => 'F',
            Leaf::I32 => 'I',
        }
    }

    fn size(self) -> usize {
        match self {
            Leaf::F64 => 8,
            Leaf::F32 | Leaf::I32 => 4,
        }
    }

    fn put(self, out: &mut Vec<u8>, v: f64) {
        match self {
            Leaf::F64 => out.extend_from_slice(&v.to_be_bytes()),
            Leaf::F32 => out.extend_from_slice(&(v as f32).to_be_bytes()),
            Leaf::I32 => out.extend_from_slice(&(v as i32).to_be_bytes()),
        }
    }
}

/// One branch with a single leaf of `len` elements per entry.
#[derive(Debug, Clone)]
pub struct Branch {
    pub name: String,
    pub leaf: Leaf,
    pub len: usize,
    /// Flattened values, `len` per entry.
    pub values: Vec<f64>,
}

impl Branch {
    pub fn scalar(name: &str, leaf: Leaf, values: Vec<f64>) -> Self {
        Self { name: name.to_string(), leaf, len: 1, values }
    }

    pub fn array(name: &str, leaf: Leaf, len: usize, values: Vec<f64>) -> Self {
        assert_eq!(values.len() % len, 0, "values must fill whole entries");
        Self { name: name.to_string(), leaf, len, values }
    }

    fn entries(&self) -> usize {
        self.values.len() / self.len
    }

    fn leaf_title(&self) -> String {
        if self.len == 1 { self.name.clone() } else { format!("{}[{}]", self.name, self.len) }
    }
}

/// A file with one tree in its top directory.
#[derive(Debug, Clone)]
pub struct TreeFile {
    pub tree: String,
    pub title: String,
    pub branches: Vec<Branch>,
    pub basket_entries: usize,
    pub compress: bool,
}

struct BasketLayout {
    bytes: Vec<i32>,
    first_entry: Vec<i64>,
    seek: Vec<i64>,
    tot_bytes: i64,
    zip_bytes: i64,
}

impl TreeFile {
    pub fn new(tree: &str) -> Self {
        Self {
            tree: tree.to_string(),
            title: format!("{tree} events"),
            branches: Vec::new(),
            basket_entries: 64,
            compress: true,
        }
    }

    pub fn branch(mut self, branch: Branch) -> Self {
        self.branches.push(branch);
        self
    }

    pub fn basket_entries(mut self, n: usize) -> Self {
        self.basket_entries = n.max(1);
        self
    }

    pub fn compress(mut self, on: bool) -> Self {
        self.compress = on;
        self
    }

    pub fn entries(&self) -> usize {
        self.branches.first().map_or(0, Branch::entries)
    }

    pub fn write(&self, path: &Path) {
        std::fs::write(path, self.to_bytes()).unwrap();
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let dir_key_len = key_len("TFile", FILE_NAME, "", 0);
        let nbytes_name = dir_key_len + string_len(FILE_NAME) + string_len("");
        let mut out = vec![0u8; BEGIN + nbytes_name + DIRECTORY_LEN];

        let layouts: Vec<BasketLayout> =
            self.branches.iter().map(|b| self.write_baskets(&mut out, b)).collect();

        let tree_seek = out.len();
        let tree_key_len = key_len("TTree", &self.tree, &self.title, 0);
        let mut obj = Obj::new(tree_key_len);
        self.stream_tree(&mut obj, &layouts);
        let (stored, obj_len) = self.store(obj.buf);
        let tree_key = key_header(
            "TTree",
            &self.tree,
            &self.title,
            tree_key_len + stored.len(),
            obj_len,
            tree_seek,
            &[],
        );
        out.extend_from_slice(&tree_key);
        out.extend(stored);

        let keys_seek = out.len();
        let list_key_len = key_len("TFile", FILE_NAME, "", 0);
        let nbytes_keys = list_key_len + 4 + tree_key.len();
        out.extend(key_header(
            "TFile",
            FILE_NAME,
            "",
            nbytes_keys,
            nbytes_keys - list_key_len,
            keys_seek,
            &[],
        ));
        out.extend_from_slice(&1i32.to_be_bytes());
        out.extend_from_slice(&tree_key);
        let end = out.len();

        let mut head = Vec::new();
        head.extend_from_slice(b"root");
        head.extend_from_slice(&FILE_VERSION.to_be_bytes());
        head.extend_from_slice(&(BEGIN as u32).to_be_bytes());
        head.extend_from_slice(&(end as u32).to_be_bytes());
        head.extend_from_slice(&0u32.to_be_bytes()); // fSeekFree
        head.extend_from_slice(&0u32.to_be_bytes()); // fNbytesFree
        head.extend_from_slice(&0u32.to_be_bytes()); // nfree
        head.extend_from_slice(&(nbytes_name as u32).to_be_bytes());
        head.push(4); // fUnits
        head.extend_from_slice(&(if self.compress { 101u32 } else { 0 }).to_be_bytes());
        head.extend_from_slice(&0u32.to_be_bytes()); // fSeekInfo
        head.extend_from_slice(&0u32.to_be_bytes()); // fNbytesInfo
        head.extend_from_slice(&1u16.to_be_bytes());
        head.extend_from_slice(&[0u8; 16]);
        out[..head.len()].copy_from_slice(&head);

        let dir_bytes = nbytes_name + DIRECTORY_LEN;
        let mut dir =
            key_header("TFile", FILE_NAME, "", dir_bytes, dir_bytes - dir_key_len, BEGIN, &[]);
        put_string(&mut dir, FILE_NAME);
        put_string(&mut dir, "");
        dir.extend_from_slice(&5u16.to_be_bytes());
        dir.extend_from_slice(&0u32.to_be_bytes()); // fDatimeC
        dir.extend_from_slice(&0u32.to_be_bytes()); // fDatimeM
        dir.extend_from_slice(&(nbytes_keys as u32).to_be_bytes());
        dir.extend_from_slice(&(nbytes_name as u32).to_be_bytes());
        dir.extend_from_slice(&(BEGIN as u32).to_be_bytes()); // fSeekDir
        dir.extend_from_slice(&0u32.to_be_bytes()); // fSeekParent
        dir.extend_from_slice(&(keys_seek as u32).to_be_bytes());
        dir.extend_from_slice(&1u16.to_be_bytes());
        dir.extend_from_slice(&[0u8; 16]);
        assert_eq!(dir.len(), dir_bytes);
        out[BEGIN..BEGIN + dir_bytes].copy_from_slice(&dir);
        out
    }

    /// zlib-compress into one `ZL` block when it pays off, as ROOT does.
    fn store(&self, raw: Vec<u8>) -> (Vec<u8>, usize) {
        let obj_len = raw.len();
        if !self.compress || raw.len() > 0xFF_FFFF {
            return (raw, obj_len);
        }
        let mut enc = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(&raw).unwrap();
        let body = enc.finish().unwrap();
        if body.len() + 9 >= raw.len() {
            return (raw, obj_len);
        }
        let mut block = b"ZL".to_vec();
        block.push(8);
        block.extend_from_slice(&(body.len() as u32).to_le_bytes()[..3]);
        block.extend_from_slice(&(raw.len() as u32).to_le_bytes()[..3]);
        block.extend(body);
        (block, obj_len)
    }

    fn write_baskets(&self, out: &mut Vec<u8>, branch: &Branch) -> BasketLayout {
        let n = branch.entries();
        let mut layout = BasketLayout {
            bytes: Vec::new(),
            first_entry: Vec::new(),
            seek: Vec::new(),
            tot_bytes: 0,
            zip_bytes: 0,
        };
        let klen = key_len("TBasket", &branch.name, &self.tree, BASKET_EXTRA_LEN);
        let mut start = 0;
        while start < n {
            let stop = (start + self.basket_entries).min(n);
            let mut raw = Vec::new();
            for &v in &branch.values[start * branch.len..stop * branch.len] {
                branch.leaf.put(&mut raw, v);
            }
            let (stored, obj_len) = self.store(raw);
            let n_bytes = klen + stored.len();

            let mut extra = Vec::with_capacity(BASKET_EXTRA_LEN);
            extra.extend_from_slice(&3u16.to_be_bytes());
            extra.extend_from_slice(&32_000i32.to_be_bytes()); // fBufferSize
            extra.extend_from_slice(&((branch.len * branch.leaf.size()) as i32).to_be_bytes());
            extra.extend_from_slice(&((stop - start) as i32).to_be_bytes()); // fNevBuf
            extra.extend_from_slice(&((klen + obj_len) as i32).to_be_bytes()); // fLast
            extra.push(0);

            let seek = out.len();
            out.extend(key_header(
                "TBasket",
                &branch.name,
                &self.tree,
                n_bytes,
                obj_len,
                seek,
                &extra,
            ));
            out.extend(stored);

            layout.bytes.push(n_bytes as i32);
            layout.first_entry.push(start as i64);
            layout.seek.push(seek as i64);
            layout.tot_bytes += (klen + obj_len) as i64;
            layout.zip_bytes += n_bytes as i64;
            start = stop;
        }
        layout.first_entry.push(n as i64);
        layout
    }

    fn stream_tree(&self, o: &mut Obj, layouts: &[BasketLayout]) {
        let entries = self.entries() as i64;
        let tot: i64 = layouts.iter().map(|l| l.tot_bytes).sum();
        let zip: i64 = layouts.iter().map(|l| l.zip_bytes).sum();

        let tree = o.open(20);
        o.tnamed(&self.tree, &self.title);
        let a = o.open(2); // TAttLine
        o.i16(602);
        o.i16(1);
        o.i16(1);
        o.close(a);
        let a = o.open(2); // TAttFill
        o.i16(0);
        o.i16(1001);
        o.close(a);
        let a = o.open(2); // TAttMarker
        o.i16(1);
        o.i16(1);
        o.f32(1.0);
        o.close(a);

        o.i64(entries);
        o.i64(tot);
        o.i64(zip);
        o.i64(tot); // fSavedBytes
        o.i64(0); // fFlushedBytes
        o.f64(1.0); // fWeight
        o.i32(0); // fTimerInterval
        o.i32(25); // fScanField
        o.i32(0); // fUpdate
        o.i32(1000); // fDefaultEntryOffsetLen
        o.i32(0); // fNClusterRange
        o.i64(1_000_000_000_000); // fMaxEntries
        o.i64(1_000_000_000_000); // fMaxEntryLoop
        o.i64(0); // fMaxVirtualSize
        o.i64(-300_000_000); // fAutoSave
        o.i64(-30_000_000); // fAutoFlush
        o.i64(1_000_000); // fEstimate
        o.u8(0); // fClusterRangeEnd
        o.u8(0); // fClusterSize
        o.io_features();

        let arr = o.array_header(self.branches.len());
        for (branch, layout) in self.branches.iter().zip(layouts) {
            let slot = o.slot("TBranch");
            self.stream_branch(o, branch, layout);
            o.close(slot);
        }
        o.close(arr);

        o.empty_array(); // fLeaves
        o.u32(0); // fAliases
        o.i32(0); // fIndexValues
        o.i32(0); // fIndex
        for _ in 0..4 {
            o.u32(0); // fTreeIndex, fFriends, fUserInfo, fBranchRef
        }
        o.close(tree);
    }

    fn stream_branch(&self, o: &mut Obj, branch: &Branch, layout: &BasketLayout) {
        let entries = branch.entries() as i64;
        let n_baskets = layout.seek.len();
        let max_baskets = (n_baskets + 1).max(10);
        let title = format!("{}/{}", branch.leaf_title(), branch.leaf.code());

        let at = o.open(13);
        o.tnamed(&branch.name, &title);
        let a = o.open(2); // TAttFill
        o.i16(0);
        o.i16(1001);
        o.close(a);
        o.i32(if self.compress { 101 } else { 0 });
        o.i32(32_000); // fBasketSize
        o.i32(0); // fEntryOffsetLen
        o.i32(n_baskets as i32); // fWriteBasket
        o.i64(entries); // fEntryNumber
        o.io_features();
        o.i32(0); // fOffset
        o.i32(max_baskets as i32);
        o.i32(0); // fSplitLevel
        o.i64(entries);
        o.i64(0); // fFirstEntry
        o.i64(layout.tot_bytes);
        o.i64(layout.zip_bytes);

        o.empty_array(); // fBranches
        let arr = o.array_header(1);
        let slot = o.slot(branch.leaf.class());
        stream_leaf(o, branch);
        o.close(slot);
        o.close(arr);
        o.empty_array(); // fBaskets

        o.u8(1);
        for i in 0..max_baskets {
            o.i32(layout.bytes.get(i).copied().unwrap_or(0));
        }
        o.u8(1);
        for i in 0..max_baskets {
            o.i64(layout.first_entry.get(i).copied().unwrap_or(0));
        }
        o.u8(1);
        for i in 0..max_baskets {
            o.i64(layout.seek.get(i).copied().unwrap_or(0));
        }
        o.string(""); // fFileName
        o.close(at);
    }
}

fn stream_leaf(o: &mut Obj, branch: &Branch) {
    let concrete = o.open(1);
    let base = o.open(2);
    o.tnamed(&branch.name, &branch.leaf_title());
    o.i32(branch.len as i32);
    o.i32(branch.leaf.size() as i32);
    o.i32(0); // fOffset
    o.u8(0); // fIsRange
    o.u8(0); // fIsUnsigned
    o.u32(0); // fLeafCount
    o.close(base);
    let lo = branch.values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = branch.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (0.0, 0.0) };
    match branch.leaf {
        Leaf::F64 => {
            o.f64(lo);
            o.f64(hi);
        }
        Leaf::F32 => {
            o.f32(lo as f32);
            o.f32(hi as f32);
        }
        Leaf::I32 => {
            o.i32(lo as i32);
            o.i32(hi as i32);
        }
    }
    o.close(concrete);
}

fn string_len(s: &str) -> usize {
    if s.len() < 255 { 1 + s.len() } else { 5 + s.len() }
}

fn put_string(out: &mut Vec<u8>, s: &str) {
    if s.len() < 255 {
        out.push(s.len() as u8);
    } else {
        out.push(255);
        out.extend_from_slice(&(s.len() as u32).to_be_bytes());
    }
    out.extend_from_slice(s.as_bytes());
}

fn key_len(class: &str, name: &str, title: &str, extra: usize) -> usize {
    4 + 2 + 4 + 4 + 2 + 2 + 4 + 4 + string_len(class) + string_len(name) + string_len(title) + extra
}

/// Small-file (version 4) key header, optionally followed by class-specific fields.
fn key_header(
    class: &str,
    name: &str,
    title: &str,
    n_bytes: usize,
    obj_len: usize,
    seek_key: usize,
    extra: &[u8],
) -> Vec<u8> {
    let len = key_len(class, name, title, extra.len());
    let mut k = Vec::with_capacity(len);
    k.extend_from_slice(&(n_bytes as u32).to_be_bytes());
    k.extend_from_slice(&4u16.to_be_bytes());
    k.extend_from_slice(&(obj_len as u32).to_be_bytes());
    k.extend_from_slice(&0x6A3C_1000u32.to_be_bytes()); // fDatime
    k.extend_from_slice(&(len as u16).to_be_bytes());
    k.extend_from_slice(&1u16.to_be_bytes()); // fCycle
    k.extend_from_slice(&(seek_key as u32).to_be_bytes());
    k.extend_from_slice(&(if seek_key == BEGIN { 0 } else { BEGIN as u32 }).to_be_bytes());
    put_string(&mut k, class);
    put_string(&mut k, name);
    put_string(&mut k, title);
    k.extend_from_slice(extra);
    assert_eq!(k.len(), len);
    k
}

/// Object buffer with ROOT's byte counts and class-tag bookkeeping.
struct Obj {
    buf: Vec<u8>,
    /// Length of the key header the buffer will be stored behind.
    displacement: usize,
    classes: Vec<(&'static str, usize)>,
}

impl Obj {
    fn new(displacement: usize) -> Self {
        Self { buf: Vec::new(), displacement, classes: Vec::new() }
    }

    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn i16(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn string(&mut self, s: &str) {
        put_string(&mut self.buf, s);
    }

    /// Byte-count placeholder plus class version; returns the position to close.
    fn open(&mut self, version: u16) -> usize {
        let at = self.buf.len();
        self.u32(0);
        self.u16(version);
        at
    }

    fn close(&mut self, at: usize) {
        let count = (self.buf.len() - at - 4) as u32 | K_BYTE_COUNT_MASK;
        self.buf[at..at + 4].copy_from_slice(&count.to_be_bytes());
    }

    fn tobject(&mut self) {
        self.u16(1);
        self.u32(0);
        self.u32(OBJECT_BITS);
    }

    fn tnamed(&mut self, name: &str, title: &str) {
        let at = self.open(1);
        self.tobject();
        self.string(name);
        self.string(title);
        self.close(at);
    }

    fn io_features(&mut self) {
        let at = self.open(1);
        self.u8(0);
        self.close(at);
    }

    fn array_header(&mut self, count: usize) -> usize {
        let at = self.open(3);
        self.tobject();
        self.string("");
        self.i32(count as i32);
        self.i32(0);
        at
    }

    fn empty_array(&mut self) {
        let at = self.array_header(0);
        self.close(at);
    }

    /// Open an array element: byte count, then a new class tag with the class
    /// name, or a reference to where that class was first streamed.
    fn slot(&mut self, class: &'static str) -> usize {
        let at = self.buf.len();
        self.u32(0);
        let tag_pos = self.buf.len();
        match self.classes.iter().find(|(c, _)| *c == class) {
            Some(&(_, offset)) => self.u32(K_CLASS_MASK | offset as u32),
            None => {
                self.u32(K_NEW_CLASS_TAG);
                self.buf.extend_from_slice(class.as_bytes());
                self.buf.push(0);
                self.classes.push((class, tag_pos + self.displacement + K_MAP_OFFSET));
            }
        }
        at
    }
}

/// The cvvar-shaped tree most tests share: `ene_l` (double), `length`
/// (float), `nhits` (int) and a three-element `vertex` array, spread over
/// several baskets.
pub fn cvvar_tree(n: usize) -> TreeFile {
    let ene_l: Vec<f64> = (0..n).map(|i| (i * 37 % 1000) as f64 + 0.5).collect();
    let length: Vec<f64> = (0..n).map(|i| (i % 50) as f64 * 0.1).collect();
    let nhits: Vec<f64> = (0..n).map(|i| (i % 40) as f64).collect();
    let vertex: Vec<f64> = (0..n).flat_map(|i| [i as f64, -(i as f64), 0.25]).collect();
    TreeFile::new("cvvar_tree")
        .branch(Branch::scalar("ene_l", Leaf::F64, ene_l))
        .branch(Branch::scalar("length", Leaf::F32, length))
        .branch(Branch::scalar("nhits", Leaf::I32, nhits))
        .branch(Branch::array("vertex", Leaf::F64, 3, vertex))
        .basket_entries(64)
}
