//! TTree metadata: branches, leaf types and basket locations.

/// Element type of a branch's leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafType {
    /// `TLeafO`
    Bool,
    /// `TLeafB`
    I8,
    /// `TLeafB`, unsigned
    U8,
    /// `TLeafS`
    I16,
    /// `TLeafS`, unsigned
    U16,
    /// `TLeafI`
    I32,
    /// `TLeafI`, unsigned
    U32,
    /// `TLeafL`
    I64,
    /// `TLeafL`, unsigned
    U64,
    /// `TLeafF`
    F32,
    /// `TLeafD`
    F64,
}

impl LeafType {
    /// Map a TLeaf class name to its element type.
    pub fn from_class(class_name: &str, unsigned: bool) -> Option<Self> {
        let t = match (class_name, unsigned) {
            ("TLeafO", _) => LeafType::Bool,
            ("TLeafB", false) => LeafType::I8,
            ("TLeafB", true) => LeafType::U8,
            ("TLeafS", false) => LeafType::I16,
            ("TLeafS", true) => LeafType::U16,
            ("TLeafI", false) => LeafType::I32,
            ("TLeafI", true) => LeafType::U32,
            ("TLeafL", false) => LeafType::I64,
            ("TLeafL", true) => LeafType::U64,
            ("TLeafF", _) => LeafType::F32,
            ("TLeafD", _) => LeafType::F64,
            _ => return None,
        };
        Some(t)
    }

    /// Bytes per element.
    pub fn byte_size(self) -> usize {
        match self {
            LeafType::Bool | LeafType::I8 | LeafType::U8 => 1,
            LeafType::I16 | LeafType::U16 => 2,
            LeafType::I32 | LeafType::U32 | LeafType::F32 => 4,
            LeafType::I64 | LeafType::U64 | LeafType::F64 => 8,
        }
    }
}

/// One branch of a tree.
#[derive(Debug, Clone)]
pub struct BranchInfo {
    /// Branch name.
    pub name: String,
    /// Element type of the first leaf.
    pub leaf_type: LeafType,
    /// Elements per entry (`fLen` of the leaf); 1 for scalars.
    pub leaf_len: usize,
    /// Entries written to the branch.
    pub entries: u64,
    /// Non-zero when baskets carry a trailing entry-offset table.
    pub entry_offset_len: i32,
    /// First entry of each basket; one extra trailing element.
    pub basket_entry: Vec<u64>,
    /// File position of each basket's key.
    pub basket_seek: Vec<u64>,
}

impl BranchInfo {
    /// Number of baskets holding data.
    pub fn n_baskets(&self) -> usize {
        self.basket_seek.len()
    }

    /// Entries stored in basket `i`.
    pub fn basket_entries(&self, i: usize) -> u64 {
        let first = self.basket_entry.get(i).copied().unwrap_or(0);
        let next = self.basket_entry.get(i + 1).copied().unwrap_or(self.entries);
        next.saturating_sub(first)
    }
}

/// A parsed TTree.
#[derive(Debug, Clone)]
pub struct Tree {
    /// Tree name.
    pub name: String,
    /// Tree title.
    pub title: String,
    /// Number of entries (`fEntries`).
    pub entries: u64,
    /// Branches in declaration order.
    pub branches: Vec<BranchInfo>,
}

impl Tree {
    /// Branch with this name.
    pub fn find_branch(&self, name: &str) -> Option<&BranchInfo> {
        self.branches.iter().find(|b| b.name == name)
    }

    /// Branch names in declaration order.
    pub fn branch_names(&self) -> Vec<&str> {
        self.branches.iter().map(|b| b.name.as_str()).collect()
    }
}
