//! # cv-root
//!
//! Native ROOT file reader for the cvvar analysis tools.
//!
//! Opens `.root` files without a ROOT installation, parses the top directory
//! and TTree metadata, decodes branch baskets (zlib, LZ4, ZSTD, XZ) and
//! projects draw expressions into histograms the way `TTree::Draw` does.
//!
//! ## Example
//!
//! ```no_run
//! use cv_root::{Binning, RootFile, TreeSource, project};
//!
//! let f = RootFile::open("cvvar.root").unwrap();
//! let tree = f.get_tree("cvvar_tree").unwrap();
//! let binning = Binning::parse("100, 0, 50, 100, 0, 5").unwrap();
//! let h = project(&TreeSource::new(&f, &tree), "h", "range:energy", &binning, "").unwrap();
//! println!("{} entries", h.entries());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod basket;
pub mod binning;
pub mod branch_reader;
pub mod datasource;
pub mod decompress;
pub mod directory;
pub mod error;
pub mod expr;
pub mod file;
pub mod filler;
pub mod histogram;
pub mod key;
pub mod objects;
pub mod project;
pub mod rbuffer;
pub mod tree;

pub use binning::{AxisSpec, Binning};
pub use branch_reader::BranchReader;
pub use error::{Result, RootError};
pub use expr::{CompiledExpr, split_varexp};
pub use file::RootFile;
pub use filler::{fill_hist1d, fill_hist2d};
pub use histogram::{BinAxis, BinIndex, Hist1D, Hist2D, Histogram};
pub use key::KeyInfo;
pub use project::{ColumnSource, MemoryColumns, TreeSource, project};
pub use tree::{BranchInfo, LeafType, Tree};
