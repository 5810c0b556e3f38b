//! Tree projection: the native equivalent of
//! `tree.Draw("y:x>>name(nx,xlo,xhi,ny,ylo,yhi)", cut)`.

use std::collections::HashMap;

use crate::binning::{Binning, DEFAULT_BINS_1D, DEFAULT_BINS_2D, check_cells};
use crate::error::{Result, RootError};
use crate::expr::{CompiledExpr, split_varexp};
use crate::file::RootFile;
use crate::filler::{fill_hist1d, fill_hist2d};
use crate::histogram::Histogram;
use crate::tree::Tree;

/// Anything that can hand out named `f64` columns of equal length.
pub trait ColumnSource {
    /// Rows in every column.
    fn n_entries(&self) -> usize;

    /// Read one column by name.
    fn column(&self, name: &str) -> Result<Vec<f64>>;
}

/// Columns of a tree inside an open ROOT file.
pub struct TreeSource<'a> {
    file: &'a RootFile,
    tree: &'a Tree,
}

impl<'a> TreeSource<'a> {
    /// Source over `tree` read from `file`.
    pub fn new(file: &'a RootFile, tree: &'a Tree) -> Self {
        Self { file, tree }
    }
}

impl ColumnSource for TreeSource<'_> {
    fn n_entries(&self) -> usize {
        self.tree.entries as usize
    }

    fn column(&self, name: &str) -> Result<Vec<f64>> {
        self.file.branch_data(self.tree, name)
    }
}

/// In-memory columns, for tests and derived data.
#[derive(Debug, Clone, Default)]
pub struct MemoryColumns {
    n_entries: usize,
    columns: HashMap<String, Vec<f64>>,
}

impl MemoryColumns {
    /// Empty source with `n_entries` rows.
    pub fn new(n_entries: usize) -> Self {
        Self { n_entries, columns: HashMap::new() }
    }

    /// Add a column; its length must equal `n_entries`.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        let name = name.into();
        if values.len() != self.n_entries {
            return Err(RootError::TypeMismatch(format!(
                "column '{name}' has {} values, expected {}",
                values.len(),
                self.n_entries
            )));
        }
        self.columns.insert(name, values);
        Ok(self)
    }
}

impl ColumnSource for MemoryColumns {
    fn n_entries(&self) -> usize {
        self.n_entries
    }

    fn column(&self, name: &str) -> Result<Vec<f64>> {
        self.columns.get(name).cloned().ok_or_else(|| RootError::BranchNotFound(name.to_string()))
    }
}

/// Project `varexp` (`x` or `y:x`) into a new histogram named `name`.
///
/// `selection` is evaluated per entry and used as the fill weight; an empty
/// selection fills every entry with weight 1. Only the columns referenced by
/// the expressions are read. Axes the binning leaves open get their default
/// bin count and a range covering the selected values.
pub fn project(
    source: &dyn ColumnSource,
    name: &str,
    varexp: &str,
    binning: &Binning,
    selection: &str,
) -> Result<Histogram> {
    let parts = split_varexp(varexp);
    if parts.len() > 2 {
        return Err(RootError::Expression(format!(
            "'{varexp}' has {} dimensions; only 1-D and 2-D projections are supported",
            parts.len()
        )));
    }
    if parts.len() < binning.dimension() {
        return Err(RootError::Binning(format!(
            "'{varexp}' is 1-D but the binning describes 2 axes"
        )));
    }

    // ROOT order: the last part is x, the one before it y.
    let x_expr = CompiledExpr::compile(parts[parts.len() - 1])?;
    let y_expr = match parts.len() {
        2 => Some(CompiledExpr::compile(parts[0])?),
        _ => None,
    };
    let cut = selection.trim();
    let cut_expr = if cut.is_empty() { None } else { Some(CompiledExpr::compile(cut)?) };

    let mut cache = ColumnCache::new(source);
    let n = source.n_entries();
    let xs = cache.evaluate(&x_expr)?;
    let ys = y_expr.as_ref().map(|e| cache.evaluate(e)).transpose()?;
    let weights = cut_expr.as_ref().map(|e| cache.evaluate(e)).transpose()?;
    tracing::debug!(
        varexp,
        selection = cut,
        entries = n,
        columns_read = cache.columns.len(),
        "projecting"
    );

    let title = match cut {
        "" => varexp.trim().to_string(),
        _ => format!("{} {{{cut}}}", varexp.trim()),
    };
    let weights = weights.as_deref();
    let hist = match ys {
        Some(ys) => {
            let x_axis = binning.x.resolve(DEFAULT_BINS_2D, &xs, weights);
            let y_axis = binning.y.unwrap_or_default().resolve(DEFAULT_BINS_2D, &ys, weights);
            check_cells(x_axis.n_bins, y_axis.n_bins)?;
            fill_hist2d(name, &title, x_axis, y_axis, &xs, &ys, weights)?.into()
        }
        None => {
            let x_axis = binning.x.resolve(DEFAULT_BINS_1D, &xs, weights);
            fill_hist1d(name, &title, x_axis, &xs, weights)?.into()
        }
    };
    Ok(hist)
}

/// Reads each referenced column once across all expressions of a projection.
struct ColumnCache<'a> {
    source: &'a dyn ColumnSource,
    columns: HashMap<String, Vec<f64>>,
}

impl<'a> ColumnCache<'a> {
    fn new(source: &'a dyn ColumnSource) -> Self {
        Self { source, columns: HashMap::new() }
    }

    fn evaluate(&mut self, expr: &CompiledExpr) -> Result<Vec<f64>> {
        let n = self.source.n_entries();
        for name in &expr.required_branches {
            if !self.columns.contains_key(name) {
                let col = self.source.column(name)?;
                if col.len() != n {
                    return Err(RootError::TypeMismatch(format!(
                        "column '{name}' has {} values, tree has {n} entries",
                        col.len()
                    )));
                }
                self.columns.insert(name.clone(), col);
            }
        }
        let cols: Vec<&[f64]> =
            expr.required_branches.iter().map(|b| self.columns[b].as_slice()).collect();
        Ok(expr.eval_bulk(&cols, n))
    }
}
