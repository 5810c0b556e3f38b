//! Histogram filling from evaluated columns.
//!
//! The optional weight column is a `TTree::Draw` selection value: a boolean
//! cut yields 0/1, anything else scales the fill. Entries whose weight is
//! exactly zero are skipped and do not count as entries.

use crate::error::{Result, RootError};
use crate::histogram::{BinAxis, Hist1D, Hist2D};

fn check_len(what: &str, got: usize, want: usize) -> Result<()> {
    if got != want {
        return Err(RootError::TypeMismatch(format!(
            "{what} column has {got} values, expected {want}"
        )));
    }
    Ok(())
}

fn weight_at(weights: Option<&[f64]>, i: usize) -> f64 {
    weights.map_or(1.0, |w| w[i])
}

/// Fill a 1-D histogram from `values`.
pub fn fill_hist1d(
    name: &str,
    title: &str,
    axis: BinAxis,
    values: &[f64],
    weights: Option<&[f64]>,
) -> Result<Hist1D> {
    if let Some(w) = weights {
        check_len("weight", w.len(), values.len())?;
    }
    let mut h = Hist1D::new(name, title, axis);
    for (i, &x) in values.iter().enumerate() {
        let w = weight_at(weights, i);
        if w == 0.0 || w.is_nan() {
            continue;
        }
        h.fill(x, w);
    }
    Ok(h)
}

/// Fill a 2-D histogram from paired `xs` and `ys`.
pub fn fill_hist2d(
    name: &str,
    title: &str,
    x_axis: BinAxis,
    y_axis: BinAxis,
    xs: &[f64],
    ys: &[f64],
    weights: Option<&[f64]>,
) -> Result<Hist2D> {
    check_len("y", ys.len(), xs.len())?;
    if let Some(w) = weights {
        check_len("weight", w.len(), xs.len())?;
    }
    let mut h = Hist2D::new(name, title, x_axis, y_axis);
    for (i, (&x, &y)) in xs.iter().zip(ys).enumerate() {
        let w = weight_at(weights, i);
        if w == 0.0 || w.is_nan() {
            continue;
        }
        h.fill(x, y, w);
    }
    Ok(h)
}
