//! `TTree::Draw` binning specifications.
//!
//! A binning is any prefix of `nx, xlo, xhi, ny, ylo, yhi`, the empty string
//! included. A missing bin count takes the default (100 bins in 1-D, 40 per
//! axis in 2-D). A missing edge reads as zero, and an axis whose lower edge is
//! not below its upper edge takes its range from the projected data.

use std::str::FromStr;

use crate::error::{Result, RootError};
use crate::histogram::BinAxis;

/// Bins of a 1-D histogram when the binning names no count.
pub const DEFAULT_BINS_1D: usize = 100;
/// Bins per axis of a 2-D histogram when the binning names no count.
pub const DEFAULT_BINS_2D: usize = 40;
/// Largest bin count of a single axis.
pub const MAX_BINS: usize = u32::MAX as usize;
/// Largest number of cells (`nx * ny`) of one histogram.
pub const MAX_CELLS: usize = 100_000_000;

/// One binning axis: an optional bin count and an optional fixed range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisSpec {
    /// Bin count, `None` for the default.
    pub n_bins: Option<usize>,
    /// Fixed `(lo, hi)`, `None` to take the range from the data.
    pub range: Option<(f64, f64)>,
}

impl AxisSpec {
    /// Axis with a count and a fixed range.
    pub fn fixed(n_bins: usize, lo: f64, hi: f64) -> Self {
        Self { n_bins: Some(n_bins), range: Some((lo, hi)) }
    }

    /// Concrete axis for `values`, the projected column of this axis.
    ///
    /// Only finite values whose weight is neither zero nor NaN take part in
    /// a data-driven range.
    pub fn resolve(&self, default_bins: usize, values: &[f64], weights: Option<&[f64]>) -> BinAxis {
        let n_bins = self.n_bins.unwrap_or(default_bins);
        let (lo, hi) = self.range.unwrap_or_else(|| data_range(n_bins, values, weights));
        BinAxis::new(n_bins, lo, hi)
    }
}

/// Parsed binning for one or two axes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Binning {
    /// Horizontal axis.
    pub x: AxisSpec,
    /// Vertical axis, present when the binning has more than three values.
    pub y: Option<AxisSpec>,
}

impl Binning {
    /// Parse a comma-separated spec of up to six numbers.
    pub fn parse(spec: &str) -> Result<Self> {
        let trimmed = spec.trim();
        let fields: Vec<&str> = match trimmed {
            "" => Vec::new(),
            _ => trimmed.split(',').map(str::trim).collect(),
        };
        if fields.len() > 6 {
            return Err(RootError::Binning(format!(
                "'{spec}': expected at most 6 values (nx, xlo, xhi, ny, ylo, yhi), got {}",
                fields.len()
            )));
        }
        let (x_fields, y_fields) = fields.split_at(fields.len().min(3));
        let x = axis(spec, x_fields)?;
        let y = match y_fields {
            [] => None,
            _ => Some(axis(spec, y_fields)?),
        };
        if let Some(nx) = x.n_bins {
            check_cells(nx, y.and_then(|y| y.n_bins).unwrap_or(1))?;
        }
        Ok(Self { x, y })
    }

    /// Number of axes the binning names.
    pub fn dimension(&self) -> usize {
        if self.y.is_some() { 2 } else { 1 }
    }
}

impl FromStr for Binning {
    type Err = RootError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Reject histograms with more than [`MAX_CELLS`] cells.
pub fn check_cells(nx: usize, ny: usize) -> Result<()> {
    match nx.checked_mul(ny) {
        Some(cells) if cells <= MAX_CELLS => Ok(()),
        _ => Err(RootError::Binning(format!(
            "{nx} x {ny} bins exceed the limit of {MAX_CELLS} cells"
        ))),
    }
}

fn axis(spec: &str, fields: &[&str]) -> Result<AxisSpec> {
    let n_bins = match fields.first() {
        Some(n) => Some(parse_count(n).ok_or_else(|| {
            RootError::Binning(format!(
                "'{spec}': bin count '{n}' is not an integer between 1 and {MAX_BINS}"
            ))
        })?),
        None => None,
    };
    let lo = fields.get(1).map(|s| parse_edge(spec, s)).transpose()?.unwrap_or(0.0);
    let hi = fields.get(2).map(|s| parse_edge(spec, s)).transpose()?.unwrap_or(0.0);
    Ok(AxisSpec { n_bins, range: (lo < hi).then_some((lo, hi)) })
}

/// Accepts `100` and `100.0`, rejects zero, negatives, fractions and counts
/// above [`MAX_BINS`].
fn parse_count(s: &str) -> Option<usize> {
    if let Ok(n) = s.parse::<usize>() {
        return (1..=MAX_BINS).contains(&n).then_some(n);
    }
    let f: f64 = s.parse().ok()?;
    (f >= 1.0 && f.fract() == 0.0 && f <= MAX_BINS as f64).then_some(f as usize)
}

fn parse_edge(spec: &str, s: &str) -> Result<f64> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(RootError::Binning(format!("'{spec}': '{s}' is not a finite number"))),
    }
}

/// `n_bins` bins of a round width starting at a multiple of that width, with
/// the largest filled value inside the last bin.
fn data_range(n_bins: usize, values: &[f64], weights: Option<&[f64]>) -> (f64, f64) {
    let filled = |i: usize| {
        weights.is_none_or(|w| w.get(i).is_some_and(|&w| w != 0.0 && !w.is_nan()))
    };
    let (min, max) = values
        .iter()
        .enumerate()
        .filter(|&(i, v)| v.is_finite() && filled(i))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, &v)| (lo.min(v), hi.max(v)));
    if min > max {
        return (0.0, 1.0);
    }
    if min == max {
        return (min - 1.0, max + 1.0);
    }
    let n = n_bins as f64;
    let fallback = (min, max + (max - min) / n);
    let raw = (max - min) / n;
    if !raw.is_normal() {
        return fallback;
    }
    let mut step = nice_step(raw);
    for _ in 0..16 {
        let lo = (min / step).floor() * step;
        let hi = lo + n * step;
        if hi > max {
            return (lo, hi);
        }
        step = nice_step(step * 1.001);
    }
    fallback
}

/// Smallest of 1, 2, 5 times a power of ten that is at least `raw`.
fn nice_step(raw: f64) -> f64 {
    let mag = 10f64.powf(raw.log10().floor());
    [1.0, 2.0, 5.0].into_iter().find(|&m| m * mag >= raw).unwrap_or(10.0) * mag
}
