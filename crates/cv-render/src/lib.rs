//! # cv-render
//!
//! Draws cvvar histograms onto an immediate-mode SVG canvas and exports the
//! result as SVG, PNG or PDF. Draw options follow ROOT's `TH1::Draw`
//! vocabulary (`HIST`, `E`, `BAR`, `SCAT`, `BOX`, `COL`, `COLZ`).

pub mod canvas;
pub mod color;
pub mod config;
pub mod draw_options;
pub mod layout;
pub mod output;
pub mod plots;
pub mod primitives;
pub mod text;
pub mod theme;

use std::path::Path;

use cv_root::{Hist1D, Hist2D, Histogram};
use thiserror::Error;

pub use config::{RenderConfig, resolve_config};
pub use draw_options::{DrawOptions, Style1D, Style2D};
pub use output::OutputFormat;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("unknown output format: {0}")]
    UnknownFormat(String),
    #[error("histogram '{0}' has no bins to draw")]
    EmptyHistogram(String),
    #[cfg(feature = "png")]
    #[error("PNG encoding error: {0}")]
    Png(String),
    #[cfg(feature = "pdf")]
    #[error("PDF conversion error: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// A borrowed histogram of either dimension.
#[derive(Debug, Clone, Copy)]
pub enum Plottable<'a> {
    H1(&'a Hist1D),
    H2(&'a Hist2D),
}

impl Plottable<'_> {
    pub fn name(&self) -> &str {
        match self {
            Plottable::H1(h) => &h.name,
            Plottable::H2(h) => &h.name,
        }
    }
}

impl<'a> From<&'a Hist1D> for Plottable<'a> {
    fn from(h: &'a Hist1D) -> Self {
        Plottable::H1(h)
    }
}

impl<'a> From<&'a Hist2D> for Plottable<'a> {
    fn from(h: &'a Hist2D) -> Self {
        Plottable::H2(h)
    }
}

impl<'a> From<&'a Histogram> for Plottable<'a> {
    fn from(h: &'a Histogram) -> Self {
        match h {
            Histogram::H1(h) => Plottable::H1(h),
            Histogram::H2(h) => Plottable::H2(h),
        }
    }
}

/// Render a histogram to an SVG document.
pub fn render_svg<'a>(
    hist: impl Into<Plottable<'a>>,
    options: &DrawOptions,
    config: &RenderConfig,
) -> Result<String> {
    match hist.into() {
        Plottable::H1(h) => plots::hist1d::render(h, options, config),
        Plottable::H2(h) => plots::hist2d::render(h, options, config),
    }
}

/// Render a histogram to bytes in `format`.
pub fn render_to_bytes<'a>(
    hist: impl Into<Plottable<'a>>,
    options: &DrawOptions,
    format: OutputFormat,
    config: &RenderConfig,
) -> Result<Vec<u8>> {
    let svg = render_svg(hist, options, config)?;
    match format {
        OutputFormat::Svg => Ok(svg.into_bytes()),
        #[cfg(feature = "png")]
        OutputFormat::Png => output::png::svg_to_png(&svg, config.output.dpi),
        #[cfg(feature = "pdf")]
        OutputFormat::Pdf => output::pdf::svg_to_pdf(&svg),
    }
}

/// Render a histogram to a file; the extension picks the format.
pub fn render_to_file<'a>(
    hist: impl Into<Plottable<'a>>,
    options: &DrawOptions,
    path: &Path,
    config: &RenderConfig,
) -> Result<()> {
    let hist = hist.into();
    let format = OutputFormat::from_path(path)?;
    let bytes = render_to_bytes(hist, options, format, config)?;
    std::fs::write(path, bytes)?;
    tracing::debug!(path = %path.display(), ?format, hist = hist.name(), "wrote image");
    Ok(())
}
