//! Error types for the analysis layer.

use std::path::PathBuf;

use cv_render::RenderError;
use cv_root::RootError;
use thiserror::Error;

/// Failures loading a SRIM energy/range table.
#[derive(Error, Debug)]
pub enum SrimError {
    /// The table could not be opened or read.
    #[error("cannot read SRIM table {}: {source}", path.display())]
    Io {
        /// Table path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// A line is not exactly two numbers.
    #[error("{}:{line}: expected '<energy_keV> <length_mm>', got {content:?}", path.display())]
    Parse {
        /// Table path.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },
}

/// Any failure of the analysis layer.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Reading the ROOT file or projecting the tree failed.
    #[error(transparent)]
    Root(#[from] RootError),

    /// Rendering or writing an image failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Loading a reference table failed.
    #[error(transparent)]
    Srim(#[from] SrimError),

    /// The configuration file is unreadable or malformed.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;
