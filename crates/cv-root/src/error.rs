//! Error type for ROOT file access and tree projection.

use thiserror::Error;

/// Errors raised while reading ROOT files or projecting tree expressions.
#[derive(Error, Debug)]
pub enum RootError {
    /// Underlying I/O failure (open, mmap).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not start with the `root` magic or is truncated.
    #[error("not a ROOT file (bad magic or truncated header)")]
    BadMagic,

    /// A read ran past the end of a buffer.
    #[error("buffer underflow at offset {offset}: need {need} bytes, have {have}")]
    BufferUnderflow {
        /// Offset where the read started.
        offset: usize,
        /// Bytes requested.
        need: usize,
        /// Bytes available.
        have: usize,
    },

    /// A compressed block could not be inflated.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// A streamed object did not have the expected layout.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// No key with this name in the directory.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// No TTree with this name in the directory.
    #[error("tree not found: {0}")]
    TreeNotFound(String),

    /// The tree has no branch with this name.
    #[error("branch not found: {0}")]
    BranchNotFound(String),

    /// Branch payload does not match the declared leaf type.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Expression failed to tokenize or parse.
    #[error("expression error: {0}")]
    Expression(String),

    /// Binning specification is malformed or does not match the expression.
    #[error("binning error: {0}")]
    Binning(String),
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, RootError>;
