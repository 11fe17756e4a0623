//! Error types.
//!
//! The interpolation engine itself never fails on template content; the only
//! errors it can return come from the lookup source it was handed.

use std::convert::Infallible;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of one of the built-in lookup sources.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("environment variable `{name}` is not valid unicode")]
    NotUnicode { name: String },
}

impl From<Infallible> for LookupError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// A non-fatal error encountered while loading a properties file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct PropertyError {
    pub line: usize,
    pub message: String,
}

/// Top-level error for the `shellsub` binary.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("{0}")]
    Usage(String),
}

pub type Result<T> = std::result::Result<T, Error>;

// ── Tests ─────────────────────────────────────────────────────────────────────
