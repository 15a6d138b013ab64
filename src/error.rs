//! Crate-level errors.
//!
//! # Error Hierarchy
//!
//! The crate uses a two-layer error hierarchy:
//!
//! ## Top Layer (`crate::error`)
//!
//! - [`Error`]: configuration-source and I/O errors
//!
//! ## Engine Layer (`crate::reconcile::error`)
//!
//! - [`ReconcileError`]: leadership, registry, and relation-data errors
//!
//! ## Conversion
//!
//! [`ReconcileError`] can be converted to [`Error`] via `From`, allowing
//! engine errors to propagate through a top-level entry point.
//!
//! [`ReconcileError`]: crate::reconcile::ReconcileError

use std::{io, path::PathBuf, result};
use thiserror::Error as ThisError;

pub type Result<T> = result::Result<T, Error>;

/// Configuration and I/O level errors.
///
/// For leadership and credential lifecycle errors, see
/// [`crate::reconcile::ReconcileError`].
#[derive(Debug, ThisError)]
pub enum Error {
    /// The default configuration source is missing.
    ///
    /// Only the *default* property path produces this error; a missing
    /// override path degrades to an empty override set.
    #[error("configuration source not found: {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    /// An error in the filesystem.
    #[error("IO error: {0:?}")]
    Io(io::ErrorKind),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e.kind())
    }
}

impl From<crate::reconcile::ReconcileError> for Error {
    fn from(e: crate::reconcile::ReconcileError) -> Self {
        use crate::reconcile::ReconcileError;
        match e {
            ReconcileError::Config(inner) => inner,
            other => Error::Config(other.to_string()),
        }
    }
}
