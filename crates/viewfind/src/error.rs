//! Error types for path normalization and enumeration.

use std::io;
use thiserror::Error;

/// A virtual path that cannot be used as a namespace key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidPathError {
    #[error("path is missing")]
    Missing,
    #[error("path is empty")]
    Empty,
    #[error("path contains a NUL character")]
    Nul,
}

/// Errors from [`ProjectEnumerator`](crate::ProjectEnumerator) operations.
///
/// Non-existence is never reported here: a missing item comes back with
/// `exists == false` and a missing directory enumerates to nothing.
#[derive(Debug, Error)]
pub enum ViewfindError {
    #[error("invalid virtual path: {0}")]
    InvalidPath(#[from] InvalidPathError),
    /// Raised by the storage provider and passed through untouched.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ViewfindError {
    /// True if this is a path validation failure.
    pub fn is_invalid_path(&self) -> bool {
        matches!(self, ViewfindError::InvalidPath(_))
    }
}
