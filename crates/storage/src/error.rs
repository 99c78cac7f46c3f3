//! Storage Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A storage error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// File does not exist
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Access denied
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Destination is already occupied; nothing was changed.
    #[display("destination already exists: {}", _0.display())]
    AlreadyExists(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// Path contains invalid characters or escapes root
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Returns `true` for failures that make further operations under the
    /// same root untrustworthy. Occupied destinations and rejected paths
    /// only concern the item at hand.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::NotFound(_) | Self::PermissionDenied(_) | Self::Io(_) => true,
            Self::AlreadyExists(_) | Self::InvalidPath(_) => false,
        }
    }
}

pub(crate) fn map_io_error(e: IoError, path: impl Into<PathBuf>) -> ErrorKind {
    match e.kind() {
        std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.into()),
        std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.into()),
        std::io::ErrorKind::AlreadyExists => ErrorKind::AlreadyExists(path.into()),
        _ => ErrorKind::Io(e),
    }
}
