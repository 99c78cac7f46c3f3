//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// ### Construction Errors
/// Raised while building a [`NameCompiler`](crate::NameCompiler); fail fast.
/// - [`ErrorKind::MissingCode`]
/// - [`ErrorKind::DateFormat`]
///
/// ### Per-item Errors
/// - [`ErrorKind::Unreadable`] - a folder the scanner could not list.
/// - [`ErrorKind::Compile`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Every name must keep the work code, or the folder could never be found again.
    #[display("template must contain `rjcode`: {_0:?}")]
    MissingCode(#[error(not(source))] String),
    /// Old configurations used strftime (`%y%m%d`), which reads as literal text here.
    #[display("invalid date format {_0:?}: expected a `time` format description such as `[year repr:last_two][month][day]`, not strftime")]
    DateFormat(#[error(not(source))] String),
    #[display("could not read folder: {}", _0.display())]
    Unreadable(#[error(not(source))] PathBuf),
    /// The metadata could not be rendered into a name.
    #[display("could not compile a name: {_0}")]
    Compile(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unreadable(_))
    }
}
