//! Catalog Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Every failure that can happen while resolving a [`WorkCode`](crate::models::WorkCode)
//! is classified into one of the variants below, so that callers can report
//! each item without ever having to inspect an opaque message.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of a failed lookup.
///
/// ### Request Failures
/// - [`ErrorKind::Timeout`]
/// - [`ErrorKind::Connection`]
/// - [`ErrorKind::HttpStatus`]
/// - [`ErrorKind::Request`]
///
/// ### Local Failures
/// - [`ErrorKind::InvalidCode`] - raised before any request is made.
/// - [`ErrorKind::Cache`]
/// - [`ErrorKind::Write`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The remote catalog did not answer in time.
    #[display("request timed out")]
    Timeout,
    /// DNS failure, refused connection, TLS handshake failure and friends.
    #[display("connection failed: {_0}")]
    Connection(#[error(not(source))] String),
    /// The catalog answered with a non-success status (or with no record,
    /// which is reported as `404 Not Found`).
    #[display("HTTP {status} {reason}")]
    HttpStatus { status: u16, reason: String },
    /// Any other request failure, including undecodable responses.
    #[display("request failed: {_0}")]
    Request(#[error(not(source))] String),
    /// The code does not match the work code pattern.
    #[display("invalid work code: {_0}")]
    InvalidCode(#[error(not(source))] String),
    /// The metadata cache could not be read.
    #[display("metadata cache unavailable")]
    Cache,
    /// A downloaded file could not be written.
    #[display("could not write {}", _0.display())]
    Write(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// The canonical "no such record" classification.
    pub(crate) fn not_found() -> Self {
        Self::HttpStatus { status: 404, reason: "Not Found".to_string() }
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Connection(_) => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Self::Request(_) | Self::InvalidCode(_) | Self::Cache | Self::Write(_) => false,
        }
    }
}

impl From<&reqwest::Error> for ErrorKind {
    fn from(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            Self::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            }
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Raises a [`reqwest::Error`] into the error tree under its classification.
pub(crate) trait Classify<T> {
    fn classify(self) -> Result<T>;
}
impl<T> Classify<T> for std::result::Result<T, reqwest::Error> {
    #[track_caller]
    fn classify(self) -> Result<T> {
        self.map_err(|err| {
            let kind = ErrorKind::from(&err);
            exn::Exn::from(err).raise(kind)
        })
    }
}
