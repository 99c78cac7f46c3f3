//! Config Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("configuration file not found: {}", _0.display())]
    Missing(#[error(not(source))] PathBuf),
    /// Only TOML, JSON and YAML files are understood.
    #[display("unsupported configuration format: {}", _0.display())]
    UnknownFormat(#[error(not(source))] PathBuf),
    #[display("could not load configuration")]
    Load,
    /// Every violation, one per line.
    #[display("invalid configuration:\n{_0}")]
    Invalid(#[error(not(source))] String),
    #[display("could not determine a home directory")]
    NoHomeDirectory,
}

impl ErrorKind {
    pub fn is_retryable(&self) -> bool {
        false
    }
}
