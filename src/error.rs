use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("configuration error")]
    Config,
    #[display("metadata cache error")]
    Cache,
    #[display("could not set up the catalog client")]
    Catalog,
    #[display("invalid work code: {_0:?}")]
    InvalidCode(#[error(not(source))] String),
}
