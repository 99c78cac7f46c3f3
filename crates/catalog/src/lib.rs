//! Work codes, metadata and the remote catalog.
//!
//! - [`models`]: [`WorkCode`](models::WorkCode), [`WorkMetadata`](models::WorkMetadata)
//!   and friends.
//! - [`MetadataSource`]: the capability of resolving a code into metadata,
//!   implemented by [`HttpSource`] against the remote product endpoint.
//! - [`CoverArt`]: the contract for placing cover artwork into a folder.

mod consts;
mod cover;
pub mod error;
mod http;
pub mod models;
mod source;

pub use crate::consts::DEFAULT_ENDPOINT;
pub use crate::cover::{CoverArt, CoverDownloader, CoverFiles};
pub use crate::http::{HttpSettings, HttpSource};
pub use crate::source::MetadataSource;
