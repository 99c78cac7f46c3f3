//! SQLite cache of resolved work metadata.
//!
//! The remote catalog is the source of truth; this database only remembers
//! what it already answered, keyed by work code, so that repeated passes over
//! the same folders make no network calls. Deleting the database is always
//! safe. Records are written once and never refreshed in place: forget a code
//! to have it fetched again.

mod db;
pub mod error;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::models::Entry;
pub use crate::repo::Repository;
