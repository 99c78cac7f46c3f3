//! Safe folder operations.
//!
//! Every operation either completes or leaves the source where it was: a
//! destination that already exists is reported, never overwritten, and a
//! failed cross-device move removes whatever it managed to copy.

pub mod error;
mod models;
mod ops;
mod path;

pub use crate::models::Action;
pub use crate::ops::{link, relocate, rename_in_place};
pub use crate::path::validate as validate_path;
