//! Bounded-depth discovery of work folders.
//!
//! A folder whose own name carries a [`WorkCode`](rjren_catalog::models::WorkCode)
//! is a work folder: it is reported and never descended into. Any other
//! folder is listed, in lexical order, until the depth limit is reached.

mod stream;

pub use self::stream::{DEFAULT_MAX_DEPTH, Found, scan};
