//! Layered configuration for rjren.
//!
//! A [`Config`] is built from the built-in defaults, then a TOML, JSON or YAML
//! file, then `RJREN_`-prefixed environment variables. Loading never
//! validates; call [`Config::check`] (or [`Config::validate`] for the list of
//! violations) before turning it into the types the rename pass needs.

pub mod error;
mod load;
mod model;
mod settings;
mod validate;

pub use crate::load::{ENV_PREFIX, default_path};
pub use crate::model::{AgeCategoryMap, CacheConfig, Config, RenamerConfig, ScannerConfig, ScraperConfig};
pub use crate::validate::Violation;
