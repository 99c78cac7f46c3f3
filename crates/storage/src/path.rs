//! Path validation and security utilities.
//!
//! Compiled destinations are relative paths built from remote metadata; they
//! must never be able to leave the destination root.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a relative destination path for security and correctness.
/// Ensures that paths don't escape the destination root (no `..` traversal).
///
/// > **Note:** This does **not** normalize backslashes, non-UTF8 bytes, or
/// >           platform-specific weirdness. Null bytes are explicitly rejected.
///
/// # Returns
/// Returns the normalized path if valid, or [`InvalidPath`](crate::error::ErrorKind::InvalidPath)
/// if invalid.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use rjren_storage::validate_path;
/// // Valid paths
/// assert!(validate_path("Circle/[RJ123456] Title").is_ok());
/// assert!(validate_path("a/../RJ123456").is_ok()); // (never leaves the root)
/// // Invalid paths
/// assert!(validate_path("../RJ123456").is_err());
/// assert!(validate_path("a/../../b").is_err()); // (leaves the root)
/// assert!(validate_path("a\0b").is_err());
/// // Paths get resolved
/// assert_eq!(
///     validate_path("wrong/.././Circle//./RJ123456/").unwrap(),
///     Path::new("Circle/RJ123456")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    // Component parsing handles non-UTF8 names and repeated separators.
    let mut components = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir => {},
            // Absolute paths would replace the root when joined.
            Component::RootDir | Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}
