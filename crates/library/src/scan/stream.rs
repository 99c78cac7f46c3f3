use crate::error::{ErrorKind, Result};
use async_stream::stream;
use futures::Stream;
use rjren_catalog::models::WorkCode;
use std::collections::HashSet;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const DEFAULT_MAX_DEPTH: usize = 5;

/// A work folder discovered by [`scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    pub code: WorkCode,
    /// Absolute path of the folder.
    pub path: PathBuf,
    /// `0` for the root itself.
    pub depth: usize,
}

enum Visit {
    Found(WorkCode),
    Descend,
    Skip,
}

/// Classifies a single path. Symbolic links to folders count as folders; a
/// folder that resolves to one already seen is skipped.
async fn visit(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<Visit> {
    let metadata = match fs::metadata(path).await {
        Ok(metadata) => metadata,
        // Dangling links and entries removed since listing.
        Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(Visit::Skip),
        Err(_) => exn::bail!(ErrorKind::Unreadable(path.to_path_buf())),
    };
    if !metadata.is_dir() {
        return Ok(Visit::Skip);
    }
    let canonical = match fs::canonicalize(path).await {
        Ok(canonical) => canonical,
        Err(_) => exn::bail!(ErrorKind::Unreadable(path.to_path_buf())),
    };
    if !visited.insert(canonical) {
        tracing::debug!(path = %path.display(), "already visited");
        return Ok(Visit::Skip);
    }
    match path.file_name().and_then(|name| WorkCode::find(name.to_string_lossy())) {
        Some(code) => Ok(Visit::Found(code)),
        None => Ok(Visit::Descend),
    }
}

/// Child paths of `dir`, sorted by name.
async fn children(dir: &Path) -> Result<Vec<PathBuf>> {
    let Ok(mut entries) = fs::read_dir(dir).await else {
        exn::bail!(ErrorKind::Unreadable(dir.to_path_buf()));
    };
    let mut children = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => children.push(entry.path()),
            Ok(None) => break,
            Err(_) => exn::bail!(ErrorKind::Unreadable(dir.to_path_buf())),
        }
    }
    children.sort();
    Ok(children)
}

/// Streams every work folder at or below `root`, down to `max_depth` levels
/// (the root is depth `0`).
///
/// Each call starts a fresh walk. A folder that cannot be read is reported as
/// an [`ErrorKind::Unreadable`] item and only its subtree is skipped; a root
/// that does not exist is reported the same way.
pub fn scan(root: impl AsRef<Path>, max_depth: usize) -> impl Stream<Item = Result<Found>> {
    let root = root.as_ref().to_path_buf();
    stream! {
        let root = match std::path::absolute(&root) {
            Ok(root) => root,
            Err(_) => {
                yield Err(exn::Exn::from(ErrorKind::Unreadable(root)));
                return;
            },
        };
        if !fs::try_exists(&root).await.unwrap_or(false) {
            yield Err(exn::Exn::from(ErrorKind::Unreadable(root)));
            return;
        }
        let mut visited = HashSet::new();
        let mut stack = vec![(root, 0)];
        while let Some((path, depth)) = stack.pop() {
            match visit(&path, &mut visited).await {
                Ok(Visit::Found(code)) => yield Ok(Found { code, path, depth }),
                Ok(Visit::Descend) if depth < max_depth => match children(&path).await {
                    // Reversed, so that the first child is popped first.
                    Ok(children) => stack.extend(children.into_iter().rev().map(|child| (child, depth + 1))),
                    Err(err) => yield Err(err),
                },
                Ok(Visit::Descend | Visit::Skip) => {},
                Err(err) => yield Err(err),
            }
        }
    }
}
