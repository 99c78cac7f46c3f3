//! The rename pass: scan, fetch, compile, apply.
//!
//! [`Renamer::rename`] walks one root and streams a [`RenameEvent`] for
//! everything that happens. Failures concern only the folder at hand (the
//! pass moves on to the next one), except for filesystem failures that make
//! the rest of the root untrustworthy: those end the pass over that root with
//! [`RenameEvent::Aborted`]. [`Renamer::run_batch`] runs several roots one
//! after the other.

mod event;

pub use self::event::{RenameEvent, Summary};
use crate::scan::{DEFAULT_MAX_DEPTH, Found, scan};
use crate::template::{Mode, NameCompiler};
use async_stream::stream;
use futures::Stream;
use rjren_catalog::models::WorkMetadata;
use rjren_catalog::{CoverArt, MetadataSource};
use rjren_storage::Action;
use rjren_storage::error::{ErrorKind as StorageErrorKind, Result as StorageResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What happens to each folder, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Rename in place.
    Rename,
    /// Move below `root`.
    Move { root: PathBuf },
    /// Leave the folder alone and link to it from below `root`.
    Link { root: PathBuf },
}
impl Operation {
    pub fn mode(&self) -> Mode {
        match self {
            Self::Rename => Mode::Rename,
            Self::Move { .. } => Mode::Move,
            Self::Link { .. } => Mode::Link,
        }
    }

    fn absolute(self) -> Self {
        let absolute = |root: PathBuf| std::path::absolute(&root).unwrap_or(root);
        match self {
            Self::Rename => Self::Rename,
            Self::Move { root } => Self::Move { root: absolute(root) },
            Self::Link { root } => Self::Link { root: absolute(root) },
        }
    }
}

pub struct Renamer<S> {
    source: S,
    compiler: NameCompiler,
    operation: Operation,
    max_depth: usize,
    cover: Option<Arc<dyn CoverArt>>,
}
impl<S: MetadataSource> Renamer<S> {
    pub fn new(source: S, compiler: NameCompiler, operation: Operation) -> Self {
        Self { source, compiler, operation: operation.absolute(), max_depth: DEFAULT_MAX_DEPTH, cover: None }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Place cover artwork in every renamed or moved folder. Linked folders
    /// are never written to.
    pub fn with_cover_art(mut self, cover: Arc<dyn CoverArt>) -> Self {
        self.cover = Some(cover);
        self
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    async fn apply(&self, path: &Path, name: &str) -> StorageResult<Action> {
        match &self.operation {
            Operation::Rename => rjren_storage::rename_in_place(path, name).await,
            Operation::Move { root } => rjren_storage::relocate(path, root, Path::new(name)).await,
            Operation::Link { root } => rjren_storage::link(path, root, Path::new(name)).await,
        }
    }

    fn cover_for<'m>(&self, metadata: &'m WorkMetadata) -> Option<(&dyn CoverArt, &'m str)> {
        let cover = self.cover.as_deref()?;
        if matches!(self.operation, Operation::Link { .. }) || metadata.cover_url.is_empty() {
            return None;
        }
        Some((cover, metadata.cover_url.as_str()))
    }

    /// Streams the events of one pass over `root`.
    ///
    /// Cancellation is checked before each folder; a cancelled pass reports
    /// [`RenameEvent::Cancelled`] and then completes normally.
    pub fn rename<'a>(&'a self, root: &'a Path, cancel: &'a CancellationToken) -> impl Stream<Item = RenameEvent> + 'a {
        stream! {
            yield RenameEvent::Started { root: root.to_path_buf() };
            let mode = self.operation.mode();
            let mut summary = Summary::default();
            for await item in scan(root, self.max_depth) {
                if cancel.is_cancelled() {
                    yield RenameEvent::Cancelled { root: root.to_path_buf() };
                    break;
                }
                let Found { code, path, .. } = match item {
                    Ok(found) => found,
                    Err(err) => {
                        summary.skipped += 1;
                        let path = match &*err {
                            crate::error::ErrorKind::Unreadable(path) => path.clone(),
                            _ => root.to_path_buf(),
                        };
                        yield RenameEvent::Skipped { path, reason: (*err).to_string() };
                        continue;
                    },
                };
                yield RenameEvent::Discovered { code: code.clone(), path: path.clone() };

                let metadata = match self.source.fetch(&code).await {
                    Ok(metadata) => metadata,
                    Err(err) => {
                        summary.failed += 1;
                        yield RenameEvent::FetchFailed { code, error: (*err).clone() };
                        continue;
                    },
                };
                let name = match self.compiler.compile(&metadata, mode) {
                    Ok(name) => name,
                    Err(err) => {
                        summary.failed += 1;
                        yield RenameEvent::CompileFailed { code, reason: (*err).to_string() };
                        continue;
                    },
                };
                let action = match self.apply(&path, &name).await {
                    Ok(action) => action,
                    Err(err) if err.is_fatal() => {
                        summary.failed += 1;
                        yield RenameEvent::Aborted { code, reason: (*err).to_string() };
                        break;
                    },
                    Err(err) => {
                        summary.failed += 1;
                        yield match &*err {
                            StorageErrorKind::AlreadyExists(destination) => {
                                RenameEvent::Collision { code, destination: destination.clone() }
                            },
                            kind => RenameEvent::Rejected { code, reason: kind.to_string() },
                        };
                        continue;
                    },
                };
                match action.is_change() {
                    true => summary.applied += 1,
                    false => summary.unchanged += 1,
                }
                yield RenameEvent::Applied { code: code.clone(), action: action.clone() };

                if let Some((cover, url)) = self.cover_for(&metadata) {
                    if let Err(err) = cover.fetch(&code, url, action.path()).await {
                        yield RenameEvent::CoverFailed { code, error: (*err).clone() };
                    }
                }
            }
            yield RenameEvent::Complete { root: root.to_path_buf(), summary };
        }
    }

    /// Runs [`rename`](Self::rename) over each root in turn. Roots after a
    /// cancellation are not started.
    pub fn run_batch<'a>(
        &'a self,
        roots: &'a [PathBuf],
        cancel: &'a CancellationToken,
    ) -> impl Stream<Item = RenameEvent> + 'a {
        stream! {
            for root in roots {
                if cancel.is_cancelled() {
                    break;
                }
                for await event in self.rename(root, cancel) {
                    yield event;
                }
            }
        }
    }
}
