use rjren_catalog::error::ErrorKind as FetchErrorKind;
use rjren_catalog::models::WorkCode;
use rjren_storage::Action;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use tracing::Level;

/// Per-root tallies, reported by [`RenameEvent::Complete`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Folders renamed, moved or linked.
    pub applied: u64,
    /// Folders already where they belong.
    pub unchanged: u64,
    /// Folders the scanner could not read.
    pub skipped: u64,
    pub failed: u64,
}

/// Everything a rename pass has to say.
///
/// For each root the events are:
/// 1. [`Started`](Self::Started), exactly once.
/// 2. Per discovered folder, [`Discovered`](Self::Discovered) followed by
///    exactly one outcome ([`Applied`](Self::Applied) or one of the failures),
///    and possibly [`CoverFailed`](Self::CoverFailed). Unreadable folders are
///    reported as [`Skipped`](Self::Skipped) instead.
/// 3. [`Aborted`](Self::Aborted) or [`Cancelled`](Self::Cancelled), if the
///    pass ended early.
/// 4. [`Complete`](Self::Complete), exactly once.
///
/// Every per-item event carries the work code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameEvent {
    Started { root: PathBuf },
    Discovered { code: WorkCode, path: PathBuf },
    /// A folder (and everything below it) could not be scanned.
    Skipped { path: PathBuf, reason: String },
    FetchFailed { code: WorkCode, error: FetchErrorKind },
    CompileFailed { code: WorkCode, reason: String },
    Applied { code: WorkCode, action: Action },
    /// The destination is occupied; nothing was changed.
    Collision { code: WorkCode, destination: PathBuf },
    /// The compiled destination is not a valid path below the root.
    Rejected { code: WorkCode, reason: String },
    CoverFailed { code: WorkCode, error: FetchErrorKind },
    /// A filesystem failure ended the pass over this root.
    Aborted { code: WorkCode, reason: String },
    Cancelled { root: PathBuf },
    Complete { root: PathBuf, summary: Summary },
}
impl RenameEvent {
    pub fn level(&self) -> Level {
        match self {
            Self::Started { .. } | Self::Discovered { .. } | Self::Applied { .. } | Self::Complete { .. } => Level::INFO,
            Self::FetchFailed { error, .. } => match error {
                FetchErrorKind::Request(_) | FetchErrorKind::Cache | FetchErrorKind::Write(_) => Level::ERROR,
                _ => Level::WARN,
            },
            Self::Skipped { .. } | Self::Collision { .. } | Self::CoverFailed { .. } | Self::Cancelled { .. } => {
                Level::WARN
            },
            Self::CompileFailed { .. } | Self::Rejected { .. } | Self::Aborted { .. } => Level::ERROR,
        }
    }

    pub fn code(&self) -> Option<&WorkCode> {
        match self {
            Self::Discovered { code, .. }
            | Self::FetchFailed { code, .. }
            | Self::CompileFailed { code, .. }
            | Self::Applied { code, .. }
            | Self::Collision { code, .. }
            | Self::Rejected { code, .. }
            | Self::CoverFailed { code, .. }
            | Self::Aborted { code, .. } => Some(code),
            Self::Started { .. } | Self::Skipped { .. } | Self::Cancelled { .. } | Self::Complete { .. } => None,
        }
    }
}
impl Display for RenameEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if let Some(code) = self.code() {
            write!(f, "[{code}] ")?;
        }
        match self {
            Self::Started { root } => write!(f, "scanning {}", root.display()),
            Self::Discovered { path, .. } => write!(f, "found {}", path.display()),
            Self::Skipped { path, reason } => write!(f, "skipped {}: {reason}", path.display()),
            Self::FetchFailed { error, .. } => write!(f, "metadata lookup failed: {error}"),
            Self::CompileFailed { reason, .. } => write!(f, "{reason}"),
            Self::Applied { action, .. } => write!(f, "{action}"),
            Self::Collision { destination, .. } => write!(f, "destination already exists: {}", destination.display()),
            Self::Rejected { reason, .. } => write!(f, "destination rejected: {reason}"),
            Self::CoverFailed { error, .. } => write!(f, "cover download failed: {error}"),
            Self::Aborted { reason, .. } => write!(f, "aborting this root: {reason}"),
            Self::Cancelled { root } => write!(f, "cancelled while processing {}", root.display()),
            Self::Complete { root, summary } => write!(
                f,
                "finished {}: {} applied, {} unchanged, {} skipped, {} failed",
                root.display(),
                summary.applied,
                summary.unchanged,
                summary.skipped,
                summary.failed
            ),
        }
    }
}
