use derive_more::Display;
use std::path::{Path, PathBuf};

/// What an operation did, with the path the folder is now reachable at.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum Action {
    #[display("renamed to {}", _0.display())]
    Renamed(PathBuf),
    #[display("moved to {}", _0.display())]
    Moved(PathBuf),
    #[display("linked at {}", _0.display())]
    Linked(PathBuf),
    /// The destination already matched; nothing was touched.
    #[display("already at {}", _0.display())]
    AlreadyCorrect(PathBuf),
}
impl Action {
    pub fn path(&self) -> &Path {
        match self {
            Self::Renamed(path) | Self::Moved(path) | Self::Linked(path) | Self::AlreadyCorrect(path) => path,
        }
    }

    /// Whether anything changed on disk.
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::AlreadyCorrect(_))
    }
}
