//! Rename, move and link operations on folders.
//!
//! All three share the same contract: the destination is checked before
//! anything is touched, an occupied destination fails with
//! [`ErrorKind::AlreadyExists`] and is left exactly as it was, and a
//! destination that is already the source is reported as
//! [`Action::AlreadyCorrect`].

use crate::error::{ErrorKind, Result, map_io_error};
use crate::models::Action;
use crate::path::validate as validate_path;
use exn::OptionExt;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::instrument;

/// Whether anything (including a dangling symlink) occupies `path`.
async fn occupied(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path).await {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(map_io_error(err, path).into()),
    }
}

/// Whether two existing paths resolve to the same file.
///
/// Case-insensitive filesystems report a case-only rename target as
/// occupied by the source itself.
async fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a).await, fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Rename `source` in place to `name`, keeping it in the same parent folder.
///
/// `name` must be a single path component.
#[instrument(skip(source), fields(source = %source.display()))]
pub async fn rename_in_place(source: &Path, name: &str) -> Result<Action> {
    let mut components = Path::new(name).components();
    let (Some(Component::Normal(_)), None) = (components.next(), components.next()) else {
        exn::bail!(ErrorKind::InvalidPath(PathBuf::from(name)));
    };
    let parent = source.parent().ok_or_raise(|| ErrorKind::InvalidPath(source.to_path_buf()))?;
    let destination = parent.join(name);
    if destination == source {
        return Ok(Action::AlreadyCorrect(destination));
    }
    if occupied(&destination).await? && !same_file(source, &destination).await {
        exn::bail!(ErrorKind::AlreadyExists(destination));
    }
    fs::rename(source, &destination).await.map_err(|e| map_io_error(e, source))?;
    tracing::debug!(destination = %destination.display(), "renamed");
    Ok(Action::Renamed(destination))
}

/// Move `source` to `root/relative`, creating intermediate folders.
///
/// Moves across filesystems fall back to copying then deleting the source; a
/// failed copy removes the partial destination and leaves the source intact.
#[instrument(skip(source, root), fields(source = %source.display(), root = %root.display()))]
pub async fn relocate(source: &Path, root: &Path, relative: &Path) -> Result<Action> {
    let destination = root.join(validate_path(relative)?);
    if destination == source {
        return Ok(Action::AlreadyCorrect(destination));
    }
    if destination.starts_with(source) {
        exn::bail!(ErrorKind::InvalidPath(destination));
    }
    if occupied(&destination).await? {
        exn::bail!(ErrorKind::AlreadyExists(destination));
    }
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).await.map_err(|e| map_io_error(e, parent))?;
    }
    match fs::rename(source, &destination).await {
        Ok(()) => {},
        Err(err) if err.kind() == std::io::ErrorKind::CrossesDevices => {
            tracing::debug!("destination is on another filesystem; copying");
            move_across(source, &destination).await?;
        },
        Err(err) => exn::bail!(map_io_error(err, source)),
    }
    tracing::debug!(destination = %destination.display(), "moved");
    Ok(Action::Moved(destination))
}

/// Create a symbolic link at `root/relative/<name of source>` pointing at
/// `source`.
///
/// Linking again is a no-op, a stale link is replaced, and anything else at
/// the destination is never removed.
#[instrument(skip(source, root), fields(source = %source.display(), root = %root.display()))]
pub async fn link(source: &Path, root: &Path, relative: &Path) -> Result<Action> {
    let name = source.file_name().ok_or_raise(|| ErrorKind::InvalidPath(source.to_path_buf()))?;
    let folder = root.join(validate_path(relative)?);
    let destination = folder.join(name);
    match fs::symlink_metadata(&destination).await {
        Ok(metadata) if metadata.is_symlink() => {
            let target = fs::read_link(&destination).await.map_err(|e| map_io_error(e, &destination))?;
            if target == source || same_file(&destination, source).await {
                return Ok(Action::AlreadyCorrect(destination));
            }
            tracing::debug!(stale = %target.display(), "replacing stale link");
            remove_link(&destination).await?;
        },
        Ok(_) => exn::bail!(ErrorKind::AlreadyExists(destination)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            fs::create_dir_all(&folder).await.map_err(|e| map_io_error(e, &folder))?;
        },
        Err(err) => exn::bail!(map_io_error(err, &destination)),
    }
    symlink(source, &destination).await?;
    tracing::debug!(destination = %destination.display(), "linked");
    Ok(Action::Linked(destination))
}

#[cfg(unix)]
async fn symlink(source: &Path, destination: &Path) -> Result<()> {
    Ok(fs::symlink(source, destination).await.map_err(|e| map_io_error(e, destination))?)
}

#[cfg(windows)]
async fn symlink(source: &Path, destination: &Path) -> Result<()> {
    let created = match fs::metadata(source).await {
        Ok(metadata) if metadata.is_dir() => fs::symlink_dir(source, destination).await,
        _ => fs::symlink_file(source, destination).await,
    };
    Ok(created.map_err(|e| map_io_error(e, destination))?)
}

#[cfg(unix)]
async fn remove_link(path: &Path) -> Result<()> {
    Ok(fs::remove_file(path).await.map_err(|e| map_io_error(e, path))?)
}

#[cfg(windows)]
async fn remove_link(path: &Path) -> Result<()> {
    // Directory links are removed as directories on Windows.
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(_) => Ok(fs::remove_dir(path).await.map_err(|e| map_io_error(e, path))?),
    }
}

/// Copy `source` to `destination`, then delete the source.
///
/// The destination is claimed atomically before anything is copied, so an
/// occupant that appeared since the last check fails with
/// [`ErrorKind::AlreadyExists`] and is never touched. A failed copy removes
/// only what this call created.
async fn move_across(source: &Path, destination: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(source).await.map_err(|e| map_io_error(e, source))?;
    if !metadata.is_dir() {
        copy_file(source, destination).await?;
        return Ok(fs::remove_file(source).await.map_err(|e| map_io_error(e, source))?);
    }
    fs::create_dir(destination).await.map_err(|e| map_io_error(e, destination))?;
    if let Err(err) = copy_contents(source, destination).await {
        if let Err(cleanup) = fs::remove_dir_all(destination).await {
            tracing::warn!(error = %cleanup, destination = %destination.display(), "could not remove partial copy");
        }
        return Err(err);
    }
    Ok(fs::remove_dir_all(source).await.map_err(|e| map_io_error(e, source))?)
}

/// Copy a single file to `destination`, which must not exist.
async fn copy_file(source: &Path, destination: &Path) -> Result<()> {
    let mut from = fs::File::open(source).await.map_err(|e| map_io_error(e, source))?;
    let mut to = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
        .await
        .map_err(|e| map_io_error(e, destination))?;
    let copied = match tokio::io::copy(&mut from, &mut to).await {
        Ok(_) => to.sync_all().await,
        Err(err) => Err(err),
    };
    if let Err(err) = copied {
        drop(to);
        if let Err(cleanup) = fs::remove_file(destination).await {
            tracing::warn!(error = %cleanup, destination = %destination.display(), "could not remove partial copy");
        }
        exn::bail!(map_io_error(err, destination));
    }
    Ok(())
}

/// Copy everything inside `source` into the existing, freshly created
/// `destination`. Symbolic links are recreated, not followed.
async fn copy_contents(source: &Path, destination: &Path) -> Result<()> {
    let mut stack: Vec<(PathBuf, PathBuf)> = vec![(source.to_path_buf(), destination.to_path_buf())];
    while let Some((from, to)) = stack.pop() {
        let mut entries = fs::read_dir(&from).await.map_err(|e| map_io_error(e, &from))?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| map_io_error(e, &from))? {
            let path = entry.path();
            let target = to.join(entry.file_name());
            let kind = entry.file_type().await.map_err(|e| map_io_error(e, &path))?;
            if kind.is_dir() {
                fs::create_dir(&target).await.map_err(|e| map_io_error(e, &target))?;
                stack.push((path, target));
            } else if kind.is_symlink() {
                let link_target = fs::read_link(&path).await.map_err(|e| map_io_error(e, &path))?;
                symlink(&link_target, &target).await?;
            } else {
                copy_file(&path, &target).await?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as sync;

    fn folder(parent: &Path, name: &str) -> PathBuf {
        let path = parent.join(name);
        sync::create_dir_all(&path).unwrap();
        sync::write(path.join("track01.mp3"), b"audio").unwrap();
        path
    }

    #[tokio::test]
    async fn test_rename_in_place() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = folder(temp_dir.path(), "RJ123456");

        let action = rename_in_place(&source, "[Circle][RJ123456] Title").await.unwrap();
        let expected = temp_dir.path().join("[Circle][RJ123456] Title");
        assert_eq!(action, Action::Renamed(expected.clone()));
        assert!(!source.exists());
        assert_eq!(sync::read(expected.join("track01.mp3")).unwrap(), b"audio");
    }

    #[tokio::test]
    async fn test_rename_same_name_is_already_correct() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = folder(temp_dir.path(), "RJ123456 Title");

        let action = rename_in_place(&source, "RJ123456 Title").await.unwrap();
        assert_eq!(action, Action::AlreadyCorrect(source.clone()));
        assert!(!action.is_change());
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_rename_onto_existing_sibling() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = folder(temp_dir.path(), "RJ123456");
        let occupant = folder(temp_dir.path(), "Taken");

        let err = rename_in_place(&source, "Taken").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(path) if path == &occupant));
        assert!(!err.is_fatal());
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_rename_rejects_nested_name() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = folder(temp_dir.path(), "RJ123456");

        let err = rename_in_place(&source, "a/b").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
        let err = rename_in_place(&source, "..").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[tokio::test]
    async fn test_rename_missing_source_is_fatal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = rename_in_place(&temp_dir.path().join("gone"), "new").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_relocate_creates_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = folder(&temp_dir.path().join("in"), "RJ123456");
        let root = temp_dir.path().join("out");

        let action = relocate(&source, &root, Path::new("Circle/R18[RJ123456] Title")).await.unwrap();
        let expected = root.join("Circle").join("R18[RJ123456] Title");
        assert_eq!(action, Action::Moved(expected.clone()));
        assert!(!source.exists());
        assert!(expected.join("track01.mp3").exists());
    }

    #[tokio::test]
    async fn test_relocate_never_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = folder(&temp_dir.path().join("in"), "RJ123456");
        let root = temp_dir.path().join("out");
        let occupant = folder(&root.join("Circle"), "Title");

        let err = relocate(&source, &root, Path::new("Circle/Title")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(path) if path == &occupant));
        assert!(source.join("track01.mp3").exists());
        assert!(occupant.join("track01.mp3").exists());
    }

    #[tokio::test]
    async fn test_relocate_rejects_escaping_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = folder(temp_dir.path(), "RJ123456");
        let root = temp_dir.path().join("out");

        let err = relocate(&source, &root, Path::new("../escaped")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
        assert!(!err.is_fatal());
        assert!(source.exists());
        assert!(!temp_dir.path().join("escaped").exists());
    }

    #[tokio::test]
    async fn test_relocate_into_itself_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = folder(temp_dir.path(), "RJ123456");

        let err = relocate(&source, temp_dir.path(), Path::new("RJ123456/nested")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[tokio::test]
    async fn test_move_across() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = folder(temp_dir.path(), "RJ123456");
        folder(&source, "extras");
        let destination = temp_dir.path().join("moved");

        move_across(&source, &destination).await.unwrap();
        assert_eq!(sync::read(destination.join("track01.mp3")).unwrap(), b"audio");
        assert_eq!(sync::read(destination.join("extras").join("track01.mp3")).unwrap(), b"audio");
        assert!(!source.exists());
    }

    #[tokio::test]
    async fn test_move_across_leaves_a_late_occupant_alone() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = folder(temp_dir.path(), "RJ123456");
        let destination = temp_dir.path().join("moved");
        sync::create_dir(&destination).unwrap();
        sync::write(destination.join("theirs.txt"), b"keep").unwrap();

        let err = move_across(&source, &destination).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(_)));
        assert_eq!(sync::read(destination.join("theirs.txt")).unwrap(), b"keep");
        assert!(!destination.join("track01.mp3").exists());
        assert!(source.join("track01.mp3").exists());
    }

    #[tokio::test]
    async fn test_move_across_never_overwrites_a_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("RJ123456.zip");
        let destination = temp_dir.path().join("moved.zip");
        sync::write(&source, b"ours").unwrap();
        sync::write(&destination, b"theirs").unwrap();

        let err = move_across(&source, &destination).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(_)));
        assert_eq!(sync::read(&destination).unwrap(), b"theirs");
        assert_eq!(sync::read(&source).unwrap(), b"ours");

        sync::remove_file(&destination).unwrap();
        move_across(&source, &destination).await.unwrap();
        assert_eq!(sync::read(&destination).unwrap(), b"ours");
        assert!(!source.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_link_twice_is_untouched() {
        use std::os::unix::fs::MetadataExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let source = folder(&temp_dir.path().join("in"), "RJ123456");
        let root = temp_dir.path().join("links");

        let action = link(&source, &root, Path::new("Circle/Title")).await.unwrap();
        let destination = root.join("Circle").join("Title").join("RJ123456");
        assert_eq!(action, Action::Linked(destination.clone()));
        let inode = sync::symlink_metadata(&destination).unwrap().ino();

        let action = link(&source, &root, Path::new("Circle/Title")).await.unwrap();
        assert_eq!(action, Action::AlreadyCorrect(destination.clone()));
        assert_eq!(sync::symlink_metadata(&destination).unwrap().ino(), inode);
        assert_eq!(sync::read_link(&destination).unwrap(), source);
        // The source never moves.
        assert!(source.join("track01.mp3").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_link_replaces_stale_link() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = folder(&temp_dir.path().join("in"), "RJ123456");
        let root = temp_dir.path().join("links");
        let destination = root.join("Title").join("RJ123456");
        sync::create_dir_all(destination.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(temp_dir.path().join("vanished"), &destination).unwrap();

        let action = link(&source, &root, Path::new("Title")).await.unwrap();
        assert_eq!(action, Action::Linked(destination.clone()));
        assert_eq!(sync::read_link(&destination).unwrap(), source);
    }

    #[tokio::test]
    async fn test_link_onto_real_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = folder(&temp_dir.path().join("in"), "RJ123456");
        let root = temp_dir.path().join("links");
        let occupant = folder(&root.join("Title"), "RJ123456");

        let err = link(&source, &root, Path::new("Title")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(path) if path == &occupant));
        assert!(occupant.join("track01.mp3").exists());
        assert!(!sync::symlink_metadata(&occupant).unwrap().is_symlink());
    }
}
