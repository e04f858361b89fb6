//! Resolution of request-supplied paths against a session's authorized root.
//!
//! Every filesystem operation driven by a request path goes through
//! [`confine`]. A path is accepted only if, after resolving `.`, `..` and
//! symlinks, it is the root itself or lies beneath it. The comparison is made
//! on path components, so `/data/foobar` is never mistaken for a child of
//! `/data/foo`.

use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("path escapes the authorized root")]
    OutOfBounds,
    #[error("path not found")]
    NotFound,
    #[error("path is not of the expected kind")]
    WrongKind,
    #[error("filesystem access denied: {0}")]
    Io(#[source] io::Error),
}

impl PathError {
    pub(crate) fn from_io(err: io::Error, path: &Path) -> Self {
        if err.kind() == io::ErrorKind::PermissionDenied {
            Self::Io(err)
        } else {
            debug!("Treating {} as missing: {err}", path.display());
            Self::NotFound
        }
    }
}

/// A canonical path proven to lie within its authorized root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfinedPath {
    root: PathBuf,
    path: PathBuf,
    entry: PathBuf,
}

impl ConfinedPath {
    /// Canonical authorized root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical absolute path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// The directory entry that was named, with its parent resolved but its
    /// final component left as is. For a symlink this is the link, not the
    /// file it points to.
    #[must_use]
    pub fn entry_path(&self) -> &Path {
        &self.entry
    }

    /// Path relative to the root; empty for the root itself.
    #[must_use]
    pub fn relative(&self) -> &Path {
        self.path.strip_prefix(&self.root).unwrap_or(Path::new(""))
    }

    /// Root-relative path with `/` separators.
    #[must_use]
    pub fn relative_slash(&self) -> String {
        slash_path(self.relative())
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path == self.root
    }

    /// Whether an already canonical path lies within this path's root.
    #[must_use]
    pub fn encloses(&self, canonical: &Path) -> bool {
        canonical.starts_with(&self.root)
    }

    /// Require the path to be a regular file.
    ///
    /// # Errors
    /// `PathError::WrongKind` if it is something else, `NotFound` if it has vanished.
    pub fn require_file(self) -> Result<Self, PathError> {
        let metadata =
            fs::metadata(&self.path).map_err(|e| PathError::from_io(e, &self.path))?;
        if metadata.is_file() {
            Ok(self)
        } else {
            Err(PathError::WrongKind)
        }
    }

    /// Require the path to be a directory.
    ///
    /// # Errors
    /// `PathError::WrongKind` if it is something else, `NotFound` if it has vanished.
    pub fn require_dir(self) -> Result<Self, PathError> {
        let metadata =
            fs::metadata(&self.path).map_err(|e| PathError::from_io(e, &self.path))?;
        if metadata.is_dir() {
            Ok(self)
        } else {
            Err(PathError::WrongKind)
        }
    }
}

/// Join `path` components with `/`, skipping anything that is not a plain name.
#[must_use]
pub fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve `relative` against `authorized_root`.
///
/// # Errors
/// - `PathError::OutOfBounds` if the path leaves the root, lexically or
///   through a symlink;
/// - `PathError::NotFound` if the root or the target does not exist;
/// - `PathError::Io` if access is denied while resolving.
pub fn confine(authorized_root: &Path, relative: &str) -> Result<ConfinedPath, PathError> {
    let root =
        fs::canonicalize(authorized_root).map_err(|e| PathError::from_io(e, authorized_root))?;

    let candidate = join_within(&root, Path::new(relative))?;

    let path = fs::canonicalize(&candidate).map_err(|e| PathError::from_io(e, &candidate))?;

    if !path.starts_with(&root) {
        debug!(
            "{} resolves outside {}",
            candidate.display(),
            root.display()
        );
        return Err(PathError::OutOfBounds);
    }

    let entry = match (candidate.parent(), candidate.file_name()) {
        (Some(parent), Some(name)) if candidate != root => {
            let parent = fs::canonicalize(parent).map_err(|e| PathError::from_io(e, parent))?;
            if !parent.starts_with(&root) {
                debug!(
                    "{} is reached through a directory outside {}",
                    candidate.display(),
                    root.display()
                );
                return Err(PathError::OutOfBounds);
            }
            parent.join(name)
        }
        _ => root.clone(),
    };

    Ok(ConfinedPath { root, path, entry })
}

/// Lexically join `relative` onto `root`, refusing any step above the root.
fn join_within(root: &Path, relative: &Path) -> Result<PathBuf, PathError> {
    let mut joined = root.to_path_buf();
    let mut depth = 0usize;

    for component in relative.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => {
                joined.push(part);
                depth += 1;
            }
            Component::ParentDir => {
                if depth == 0 {
                    return Err(PathError::OutOfBounds);
                }
                joined.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return Err(PathError::OutOfBounds),
        }
    }

    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        root: PathBuf,
        sibling: PathBuf,
    }

    // <tmp>/photos/{a.png, trips/b.jpg} and a sibling <tmp>/photos-private/secret.png
    fn fixture() -> io::Result<Fixture> {
        let dir = TempDir::new()?;
        let root = dir.path().join("photos");
        fs::create_dir_all(root.join("trips"))?;
        fs::write(root.join("a.png"), b"a")?;
        fs::write(root.join("trips").join("b.jpg"), b"b")?;

        let sibling = dir.path().join("photos-private");
        fs::create_dir_all(&sibling)?;
        fs::write(sibling.join("secret.png"), b"s")?;

        Ok(Fixture {
            _dir: dir,
            root,
            sibling,
        })
    }

    #[test]
    fn dot_is_the_root_itself() -> Result<(), Box<dyn std::error::Error>> {
        let fx = fixture()?;
        let confined = confine(&fx.root, ".")?;
        assert_eq!(confined.as_path(), fs::canonicalize(&fx.root)?);
        assert!(confined.is_root());
        assert_eq!(confined.relative_slash(), "");

        let empty = confine(&fx.root, "")?;
        assert!(empty.is_root());
        Ok(())
    }

    #[test]
    fn nested_paths_resolve() -> Result<(), Box<dyn std::error::Error>> {
        let fx = fixture()?;
        let confined = confine(&fx.root, "trips/b.jpg")?;
        assert_eq!(confined.relative_slash(), "trips/b.jpg");

        let normalized = confine(&fx.root, "trips/../a.png")?;
        assert_eq!(normalized.relative_slash(), "a.png");
        Ok(())
    }

    #[test]
    fn parent_traversal_is_out_of_bounds() -> io::Result<()> {
        let fx = fixture()?;
        for rel in ["../../etc/passwd", "..", "trips/../../photos-private/secret.png"] {
            assert!(
                matches!(confine(&fx.root, rel), Err(PathError::OutOfBounds)),
                "{rel} should be rejected"
            );
        }
        Ok(())
    }

    #[test]
    fn traversal_to_missing_path_does_not_reveal_existence() -> io::Result<()> {
        let fx = fixture()?;
        assert!(matches!(
            confine(&fx.root, "../does-not-exist"),
            Err(PathError::OutOfBounds)
        ));
        Ok(())
    }

    #[test]
    fn absolute_paths_are_out_of_bounds() -> io::Result<()> {
        let fx = fixture()?;
        let inside = fx.root.join("a.png");
        let inside = inside.to_string_lossy();
        assert!(matches!(
            confine(&fx.root, &inside),
            Err(PathError::OutOfBounds)
        ));
        assert!(matches!(
            confine(&fx.root, "/etc/passwd"),
            Err(PathError::OutOfBounds)
        ));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn symlink_to_sibling_with_shared_prefix_is_out_of_bounds() -> io::Result<()> {
        let fx = fixture()?;
        std::os::unix::fs::symlink(&fx.sibling, fx.root.join("shortcut"))?;

        assert!(matches!(
            confine(&fx.root, "shortcut/secret.png"),
            Err(PathError::OutOfBounds)
        ));
        assert!(matches!(
            confine(&fx.root, "shortcut"),
            Err(PathError::OutOfBounds)
        ));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn symlink_within_root_is_allowed() -> Result<(), Box<dyn std::error::Error>> {
        let fx = fixture()?;
        std::os::unix::fs::symlink(fx.root.join("trips"), fx.root.join("latest"))?;

        let confined = confine(&fx.root, "latest/b.jpg")?;
        assert_eq!(confined.relative_slash(), "trips/b.jpg");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_file_keeps_its_own_entry() -> Result<(), Box<dyn std::error::Error>> {
        let fx = fixture()?;
        std::os::unix::fs::symlink(fx.root.join("a.png"), fx.root.join("c.png"))?;

        let confined = confine(&fx.root, "c.png")?.require_file()?;
        assert_eq!(confined.relative_slash(), "a.png");
        assert_eq!(confined.entry_path(), fs::canonicalize(&fx.root)?.join("c.png"));
        assert!(fs::symlink_metadata(confined.entry_path())?.file_type().is_symlink());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn entry_reached_through_outside_directory_is_out_of_bounds() -> io::Result<()> {
        let fx = fixture()?;
        std::os::unix::fs::symlink(fx.root.join("a.png"), fx.sibling.join("back.png"))?;
        std::os::unix::fs::symlink(&fx.sibling, fx.root.join("shortcut"))?;

        assert!(matches!(
            confine(&fx.root, "shortcut/back.png"),
            Err(PathError::OutOfBounds)
        ));
        Ok(())
    }

    #[test]
    fn entry_of_plain_paths_matches_the_canonical_path() -> Result<(), Box<dyn std::error::Error>> {
        let fx = fixture()?;
        let file = confine(&fx.root, "trips/b.jpg")?;
        assert_eq!(file.entry_path(), file.as_path());
        let root = confine(&fx.root, ".")?;
        assert_eq!(root.entry_path(), root.root());
        Ok(())
    }

    #[test]
    fn missing_paths_are_not_found() -> io::Result<()> {
        let fx = fixture()?;
        assert!(matches!(
            confine(&fx.root, "nope.png"),
            Err(PathError::NotFound)
        ));
        assert!(matches!(
            confine(&fx.root.join("gone"), "."),
            Err(PathError::NotFound)
        ));
        Ok(())
    }

    #[test]
    fn kind_checks() -> Result<(), Box<dyn std::error::Error>> {
        let fx = fixture()?;
        assert!(confine(&fx.root, "a.png")?.require_file().is_ok());
        assert!(confine(&fx.root, "trips")?.require_dir().is_ok());
        assert!(matches!(
            confine(&fx.root, "trips")?.require_file(),
            Err(PathError::WrongKind)
        ));
        assert!(matches!(
            confine(&fx.root, "a.png")?.require_dir(),
            Err(PathError::WrongKind)
        ));
        Ok(())
    }

    #[test]
    fn slash_path_skips_non_names() {
        assert_eq!(slash_path(Path::new("a/./b/c.png")), "a/b/c.png");
        assert_eq!(slash_path(Path::new("")), "");
    }
}
