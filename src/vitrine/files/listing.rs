//! Directory listing and deterministic pagination of image files.

use serde::Serialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;
use tracing::debug;

use super::confine::{slash_path, ConfinedPath};

/// Fixed page size of the gallery view.
pub const ITEMS_PER_PAGE: usize = 50;

/// Extensions listed as images.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

#[derive(Debug, Error)]
pub enum ListError {
    #[error("page numbers start at 1, got {0}")]
    InvalidPage(usize),
    #[error("not a directory")]
    NotADirectory,
    #[error("directory cannot be read: {0}")]
    Io(#[source] io::Error),
}

/// How image extensions are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionCase {
    /// `photo.PNG` is not an image.
    Sensitive,
    /// `photo.PNG` is an image.
    Insensitive,
}

impl ExtensionCase {
    /// Follow the usual filesystem semantics of the build target.
    #[must_use]
    pub const fn platform() -> Self {
        if cfg!(any(windows, target_os = "macos")) {
            Self::Insensitive
        } else {
            Self::Sensitive
        }
    }

    #[must_use]
    pub fn is_image(self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        match self {
            Self::Sensitive => IMAGE_EXTENSIONS.contains(&ext),
            Self::Insensitive => IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext)),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sensitive => "sensitive",
            Self::Insensitive => "insensitive",
        }
    }
}

impl Default for ExtensionCase {
    fn default() -> Self {
        Self::platform()
    }
}

impl FromStr for ExtensionCase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sensitive" => Ok(Self::Sensitive),
            "insensitive" => Ok(Self::Insensitive),
            other => Err(format!(
                "invalid extension case '{other}', expected sensitive or insensitive"
            )),
        }
    }
}

/// One page of a directory's images plus its subfolders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Immediate subfolder names, sorted.
    pub subfolders: Vec<String>,
    /// Root-relative, `/`-separated image paths on this page, sorted.
    pub items: Vec<String>,
    pub page_number: usize,
    pub items_per_page: usize,
    /// Number of images in the whole directory.
    pub total: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Page {
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.items_per_page.max(1))
    }
}

/// A slice of a sorted sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice<T> {
    pub items: Vec<T>,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Cut page `page_number` (1-based) of `per_page` items out of `items`.
///
/// Pages past the end are empty rather than an error.
///
/// # Errors
/// `ListError::InvalidPage` if `page_number` is 0.
pub fn paginate<T: Clone>(
    items: &[T],
    page_number: usize,
    per_page: usize,
) -> Result<Slice<T>, ListError> {
    if page_number < 1 {
        return Err(ListError::InvalidPage(page_number));
    }

    let start = (page_number - 1).saturating_mul(per_page);
    let end = start.saturating_add(per_page);
    let total = items.len();

    let page_items = if start < total {
        items[start..end.min(total)].to_vec()
    } else {
        Vec::new()
    };

    Ok(Slice {
        items: page_items,
        has_next: end < total,
        has_prev: page_number > 1,
    })
}

/// List page `page_number` of the images in `dir`.
///
/// # Errors
/// `ListError::InvalidPage` for page 0, `ListError::NotADirectory` if `dir`
/// is no longer a directory, `ListError::Io` if it cannot be read.
pub fn list_page(
    dir: &ConfinedPath,
    page_number: usize,
    case: ExtensionCase,
) -> Result<Page, ListError> {
    if page_number < 1 {
        return Err(ListError::InvalidPage(page_number));
    }

    let mut subfolders = Vec::new();
    let mut images = Vec::new();
    for entry in read_entries(dir)? {
        if entry.is_dir {
            subfolders.push(entry.name);
        } else if case.is_image(&entry.path) {
            images.push(slash_path(&dir.relative().join(&entry.name)));
        }
    }
    subfolders.sort();
    images.sort();

    let slice = paginate(&images, page_number, ITEMS_PER_PAGE)?;

    Ok(Page {
        subfolders,
        items: slice.items,
        page_number,
        items_per_page: ITEMS_PER_PAGE,
        total: images.len(),
        has_next: slice.has_next,
        has_prev: slice.has_prev,
    })
}

/// Sorted names of the immediate subfolders of `dir`.
///
/// # Errors
/// Same as [`list_page`], minus the page check.
pub fn list_folders(dir: &ConfinedPath) -> Result<Vec<String>, ListError> {
    let mut folders: Vec<String> = read_entries(dir)?
        .into_iter()
        .filter(|entry| entry.is_dir)
        .map(|entry| entry.name)
        .collect();
    folders.sort();
    Ok(folders)
}

/// A directory or regular file found directly inside a listed directory.
struct Entry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

/// Directories and regular files in `dir`, unsorted. Unreadable entries,
/// non UTF-8 names and symlinks leading out of the root are skipped.
fn read_entries(dir: &ConfinedPath) -> Result<Vec<Entry>, ListError> {
    let path = dir.as_path();
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => return Err(ListError::NotADirectory),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => return Err(ListError::Io(e)),
        Err(e) => {
            debug!("{} vanished before listing: {e}", path.display());
            return Err(ListError::NotADirectory);
        }
    }

    let read_dir = fs::read_dir(path).map_err(|e| {
        if e.kind() == io::ErrorKind::PermissionDenied {
            ListError::Io(e)
        } else {
            ListError::NotADirectory
        }
    })?;

    let mut entries = Vec::new();

    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry in {}: {e}", path.display());
                continue;
            }
        };

        let entry_path = entry.path();
        let Some(name) = entry.file_name().to_str().map(ToString::to_string) else {
            debug!("Skipping non UTF-8 name in {}", path.display());
            continue;
        };

        let Some(target) = resolve_entry(dir, &entry_path, &entry) else {
            continue;
        };

        // Follows symlinks; the target was checked above.
        let Ok(metadata) = fs::metadata(&target) else {
            continue;
        };

        if metadata.is_dir() || metadata.is_file() {
            entries.push(Entry {
                name,
                path: entry_path,
                is_dir: metadata.is_dir(),
            });
        }
    }

    Ok(entries)
}

/// Entry path to inspect, or `None` for symlinks leading out of the root.
fn resolve_entry(dir: &ConfinedPath, entry_path: &Path, entry: &fs::DirEntry) -> Option<PathBuf> {
    let is_symlink = entry.file_type().is_ok_and(|t| t.is_symlink());
    if !is_symlink {
        return Some(entry_path.to_path_buf());
    }

    match fs::canonicalize(entry_path) {
        Ok(target) if dir.encloses(&target) => Some(target),
        Ok(target) => {
            debug!(
                "Skipping {} -> {} outside the root",
                entry_path.display(),
                target.display()
            );
            None
        }
        Err(e) => {
            debug!("Skipping dangling link {}: {e}", entry_path.display());
            None
        }
    }
}
