//! Encoding-tolerant file access over a source tree.

use std::path::{Component, Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

/// Read a file as text, replacing invalid UTF-8 sequences instead of failing.
pub fn read_lossy(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Read `root/name` if it is a regular file; any failure yields `None`.
pub fn read_optional(root: &Path, name: &str) -> Option<String> {
    let path = root.join(name);
    if !path.is_file() {
        return None;
    }
    read_lossy(&path).ok()
}

/// Forward-slash key for `path` relative to `root`.
///
/// Returns `None` when `path` is not under `root` or the remainder contains
/// anything other than plain names.
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// One entry yielded by [`walk_files`].
#[derive(Debug)]
pub enum WalkEntry {
    File { path: PathBuf, key: String },
    /// Symlinks are reported but never followed.
    Symlink { key: String },
    Failed(String),
}

/// Every regular file below `root`, sorted by name for a stable order.
pub fn walk_files(root: &Path) -> impl Iterator<Item = WalkEntry> + '_ {
    walk_files_excluding(root, &[])
}

/// Like [`walk_files`], but never descends into `skip` (paths relative to
/// `root`).
pub fn walk_files_excluding<'a>(
    root: &'a Path,
    skip: &'a [PathBuf],
) -> impl Iterator<Item = WalkEntry> + 'a {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| {
            let skipped = entry
                .path()
                .strip_prefix(root)
                .map(|rel| skip.iter().any(|s| rel == s))
                .unwrap_or(false);
            if skipped {
                debug!(path = %entry.path().display(), "excluded from walk");
            }
            !skipped
        })
        .filter_map(move |entry| match entry {
            Ok(entry) => {
                let file_type = entry.file_type();
                if file_type.is_dir() {
                    return None;
                }
                let key = relative_key(root, entry.path())?;
                if file_type.is_symlink() {
                    debug!(%key, "skipping symlink");
                    return Some(WalkEntry::Symlink { key });
                }
                Some(WalkEntry::File {
                    path: entry.into_path(),
                    key,
                })
            }
            Err(e) => {
                let location = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| root.display().to_string());
                Some(WalkEntry::Failed(format!("Failed to walk {}: {}", location, e)))
            }
        })
}
