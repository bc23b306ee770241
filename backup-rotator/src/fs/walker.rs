//! Single-level directory listing for the inbox, archive root and tier
//! directories.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Which kind of entries a listing keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular files, including symlinks that resolve to a regular file
    Files,

    /// Directories (symlinks are not followed)
    Directories,
}

/// List the immediate children of `dir`, sorted by file name.
///
/// # Arguments
/// * `dir` - Directory to list
/// * `kind` - Keep files or directories
///
/// # Returns
/// * `Ok(Vec<PathBuf>)` - Matching entries in name order
/// * `Err(io::Error)` - If the directory cannot be read
///
/// # Example
/// ```no_run
/// use backup_rotator::fs::walker::{list_entries, EntryKind};
/// use std::path::Path;
///
/// let arrivals = list_entries(Path::new("/var/backups/backups"), EntryKind::Files).unwrap();
/// println!("Found {} arrivals", arrivals.len());
/// ```
pub fn list_entries(dir: &Path, kind: EntryKind) -> std::io::Result<Vec<PathBuf>> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    let mut entries = Vec::new();
    for entry in walker {
        let entry = entry?;
        if matches_kind(&entry, kind) {
            entries.push(entry.into_path());
        }
    }

    Ok(entries)
}

/// Like [`list_entries`] for files, but a missing directory is an empty list.
pub fn list_files_if_present(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    list_entries(dir, EntryKind::Files)
}

fn matches_kind(entry: &DirEntry, kind: EntryKind) -> bool {
    let file_type = entry.file_type();
    match kind {
        EntryKind::Directories => file_type.is_dir(),
        EntryKind::Files if file_type.is_symlink() => std::fs::metadata(entry.path())
            .map(|resolved| resolved.is_file())
            // Broken symlink
            .unwrap_or(false),
        EntryKind::Files => file_type.is_file(),
    }
}
