//! The move/delete/mkdir primitives the rotation engine runs on.
//!
//! Everything that changes the archive tree goes through [`ArchiveStore`], so
//! a run can be rehearsed with [`DryRunStore`] without touching disk.

use crate::utils::{Result, RotateError};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Mutating filesystem capability used by intake and rotation
pub trait ArchiveStore {
    /// Create `path` and any missing parents
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Move a file, replacing `to` if it exists
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Delete a file
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// Applies every operation to the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl ArchiveStore for LocalStore {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// Accepts every operation and changes nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunStore;

impl ArchiveStore for DryRunStore {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        debug!(path = %path.display(), "dry-run: skipping mkdir");
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        debug!(from = %from.display(), to = %to.display(), "dry-run: skipping move");
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        debug!(path = %path.display(), "dry-run: skipping delete");
        Ok(())
    }
}

/// Create a directory (and parents), mapping failure to `CreateDirectory`.
pub fn ensure_dir(store: &dyn ArchiveStore, dir: &Path) -> Result<()> {
    store
        .create_dir_all(dir)
        .map_err(|source| RotateError::CreateDirectory {
            path: dir.to_path_buf(),
            source,
        })
}

/// Move `from` to `to`, mapping failure to `Relocation`.
pub fn relocate(store: &dyn ArchiveStore, from: &Path, to: &Path) -> Result<()> {
    store
        .rename(from, to)
        .map_err(|source| RotateError::Relocation {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
}

/// Delete a backup file, mapping failure to `Removal`.
pub fn remove(store: &dyn ArchiveStore, path: &Path) -> Result<()> {
    store
        .remove_file(path)
        .map_err(|source| RotateError::Removal {
            path: path.to_path_buf(),
            source,
        })
}
