//! Retention tiers and where they live on disk.
//!
//! ```text
//! <archives_dir>/
//!   <account>/
//!     hourly/
//!     daily/
//!     weekly/
//! ```

use crate::fs::storage::{ensure_dir, ArchiveStore};
use crate::fs::walker::{list_entries, EntryKind};
use crate::utils::{Result, RotateError};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A stage of the retention pipeline, coarsest last
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Hourly,
    Daily,
    Weekly,
}

impl Tier {
    /// Processing order within one account
    pub const ALL: [Tier; 3] = [Tier::Hourly, Tier::Daily, Tier::Weekly];

    pub fn dir_name(self) -> &'static str {
        match self {
            Tier::Hourly => "hourly",
            Tier::Daily => "daily",
            Tier::Weekly => "weekly",
        }
    }

    /// The tier a promoted backup moves into; weekly backups only expire.
    pub fn next(self) -> Option<Tier> {
        match self {
            Tier::Hourly => Some(Tier::Daily),
            Tier::Daily => Some(Tier::Weekly),
            Tier::Weekly => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Resolves (account, tier) pairs to directories under the archive root
#[derive(Debug, Clone)]
pub struct ArchiveLayout {
    root: PathBuf,
}

impl ArchiveLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn account_dir(&self, account: &str) -> PathBuf {
        self.root.join(account)
    }

    pub fn tier_dir(&self, account: &str, tier: Tier) -> PathBuf {
        self.account_dir(account).join(tier.dir_name())
    }

    /// Create the archive root if it does not exist yet.
    pub fn ensure_root(&self, store: &dyn ArchiveStore) -> Result<()> {
        if self.root.is_dir() {
            return Ok(());
        }
        store
            .create_dir_all(&self.root)
            .map_err(|source| RotateError::ArchiveRootUncreatable {
                path: self.root.clone(),
                source,
            })
    }

    /// Create (if needed) and return a tier directory.
    pub fn ensure_tier_dir(
        &self,
        store: &dyn ArchiveStore,
        account: &str,
        tier: Tier,
    ) -> Result<PathBuf> {
        let dir = self.tier_dir(account, tier);
        ensure_dir(store, &dir)?;
        Ok(dir)
    }

    /// Every account known to the archive: one per subdirectory of the root,
    /// in name order. A missing root has no accounts.
    pub fn accounts(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut accounts = Vec::new();
        for dir in list_entries(&self.root, EntryKind::Directories)? {
            match dir.file_name().and_then(|n| n.to_str()) {
                Some(name) => accounts.push(name.to_string()),
                None => warn!(path = %dir.display(), "Skipping account directory with a non UTF-8 name"),
            }
        }
        Ok(accounts)
    }
}
