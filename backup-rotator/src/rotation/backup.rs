//! One archive file with its identity decoded from the file name.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// A backup archive.
///
/// `account` and `created_at` never change once decoded; moving the file
/// between tiers does not alter them. Records have no natural order;
/// sort them with [`Backup::by_created_at`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Backup {
    account: String,
    created_at: NaiveDateTime,
    path: PathBuf,
}

impl Backup {
    pub fn new(account: impl Into<String>, created_at: NaiveDateTime, path: impl Into<PathBuf>) -> Self {
        Self {
            account: account.into(),
            created_at,
            path: path.into(),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// Local time, minute precision
    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The canonical file name. Records only come out of the codec, which
    /// guarantees a UTF-8 name.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    pub fn age(&self, now: NaiveDateTime) -> Duration {
        now - self.created_at
    }

    /// Comparator for sorting by creation time.
    pub fn by_created_at(a: &Backup, b: &Backup) -> Ordering {
        a.created_at.cmp(&b.created_at)
    }
}

/// Sort oldest first; equal timestamps keep their discovery order.
pub fn sort_by_created_at(backups: &mut [Backup]) {
    backups.sort_by(Backup::by_created_at);
}
