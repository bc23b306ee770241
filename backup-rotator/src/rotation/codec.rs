//! The `<account>-YYYY-MM-DD-HHMM.<ext>` file name encoding.
//!
//! Every place that needs an account or creation time out of a file name goes
//! through here. Files that arrive without a timestamp are dated from their
//! mtime and renamed in place exactly once; canonical names are never touched
//! again.

use crate::fs::metadata::FileMetadata;
use crate::fs::storage::{relocate, ArchiveStore};
use crate::rotation::backup::Backup;
use crate::utils::{Result, RotateError};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::info;

/// strftime pattern of the embedded timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H%M";

static CANONICAL_STEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<account>.+)-(?P<year>[0-9]{4})-(?P<month>[0-9]{2})-(?P<day>[0-9]{2})-(?P<hour>[0-9]{2})(?P<minute>[0-9]{2})$",
    )
    .unwrap()
});

/// Identity decoded from a canonical file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub account: String,
    pub created_at: NaiveDateTime,
}

/// Split a file name at its first `.` into stem and extension.
pub fn split_name(file_name: &str) -> (&str, Option<&str>) {
    match file_name.split_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (file_name, None),
    }
}

/// Decode a file name.
///
/// Returns `Ok(None)` for names without an embedded timestamp and
/// `MalformedTimestamp` for names that have one which is not a real date.
pub fn parse(file_name: &str) -> Result<Option<ParsedName>> {
    let (stem, _) = split_name(file_name);
    let Some(caps) = CANONICAL_STEM.captures(stem) else {
        return Ok(None);
    };

    let field = |name: &str| -> u32 {
        // The pattern only admits ASCII digits here.
        caps[name].parse().unwrap_or_default()
    };
    let malformed = |reason: &str| RotateError::MalformedTimestamp {
        name: file_name.to_string(),
        reason: reason.to_string(),
    };

    let date = NaiveDate::from_ymd_opt(field("year") as i32, field("month"), field("day"))
        .ok_or_else(|| malformed("no such date"))?;
    let created_at = date
        .and_hms_opt(field("hour"), field("minute"), 0)
        .ok_or_else(|| malformed("no such time of day"))?;

    Ok(Some(ParsedName {
        account: caps["account"].to_string(),
        created_at,
    }))
}

/// Build the canonical file name for a backup.
pub fn canonical_name(account: &str, created_at: NaiveDateTime, ext: Option<&str>) -> String {
    let stamp = created_at.format(TIMESTAMP_FORMAT);
    match ext {
        Some(ext) => format!("{account}-{stamp}.{ext}"),
        None => format!("{account}-{stamp}"),
    }
}

/// Decode the backup at `path`, renaming it to its canonical name first if it
/// has none.
pub fn normalize(store: &dyn ArchiveStore, path: &Path) -> Result<Backup> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| RotateError::MalformedTimestamp {
            name: path.to_string_lossy().into_owned(),
            reason: "file name is not valid UTF-8".to_string(),
        })?;

    if let Some(parsed) = parse(file_name)? {
        return Ok(Backup::new(parsed.account, parsed.created_at, path));
    }

    let modified = FileMetadata::from_path(path)?.modified;
    let (stem, ext) = split_name(file_name);
    let canonical = canonical_name(stem, modified, ext);
    let parsed = parse(&canonical)?.ok_or_else(|| RotateError::MalformedTimestamp {
        name: canonical.clone(),
        reason: "canonical name does not decode".to_string(),
    })?;

    let target = path.with_file_name(&canonical);
    info!(
        account = %parsed.account,
        from = %path.display(),
        to = %target.display(),
        "Renaming backup to its timestamped name"
    );
    relocate(store, path, &target)?;

    Ok(Backup::new(parsed.account, parsed.created_at, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{DryRunStore, LocalStore};
    use chrono::{Local, TimeZone};
    use std::fs;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .unwrap()
    }

    fn set_mtime(path: &Path, when: NaiveDateTime) -> std::io::Result<()> {
        let local = Local.from_local_datetime(&when).earliest().unwrap();
        fs::File::options()
            .write(true)
            .open(path)?
            .set_modified(SystemTime::from(local))
    }

    #[test]
    fn test_parse_canonical() -> Result<()> {
        let parsed = parse("dbdump-2024-01-05-2330.tar.bz2")?.unwrap();
        assert_eq!(parsed.account, "dbdump");
        assert_eq!(parsed.created_at, at(2024, 1, 5, 23, 30));
        Ok(())
    }

    #[test]
    fn test_parse_account_with_hyphens() -> Result<()> {
        let parsed = parse("my-site-db-2023-12-31-0005.sql.gz")?.unwrap();
        assert_eq!(parsed.account, "my-site-db");
        assert_eq!(parsed.created_at, at(2023, 12, 31, 0, 5));
        Ok(())
    }

    #[test]
    fn test_parse_without_timestamp() -> Result<()> {
        assert_eq!(parse("dbdump.tar.bz2")?, None);
        assert_eq!(parse("dbdump-2024-01-05.tar.bz2")?, None);
        assert_eq!(parse("2024-01-05-2330.tar.bz2")?, None);
        Ok(())
    }

    #[test]
    fn test_parse_rejects_impossible_dates() {
        for name in [
            "db-2024-13-01-1200.tar.gz",
            "db-2023-02-29-1200.tar.gz",
            "db-2024-01-01-2400.tar.gz",
            "db-2024-01-01-1260.tar.gz",
        ] {
            assert!(
                matches!(parse(name), Err(RotateError::MalformedTimestamp { .. })),
                "{name} should be malformed"
            );
        }
    }

    #[test]
    fn test_canonical_name_round_trip() -> Result<()> {
        let created_at = at(2024, 2, 29, 7, 4);
        let name = canonical_name("world", created_at, Some("tar.bz2"));
        assert_eq!(name, "world-2024-02-29-0704.tar.bz2");

        let parsed = parse(&name)?.unwrap();
        assert_eq!(parsed.account, "world");
        assert_eq!(parsed.created_at, created_at);

        assert_eq!(canonical_name("world", created_at, None), "world-2024-02-29-0704");
        Ok(())
    }

    #[test]
    fn test_normalize_canonical_is_untouched() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("dbdump-2024-01-05-2330.tar.bz2");
        fs::write(&path, b"dump")?;

        let backup = normalize(&LocalStore, &path)?;

        assert_eq!(backup.account(), "dbdump");
        assert_eq!(backup.created_at(), at(2024, 1, 5, 23, 30));
        assert_eq!(backup.path(), path);
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn test_normalize_renames_from_mtime() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("dbdump.tar.bz2");
        fs::write(&path, b"dump")?;
        set_mtime(&path, at(2024, 6, 1, 14, 7))?;

        let backup = normalize(&LocalStore, &path)?;

        let expected = temp_dir.path().join("dbdump-2024-06-01-1407.tar.bz2");
        assert_eq!(backup.account(), "dbdump");
        assert_eq!(backup.created_at(), at(2024, 6, 1, 14, 7));
        assert_eq!(backup.path(), expected);
        assert!(!path.exists());
        assert!(expected.exists());

        // A second pass sees a canonical name and leaves it alone.
        let again = normalize(&LocalStore, &expected)?;
        assert_eq!(again, backup);
        Ok(())
    }

    #[test]
    fn test_normalize_without_extension() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("snapshot");
        fs::write(&path, b"dump")?;
        set_mtime(&path, at(2024, 6, 1, 14, 7))?;

        let backup = normalize(&LocalStore, &path)?;
        assert_eq!(backup.file_name(), "snapshot-2024-06-01-1407");
        Ok(())
    }

    #[test]
    fn test_normalize_dry_run_reports_target() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("dbdump.tar.bz2");
        fs::write(&path, b"dump")?;
        set_mtime(&path, at(2024, 6, 1, 14, 7))?;

        let backup = normalize(&DryRunStore, &path)?;

        assert_eq!(backup.file_name(), "dbdump-2024-06-01-1407.tar.bz2");
        assert!(path.exists());
        Ok(())
    }
}
