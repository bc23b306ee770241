//! File metadata used to date backups that arrive without a timestamp.

use chrono::{DateTime, Local, NaiveDateTime, Timelike};
use std::fs;
use std::path::Path;

/// Size and local modification time of an archive file
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// File size in bytes
    pub size: u64,

    /// Last modified time in the local time zone, truncated to the minute
    pub modified: NaiveDateTime,
}

impl FileMetadata {
    /// Extract metadata from a file path
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = fs::metadata(path)?;
        let modified: DateTime<Local> = metadata.modified()?.into();

        Ok(Self {
            size: metadata.len(),
            modified: truncate_to_minute(modified.naive_local()),
        })
    }
}

/// Drop seconds and sub-second precision.
pub fn truncate_to_minute(time: NaiveDateTime) -> NaiveDateTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use std::io::Write;
    use std::time::SystemTime;
    use tempfile::NamedTempFile;

    #[test]
    fn test_extract_metadata() -> std::io::Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(b"test content")?;
        temp_file.flush()?;

        let metadata = FileMetadata::from_path(temp_file.path())?;

        assert_eq!(metadata.size, 12);
        assert_eq!(metadata.modified.second(), 0);
        assert_eq!(metadata.modified.nanosecond(), 0);

        Ok(())
    }

    #[test]
    fn test_modified_is_local_minute() -> std::io::Result<()> {
        let temp_file = NamedTempFile::new()?;
        let when = NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(23, 41, 37))
            .unwrap();
        let local = Local.from_local_datetime(&when).earliest().unwrap();
        temp_file.as_file().set_modified(SystemTime::from(local))?;

        let metadata = FileMetadata::from_path(temp_file.path())?;
        assert_eq!(
            metadata.modified,
            NaiveDate::from_ymd_opt(2024, 3, 9)
                .and_then(|d| d.and_hms_opt(23, 41, 0))
                .unwrap()
        );

        Ok(())
    }
}
