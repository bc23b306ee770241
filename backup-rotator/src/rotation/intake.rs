//! Moves new arrivals from the inbox into their account's hourly tier.

use crate::config::Config;
use crate::fs::storage::{relocate, ArchiveStore};
use crate::fs::walker::{list_entries, EntryKind};
use crate::rotation::codec;
use crate::rotation::tier::{ArchiveLayout, Tier};
use crate::utils::Result;
use tracing::{debug, info};

/// Take in every backup waiting in the configured inbox.
///
/// The inbox must exist; [`Rotator::run`](crate::Rotator::run) checks that
/// before anything is created. It is listed once up front. Files whose names do not end in one of
/// the configured extensions stay where they are. Returns the number of
/// arrivals moved.
pub fn intake_arrivals(
    store: &dyn ArchiveStore,
    config: &Config,
    layout: &ArchiveLayout,
) -> Result<usize> {
    let mut arrivals = 0;
    for path in list_entries(&config.backups_dir, EntryKind::Files)? {
        let file_name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        if !config.is_backup(&file_name) {
            debug!(file = %file_name, "Ignoring inbox file with an unrecognized extension");
            continue;
        }

        let backup = codec::normalize(store, &path)?;
        let target = layout
            .ensure_tier_dir(store, backup.account(), Tier::Hourly)?
            .join(backup.file_name());
        info!(
            account = backup.account(),
            from = %backup.path().display(),
            to = %target.display(),
            "Moving new arrival into hourly"
        );
        relocate(store, backup.path(), &target)?;
        arrivals += 1;
    }

    Ok(arrivals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::LocalStore;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn config(root: &Path) -> Config {
        Config {
            backups_dir: root.join("backups"),
            archives_dir: root.join("archives"),
            backup_extensions: vec![".tar.bz2".to_string(), "tar.gz".to_string()],
            ..Config::default()
        }
    }

    #[test]
    fn test_intake_moves_matching_files() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = config(temp_dir.path());
        let inbox = config.backups_dir.clone();
        let layout = ArchiveLayout::new(&config.archives_dir);
        fs::create_dir(&inbox)?;
        fs::write(inbox.join("dbdump.tar.bz2"), b"dump")?;
        fs::write(inbox.join("world-2024-01-05-2330.tar.gz"), b"world")?;
        fs::write(inbox.join("notes.txt"), b"keep me")?;

        let moved = intake_arrivals(&LocalStore, &config, &layout)?;

        assert_eq!(moved, 2);
        assert!(layout
            .tier_dir("world", Tier::Hourly)
            .join("world-2024-01-05-2330.tar.gz")
            .exists());
        let hourly: Vec<_> = fs::read_dir(layout.tier_dir("dbdump", Tier::Hourly))?
            .collect::<std::io::Result<_>>()?;
        assert_eq!(hourly.len(), 1);

        let left: Vec<_> = fs::read_dir(&inbox)?
            .map(|e| e.map(|e| e.file_name()))
            .collect::<std::io::Result<_>>()?;
        assert_eq!(left, vec![std::ffi::OsString::from("notes.txt")]);
        Ok(())
    }

    #[test]
    fn test_intake_leaves_subdirectories() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = config(temp_dir.path());
        let inbox = config.backups_dir.clone();
        let layout = ArchiveLayout::new(&config.archives_dir);
        fs::create_dir_all(inbox.join("nested.tar.gz"))?;

        let moved = intake_arrivals(&LocalStore, &config, &layout)?;

        assert_eq!(moved, 0);
        assert!(inbox.join("nested.tar.gz").is_dir());
        Ok(())
    }
}
