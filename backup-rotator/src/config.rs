//! Configuration management for the backup rotator.
//!
//! Settings live in a `[Settings]` section and are layered, later sources
//! winning:
//!
//! 1. built-in defaults
//! 2. `/etc/defaults/rotate-backups` (INI, optional)
//! 3. `$HOME/.rotate-backupsrc` (INI, optional)
//! 4. an explicit config file (TOML when it ends in `.toml`, INI otherwise)
//! 5. `ROTATE_BACKUPS_SETTINGS__<KEY>` environment variables
//!
//! ```ini
//! [Settings]
//! backups_dir = /home/adam/minecraft/backups
//! archives_dir = /home/adam/minecraft/backups-archives
//! hourly_backup_hour = 23
//! weekly_backup_day = 6
//! max_weekly_backups = 52
//! backup_extensions = ".tar.bz2",".jar"
//! ```

use crate::rotation::policy::RotationPolicy;
use crate::utils::{Result, RotateError};
use ::config::{Environment, File, FileFormat, Map, Value};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// System-wide rc file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/defaults/rotate-backups";

/// Per-user rc file, relative to `$HOME`.
pub const USER_CONFIG_FILE: &str = ".rotate-backupsrc";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "ROTATE_BACKUPS";

const SETTINGS_SECTION: &str = "settings";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Inbox where new archives arrive
    #[serde(default = "default_backups_dir")]
    pub backups_dir: PathBuf,

    /// Root of the per-account tier directories
    #[serde(default = "default_archives_dir")]
    pub archives_dir: PathBuf,

    /// Hour of day (0-23) whose hourly backups are promoted to daily
    #[serde(default = "default_hourly_backup_hour")]
    pub hourly_backup_hour: u32,

    /// Day of week (0-6, Monday-Sunday) whose daily backups are promoted to weekly
    #[serde(default = "default_weekly_backup_day")]
    pub weekly_backup_day: u32,

    /// Number of weeks a weekly backup is retained
    #[serde(default = "default_max_weekly_backups")]
    pub max_weekly_backups: u32,

    /// File name suffixes recognized as backups in the inbox
    #[serde(
        default = "default_backup_extensions",
        deserialize_with = "deserialize_extensions"
    )]
    pub backup_extensions: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default values
fn default_backups_dir() -> PathBuf {
    PathBuf::from("/var/backups/backups")
}

fn default_archives_dir() -> PathBuf {
    PathBuf::from("/var/backups/backups-archives")
}

fn default_hourly_backup_hour() -> u32 {
    23
}

fn default_weekly_backup_day() -> u32 {
    6 // Sunday
}

fn default_max_weekly_backups() -> u32 {
    52
}

fn default_backup_extensions() -> Vec<String> {
    vec!["tar.gz".to_string(), ".tar.bz2".to_string(), ".jar".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backups_dir: default_backups_dir(),
            archives_dir: default_archives_dir(),
            hourly_backup_hour: default_hourly_backup_hour(),
            weekly_backup_day: default_weekly_backup_day(),
            max_weekly_backups: default_max_weekly_backups(),
            backup_extensions: default_backup_extensions(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from the standard rc files, an optional explicit
    /// file and the environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        ConfigLoader::standard()
            .explicit_file(explicit.map(Path::to_path_buf))
            .load()
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        RotationPolicy::from_config(self)?;
        if self.backup_extensions.is_empty() {
            return Err(RotateError::Config(
                "backup_extensions must name at least one suffix".to_string(),
            ));
        }
        Ok(())
    }

    /// True if `file_name` ends in one of the configured extensions.
    pub fn is_backup(&self, file_name: &str) -> bool {
        self.backup_extensions
            .iter()
            .any(|ext| file_name.ends_with(ext.as_str()))
    }
}

/// Builder for the layered configuration sources.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    rc_files: Vec<PathBuf>,
    explicit: Option<PathBuf>,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// No sources at all; `load` yields the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// System and user rc files plus environment overrides.
    pub fn standard() -> Self {
        let mut loader = Self::new().rc_file(SYSTEM_CONFIG_PATH);
        if let Some(home) = std::env::var_os("HOME") {
            loader = loader.rc_file(PathBuf::from(home).join(USER_CONFIG_FILE));
        }
        loader.env_prefix(ENV_PREFIX)
    }

    /// Add an optional INI rc file.
    pub fn rc_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.rc_files.push(path.into());
        self
    }

    /// Add a required config file.
    pub fn explicit_file(mut self, path: Option<PathBuf>) -> Self {
        self.explicit = path;
        self
    }

    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    pub fn load(&self) -> Result<Config> {
        let mut builder = ::config::Config::builder();

        for rc in &self.rc_files {
            builder = builder.add_source(
                File::new(&rc.to_string_lossy(), FileFormat::Ini).required(false),
            );
        }

        if let Some(path) = &self.explicit {
            if !path.is_file() {
                return Err(RotateError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            builder = builder
                .add_source(File::new(&path.to_string_lossy(), format_for(path)).required(true));
        }

        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__"),
            );
        }

        let raw: Map<String, Value> = builder.build()?.try_deserialize()?;
        let config: Config = Value::from(settings_table(raw)?).try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

fn format_for(path: &Path) -> FileFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => FileFormat::Toml,
        _ => FileFormat::Ini,
    }
}

/// Flatten the settings section, ignoring the case INI files write it in.
///
/// The exactly-lowercase section (what environment overrides produce) is
/// merged last so it wins.
fn settings_table(raw: Map<String, Value>) -> Result<Map<String, Value>> {
    let (exact, other): (Vec<_>, Vec<_>) = raw
        .into_iter()
        .filter(|(section, _)| section.eq_ignore_ascii_case(SETTINGS_SECTION))
        .partition(|(section, _)| section == SETTINGS_SECTION);

    let mut table = Map::new();
    for (_, section) in other.into_iter().chain(exact) {
        for (key, value) in section.into_table()? {
            table.insert(key.to_ascii_lowercase(), value);
        }
    }
    Ok(table)
}

/// Accepts either a list or a comma separated string such as
/// `".tar.bz2",".jar"`.
fn deserialize_extensions<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Extensions {
        List(Vec<String>),
        Csv(String),
    }

    let list = match Extensions::deserialize(deserializer)? {
        Extensions::List(items) => items,
        Extensions::Csv(line) => line.split(',').map(str::to_string).collect(),
    };
    Ok(list
        .iter()
        .map(|ext| ext.trim().trim_matches(|c| c == '"' || c == '\'').trim())
        .filter(|ext| !ext.is_empty())
        .map(str::to_string)
        .collect())
}
