//! Custom error types for the backup rotator.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RotateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] ::config::ConfigError),

    #[error("Unable to find backups directory: {}", .0.display())]
    MissingInbox(PathBuf),

    #[error("Unable to create archives directory {}: {source}", .path.display())]
    ArchiveRootUncreatable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unable to create directory {}: {source}", .path.display())]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unable to move {} to {}: {source}", .from.display(), .to.display())]
    Relocation {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Unable to remove {}: {source}", .path.display())]
    Removal {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed timestamp in file name {name:?}: {reason}")]
    MalformedTimestamp { name: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RotateError>;
