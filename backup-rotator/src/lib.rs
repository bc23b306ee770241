//! Backup Rotator Library
//!
//! Tiered retention for timestamped backup archives: new arrivals go to
//! `hourly`, and as they age they are promoted to `daily` and `weekly` or
//! deleted.

pub mod config;
pub mod fs;
pub mod rotation;
pub mod utils;

// Re-export commonly used types
pub use crate::config::Config;
pub use rotation::{Rotator, RunSummary};
pub use utils::errors::{Result, RotateError};
