//! Filesystem access: listing, metadata and the mutating store.

pub mod metadata;
pub mod storage;
pub mod walker;

pub use storage::{ArchiveStore, DryRunStore, LocalStore};
