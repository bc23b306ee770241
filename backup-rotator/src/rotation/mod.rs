//! Rotation engine - Ages backups through hourly, daily and weekly tiers.
//!
//! One pass:
//! 1. Move inbox arrivals into `<account>/hourly/`
//! 2. Hourlies older than 24h: promote the anchor-hour ones to daily, delete the rest
//! 3. Dailies older than 7 days: promote the anchor-weekday ones to weekly, delete the rest
//! 4. Delete weeklies older than `max_weekly_backups` weeks

pub mod account;
pub mod backup;
pub mod codec;
pub mod intake;
pub mod inventory;
pub mod policy;
pub mod tier;

use crate::config::Config;
use crate::fs::storage::ArchiveStore;
use account::AccountRotator;
use chrono::NaiveDateTime;
use policy::{Decision, RotationPolicy};
use serde::Serialize;
use tier::ArchiveLayout;
use tracing::info;

pub use backup::Backup;
pub use tier::Tier;

/// Counters for one pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub accounts: usize,
    pub arrivals: usize,
    pub kept: usize,
    pub promoted: usize,
    pub expired: usize,
}

impl RunSummary {
    pub fn record(&mut self, decision: Decision) {
        match decision {
            Decision::Keep => self.kept += 1,
            Decision::Promote(_) => self.promoted += 1,
            Decision::Expire => self.expired += 1,
        }
    }
}

/// Drives a full rotation pass over every account
pub struct Rotator<'a> {
    config: &'a Config,
    store: &'a dyn ArchiveStore,
    policy: RotationPolicy,
    layout: ArchiveLayout,
}

impl<'a> Rotator<'a> {
    pub fn new(config: &'a Config, store: &'a dyn ArchiveStore) -> crate::Result<Self> {
        Ok(Self {
            config,
            store,
            policy: RotationPolicy::from_config(config)?,
            layout: ArchiveLayout::new(&config.archives_dir),
        })
    }

    /// Run intake and rotation with `now` as the current local time.
    ///
    /// The first failure aborts the pass. Accounts already rotated stay
    /// rotated.
    pub fn run(&self, now: NaiveDateTime) -> crate::Result<RunSummary> {
        let mut summary = RunSummary::default();

        if !self.config.backups_dir.is_dir() {
            return Err(crate::RotateError::MissingInbox(self.config.backups_dir.clone()));
        }
        self.layout.ensure_root(self.store)?;

        summary.arrivals = intake::intake_arrivals(self.store, self.config, &self.layout)?;

        let rotator = AccountRotator::new(self.store, &self.layout, &self.policy, now);
        for account in self.layout.accounts()? {
            info!(account = %account, "Rotating account");
            rotator.rotate(&account, &mut summary)?;
            summary.accounts += 1;
        }

        info!(
            accounts = summary.accounts,
            arrivals = summary.arrivals,
            kept = summary.kept,
            promoted = summary.promoted,
            expired = summary.expired,
            "Rotation complete"
        );
        Ok(summary)
    }
}
