//! Applies the rotation policy to every tier of one account.

use crate::fs::storage::{relocate, remove, ArchiveStore};
use crate::fs::walker::list_files_if_present;
use crate::rotation::backup::{sort_by_created_at, Backup};
use crate::rotation::codec;
use crate::rotation::policy::{Decision, RotationPolicy};
use crate::rotation::tier::{ArchiveLayout, Tier};
use crate::rotation::RunSummary;
use crate::utils::Result;
use chrono::NaiveDateTime;
use std::collections::HashSet;
use tracing::{debug, info};

pub struct AccountRotator<'a> {
    store: &'a dyn ArchiveStore,
    layout: &'a ArchiveLayout,
    policy: &'a RotationPolicy,
    now: NaiveDateTime,
}

impl<'a> AccountRotator<'a> {
    pub fn new(
        store: &'a dyn ArchiveStore,
        layout: &'a ArchiveLayout,
        policy: &'a RotationPolicy,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            store,
            layout,
            policy,
            now,
        }
    }

    /// Rotate hourly, then daily, then weekly.
    ///
    /// All three tiers are listed before anything moves, so a backup promoted
    /// in this pass is judged by its new tier's rule only on the next run.
    pub fn rotate(&self, account: &str, summary: &mut RunSummary) -> Result<()> {
        let mut snapshot = Vec::with_capacity(Tier::ALL.len());
        for tier in Tier::ALL {
            snapshot.push((tier, self.collect(account, tier)?));
        }

        for (tier, backups) in snapshot {
            for backup in &backups {
                let decision = self.policy.decide(tier, backup.created_at(), self.now);
                self.apply(backup, tier, decision)?;
                summary.record(decision);
            }
        }

        Ok(())
    }

    /// Backups currently in one tier, oldest first. Files without a canonical
    /// name are renamed in place.
    ///
    /// A rename can land on a canonical file listed earlier in the same pass;
    /// that path is kept once.
    pub fn collect(&self, account: &str, tier: Tier) -> Result<Vec<Backup>> {
        let dir = self.layout.tier_dir(account, tier);
        let mut backups = list_files_if_present(&dir)?
            .iter()
            .map(|path| codec::normalize(self.store, path))
            .collect::<Result<Vec<_>>>()?;

        let mut seen = HashSet::new();
        backups.retain(|backup| {
            let first = seen.insert(backup.path().to_path_buf());
            if !first {
                debug!(
                    account,
                    %tier,
                    file = backup.file_name(),
                    "Renamed backup replaced an existing file"
                );
            }
            first
        });
        sort_by_created_at(&mut backups);
        Ok(backups)
    }

    fn apply(&self, backup: &Backup, tier: Tier, decision: Decision) -> Result<()> {
        match decision {
            Decision::Keep => {
                debug!(
                    account = backup.account(),
                    %tier,
                    file = backup.file_name(),
                    age_hours = backup.age(self.now).num_hours(),
                    "Keeping backup"
                );
            }
            Decision::Promote(next) => {
                let target = self
                    .layout
                    .ensure_tier_dir(self.store, backup.account(), next)?
                    .join(backup.file_name());
                info!(
                    account = backup.account(),
                    from = %tier,
                    to = %next,
                    file = backup.file_name(),
                    "Promoting backup"
                );
                relocate(self.store, backup.path(), &target)?;
            }
            Decision::Expire => {
                info!(
                    account = backup.account(),
                    %tier,
                    path = %backup.path().display(),
                    "Removing expired backup"
                );
                remove(self.store, backup.path())?;
            }
        }
        Ok(())
    }
}
