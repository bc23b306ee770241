//! Read-only view of what the archive currently holds.

use crate::fs::metadata::FileMetadata;
use crate::fs::walker::list_files_if_present;
use crate::rotation::codec;
use crate::rotation::tier::{ArchiveLayout, Tier};
use crate::utils::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt::Write as _;
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
pub struct AccountInventory {
    pub account: String,
    pub tiers: Vec<TierInventory>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TierInventory {
    pub tier: Tier,
    pub backups: Vec<InventoryEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryEntry {
    pub file_name: String,
    /// `None` when the name carries no valid timestamp yet
    pub created_at: Option<NaiveDateTime>,
    pub size: u64,
}

/// Every account and tier, backups oldest first and undated names last.
/// Nothing is renamed.
pub fn inventory(layout: &ArchiveLayout) -> Result<Vec<AccountInventory>> {
    let mut accounts = Vec::new();
    for account in layout.accounts()? {
        let mut tiers = Vec::with_capacity(Tier::ALL.len());
        for tier in Tier::ALL {
            let mut backups = Vec::new();
            for path in list_files_if_present(&layout.tier_dir(&account, tier))? {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let created_at = match codec::parse(&file_name) {
                    Ok(parsed) => parsed.map(|p| p.created_at),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Unreadable backup timestamp");
                        None
                    }
                };
                backups.push(InventoryEntry {
                    file_name,
                    created_at,
                    size: FileMetadata::from_path(&path)?.size,
                });
            }
            backups.sort_by_key(|b| (b.created_at.is_none(), b.created_at));
            tiers.push(TierInventory { tier, backups });
        }
        accounts.push(AccountInventory { account, tiers });
    }
    Ok(accounts)
}

/// Plain text rendering, one line per backup.
pub fn render_table(accounts: &[AccountInventory]) -> String {
    let mut out = String::new();
    for account in accounts {
        let _ = writeln!(out, "{}", account.account);
        for tier in &account.tiers {
            let _ = writeln!(out, "  {} ({})", tier.tier, tier.backups.len());
            for backup in &tier.backups {
                let created = backup
                    .created_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "undated".to_string());
                let _ = writeln!(
                    out,
                    "    {:<16}  {:>12}  {}",
                    created, backup.size, backup.file_name
                );
            }
        }
    }
    out
}
