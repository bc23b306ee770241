//! Keep / promote / expire decisions.
//!
//! A backup stays in its tier until it reaches the tier's maximum age. It then
//! either moves on to the next tier, if it was taken in the anchor slot
//! (the configured hour for hourlies, weekday for dailies), or is deleted.
//! Weekly backups have no next tier and simply expire.

use crate::config::Config;
use crate::rotation::tier::Tier;
use crate::utils::{Result, RotateError};
use chrono::{Datelike, Duration, NaiveDateTime, Timelike, Weekday};

/// Indexed by the 0 = Monday numbering used in configuration.
const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Which backups may move up a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    /// Backups taken during this hour of day
    AtHour(u32),

    /// Backups taken on this day of the week
    OnWeekday(Weekday),

    Never,
}

impl Promotion {
    pub fn admits(self, created_at: NaiveDateTime) -> bool {
        match self {
            Promotion::AtHour(hour) => created_at.hour() == hour,
            Promotion::OnWeekday(day) => created_at.weekday() == day,
            Promotion::Never => false,
        }
    }
}

/// Retention rule of one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationRule {
    pub tier: Tier,
    pub max_age: Duration,
    pub promotion: Promotion,
}

/// Outcome for a single backup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Promote(Tier),
    Expire,
}

/// Decide what happens to a backup created at `created_at`.
pub fn decide(created_at: NaiveDateTime, rule: &RotationRule, now: NaiveDateTime) -> Decision {
    if now - created_at < rule.max_age {
        return Decision::Keep;
    }

    let Some(next) = rule.tier.next() else {
        return Decision::Expire;
    };

    if rule.promotion.admits(created_at) {
        Decision::Promote(next)
    } else {
        Decision::Expire
    }
}

/// The rules for all three tiers
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    hourly: RotationRule,
    daily: RotationRule,
    weekly: RotationRule,
}

impl RotationPolicy {
    pub fn new(hourly_backup_hour: u32, weekly_backup_day: u32, max_weekly_backups: u32) -> Result<Self> {
        if hourly_backup_hour > 23 {
            return Err(RotateError::Config(format!(
                "hourly_backup_hour must be between 0 and 23, got {hourly_backup_hour}"
            )));
        }
        let weekday = usize::try_from(weekly_backup_day)
            .ok()
            .and_then(|day| WEEKDAYS.get(day).copied())
            .ok_or_else(|| {
                RotateError::Config(format!(
                    "weekly_backup_day must be between 0 (Monday) and 6 (Sunday), got {weekly_backup_day}"
                ))
            })?;
        if max_weekly_backups == 0 {
            return Err(RotateError::Config(
                "max_weekly_backups must be a positive integer".to_string(),
            ));
        }

        Ok(Self {
            hourly: RotationRule {
                tier: Tier::Hourly,
                max_age: Duration::hours(24),
                promotion: Promotion::AtHour(hourly_backup_hour),
            },
            daily: RotationRule {
                tier: Tier::Daily,
                max_age: Duration::days(7),
                promotion: Promotion::OnWeekday(weekday),
            },
            weekly: RotationRule {
                tier: Tier::Weekly,
                max_age: Duration::days(7 * i64::from(max_weekly_backups)),
                promotion: Promotion::Never,
            },
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.hourly_backup_hour,
            config.weekly_backup_day,
            config.max_weekly_backups,
        )
    }

    pub fn rule(&self, tier: Tier) -> &RotationRule {
        match tier {
            Tier::Hourly => &self.hourly,
            Tier::Daily => &self.daily,
            Tier::Weekly => &self.weekly,
        }
    }

    pub fn decide(&self, tier: Tier, created_at: NaiveDateTime, now: NaiveDateTime) -> Decision {
        decide(created_at, self.rule(tier), now)
    }
}
