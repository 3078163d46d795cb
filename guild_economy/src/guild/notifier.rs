//! Daily interest reminder.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone, Utc};

use super::{manager::GuildSettingsManager, models::NotificationTarget};
use crate::economy::EconomyResult;

/// Text of the daily reminder
pub const INTEREST_REMINDER: &str = "Daily interest is ready to claim!";

/// Fires once per day at a fixed local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    pub at: NaiveTime,
}

impl DailySchedule {
    pub fn new(at: NaiveTime) -> Self {
        Self { at }
    }

    /// Next firing strictly after `now`, in `now`'s time zone.
    pub fn next_fire_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let tz = now.timezone();
        let mut day = now.date_naive();
        // A local time can be skipped by a DST change; try the following days.
        for _ in 0..3 {
            let candidate = tz
                .from_local_datetime(&day.and_time(self.at))
                .earliest()
                .filter(|candidate| candidate > now);
            if let Some(candidate) = candidate {
                return candidate;
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        now.clone() + Duration::days(1)
    }

    /// Time to sleep from `now` until the next firing, in server-local time.
    pub fn delay_until_next(&self, now: DateTime<Utc>) -> Duration {
        let local = now.with_timezone(&Local);
        self.next_fire_after(&local).signed_duration_since(local)
    }
}

impl Default for DailySchedule {
    /// Local midnight
    fn default() -> Self {
        Self { at: NaiveTime::MIN }
    }
}

/// Delivers reminders to a guild's notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, target: &NotificationTarget, message: &str) -> EconomyResult<()>;
}

/// Notifier that only writes the announcement to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, target: &NotificationTarget, message: &str) -> EconomyResult<()> {
        match target.role_id {
            Some(role_id) => log::info!(
                "[guild {} channel {}] <@&{role_id}> {message}",
                target.guild_id,
                target.channel_id
            ),
            None => log::info!(
                "[guild {} channel {}] {message}",
                target.guild_id,
                target.channel_id
            ),
        }
        Ok(())
    }
}

/// Send the interest reminder to every configured guild.
///
/// A failed delivery is logged and does not stop the others. Returns the number
/// of guilds reached.
pub async fn broadcast_interest_reminder(
    settings: &GuildSettingsManager,
    notifier: &dyn Notifier,
) -> EconomyResult<usize> {
    let targets = settings.notification_targets().await?;
    let mut delivered = 0;
    for target in &targets {
        match notifier.notify(target, INTEREST_REMINDER).await {
            Ok(()) => delivered += 1,
            Err(e) => log::warn!(
                "Failed to deliver interest reminder to guild {}: {e}",
                target.guild_id
            ),
        }
    }
    Ok(delivered)
}
