//! Per-guild settings and the daily notification schedule.

pub mod manager;
pub mod models;
pub mod notifier;

pub use manager::GuildSettingsManager;
pub use models::{ChannelId, GuildId, GuildSettings, NotificationTarget, RoleId};
pub use notifier::{
    DailySchedule, INTEREST_REMINDER, LogNotifier, Notifier, broadcast_interest_reminder,
};
