//! Guild settings manager.

use super::models::{ChannelId, GuildId, GuildSettings, NotificationTarget, RoleId};
use crate::{
    db::GuildSettingsRepository,
    economy::{EconomyError, EconomyResult},
};
use std::sync::Arc;

/// Read and update per-guild configuration
#[derive(Clone)]
pub struct GuildSettingsManager {
    repository: Arc<dyn GuildSettingsRepository>,
}

impl GuildSettingsManager {
    pub fn new(repository: Arc<dyn GuildSettingsRepository>) -> Self {
        Self { repository }
    }

    /// Settings for a guild, defaulting to an unconfigured guild
    pub async fn settings(&self, guild_id: GuildId) -> EconomyResult<GuildSettings> {
        Ok(self
            .repository
            .find_settings(guild_id)
            .await?
            .unwrap_or_else(|| GuildSettings::new(guild_id)))
    }

    /// Whether restricted commands may run in `channel_id`.
    ///
    /// Guilds without a command channel allow every channel.
    pub async fn check_command_permission(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> EconomyResult<bool> {
        Ok(self.settings(guild_id).await?.allows_channel(channel_id))
    }

    /// Like [`Self::check_command_permission`] but fails with `PermissionDenied`
    pub async fn require_command_permission(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> EconomyResult<()> {
        if self.check_command_permission(guild_id, channel_id).await? {
            Ok(())
        } else {
            Err(EconomyError::PermissionDenied)
        }
    }

    /// Channel and optional role of the guild's daily reminder
    pub async fn notification_target(
        &self,
        guild_id: GuildId,
    ) -> EconomyResult<Option<(ChannelId, Option<RoleId>)>> {
        Ok(self
            .settings(guild_id)
            .await?
            .notification_target()
            .map(|target| (target.channel_id, target.role_id)))
    }

    pub async fn notification_targets(&self) -> EconomyResult<Vec<NotificationTarget>> {
        self.repository.notification_targets().await
    }

    pub async fn set_command_channel(
        &self,
        guild_id: GuildId,
        channel_id: Option<ChannelId>,
    ) -> EconomyResult<()> {
        self.repository.set_command_channel(guild_id, channel_id).await?;
        log::info!("Guild {guild_id} command channel set to {channel_id:?}");
        Ok(())
    }

    pub async fn set_notification_target(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        role_id: Option<RoleId>,
    ) -> EconomyResult<()> {
        self.repository
            .set_notification_target(guild_id, channel_id, role_id)
            .await?;
        log::info!(
            "Guild {guild_id} notifications set to channel {channel_id} role {role_id:?}"
        );
        Ok(())
    }
}
