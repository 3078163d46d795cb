//! Guild configuration models.

use serde::{Deserialize, Serialize};

/// An isolated community (tenant)
pub type GuildId = i64;
/// A text channel inside a guild
pub type ChannelId = i64;
/// A mentionable role inside a guild
pub type RoleId = i64;

/// Per-guild settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildSettings {
    pub guild_id: GuildId,
    /// When set, restricted commands only run in this channel
    pub command_channel_id: Option<ChannelId>,
    pub notification_channel_id: Option<ChannelId>,
    pub notification_role_id: Option<RoleId>,
}

impl GuildSettings {
    pub fn new(guild_id: GuildId) -> Self {
        Self {
            guild_id,
            ..Default::default()
        }
    }

    /// Whether a restricted command may run in `channel_id`
    pub fn allows_channel(&self, channel_id: ChannelId) -> bool {
        self.command_channel_id
            .is_none_or(|allowed| allowed == channel_id)
    }

    pub fn notification_target(&self) -> Option<NotificationTarget> {
        self.notification_channel_id
            .map(|channel_id| NotificationTarget {
                guild_id: self.guild_id,
                channel_id,
                role_id: self.notification_role_id,
            })
    }
}

/// Where the daily interest reminder is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTarget {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub role_id: Option<RoleId>,
}
