//! Guild settings handlers. Admin checks belong to the chat platform.

use axum::{Json, extract::State};
use guild_economy::guild::{ChannelId, GuildSettings, RoleId};
use serde::Deserialize;

use super::{ApiError, AppState, CommandContext, respond};

#[derive(Debug, Deserialize)]
pub struct CommandChannelRequest {
    #[serde(flatten)]
    pub ctx: CommandContext,
    /// `null` lifts the restriction
    pub command_channel_id: Option<ChannelId>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationRequest {
    #[serde(flatten)]
    pub ctx: CommandContext,
    pub notification_channel_id: ChannelId,
    pub notification_role_id: Option<RoleId>,
}

pub async fn set_command_channel(
    State(state): State<AppState>,
    Json(req): Json<CommandChannelRequest>,
) -> Result<Json<GuildSettings>, ApiError> {
    let guilds = &state.engine.guilds;
    let result = async {
        guilds
            .set_command_channel(req.ctx.guild_id, req.command_channel_id)
            .await?;
        guilds.settings(req.ctx.guild_id).await
    }
    .await;
    respond("set_command_channel", &req.ctx, result)
}

pub async fn set_notification(
    State(state): State<AppState>,
    Json(req): Json<NotificationRequest>,
) -> Result<Json<GuildSettings>, ApiError> {
    let guilds = &state.engine.guilds;
    let result = async {
        guilds
            .set_notification_target(
                req.ctx.guild_id,
                req.notification_channel_id,
                req.notification_role_id,
            )
            .await?;
        guilds.settings(req.ctx.guild_id).await
    }
    .await;
    respond("set_notification", &req.ctx, result)
}

pub async fn settings(
    State(state): State<AppState>,
    Json(ctx): Json<CommandContext>,
) -> Result<Json<GuildSettings>, ApiError> {
    let result = state.engine.guilds.settings(ctx.guild_id).await;
    respond("guild_settings", &ctx, result)
}
