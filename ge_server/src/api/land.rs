//! Land market command handlers.
//!
//! The location of a command is the channel it was issued in.

use axum::{Json, extract::State};
use guild_economy::market::{
    Acquisition, DEFAULT_RANKING_LIMIT, Holdings, LocationId, OwnerRanking, PropertyQuote,
    PropertyTransfer,
};
use serde::Deserialize;

use super::{ApiError, AppState, CommandContext, require_channel, respond};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct RankingRequest {
    #[serde(flatten)]
    pub ctx: CommandContext,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryRequest {
    #[serde(flatten)]
    pub ctx: CommandContext,
    /// Defaults to the channel of the command
    pub location_id: Option<LocationId>,
}

/// Buy the channel the command was issued in.
pub async fn buy(
    State(state): State<AppState>,
    Json(ctx): Json<CommandContext>,
) -> Result<Json<Acquisition>, ApiError> {
    let result = state
        .engine
        .market
        .acquire_property(ctx.guild_id, ctx.channel_id, ctx.user_id)
        .await
        .inspect(|acquisition| metrics::land_trades_total(&acquisition.kind.to_string()));
    respond("land_buy", &ctx, result)
}

/// Owner and prices of the current channel.
pub async fn info(
    State(state): State<AppState>,
    Json(ctx): Json<CommandContext>,
) -> Result<Json<PropertyQuote>, ApiError> {
    let result = async {
        require_channel(&state, &ctx).await?;
        state
            .engine
            .market
            .property_info(ctx.guild_id, ctx.channel_id)
            .await
    }
    .await;
    respond("land_info", &ctx, result)
}

/// Locations the caller owns in this guild.
pub async fn mine(
    State(state): State<AppState>,
    Json(ctx): Json<CommandContext>,
) -> Result<Json<Holdings>, ApiError> {
    let result = async {
        require_channel(&state, &ctx).await?;
        state
            .engine
            .market
            .properties_of(ctx.guild_id, ctx.user_id)
            .await
    }
    .await;
    respond("land_mine", &ctx, result)
}

/// Land owners ordered by total value.
pub async fn ranking(
    State(state): State<AppState>,
    Json(req): Json<RankingRequest>,
) -> Result<Json<Vec<OwnerRanking>>, ApiError> {
    let result = async {
        require_channel(&state, &req.ctx).await?;
        state
            .engine
            .market
            .ranking(req.ctx.guild_id, req.limit.unwrap_or(DEFAULT_RANKING_LIMIT))
            .await
    }
    .await;
    respond("land_ranking", &req.ctx, result)
}

/// Trade log of a location, oldest first.
pub async fn history(
    State(state): State<AppState>,
    Json(req): Json<HistoryRequest>,
) -> Result<Json<Vec<PropertyTransfer>>, ApiError> {
    let location_id = req.location_id.unwrap_or(req.ctx.channel_id);
    let result = state
        .engine
        .market
        .transfer_history(req.ctx.guild_id, location_id)
        .await;
    respond("land_history", &req.ctx, result)
}
