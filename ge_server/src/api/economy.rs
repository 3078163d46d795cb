//! Ledger command handlers.

use axum::{Json, extract::State};
use guild_economy::{
    economy::{HourlyReward, InterestReward, OddEvenPlay, TransferReceipt, UserId},
    game::Parity,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, CommandContext, require_channel, respond};

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub user_id: UserId,
    pub balance: i64,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    #[serde(flatten)]
    pub ctx: CommandContext,
    pub receiver_id: UserId,
    pub amount: i64,
}

/// Admin adjustment of another user's balance
#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    #[serde(flatten)]
    pub ctx: CommandContext,
    pub target_id: UserId,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct DiceRequest {
    #[serde(flatten)]
    pub ctx: CommandContext,
    pub choice: Parity,
    pub wager: i64,
}

/// Current balance of the caller.
pub async fn balance(
    State(state): State<AppState>,
    Json(ctx): Json<CommandContext>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let result = state
        .engine
        .economy
        .get_balance(ctx.user_id)
        .await
        .map(|balance| BalanceResponse {
            user_id: ctx.user_id,
            balance,
        });
    respond("balance", &ctx, result)
}

/// Send money to another user.
pub async fn transfer(
    State(state): State<AppState>,
    Json(req): Json<TransferRequest>,
) -> Result<Json<TransferReceipt>, ApiError> {
    let result = state
        .engine
        .economy
        .transfer(req.ctx.user_id, req.receiver_id, req.amount)
        .await;
    respond("transfer", &req.ctx, result)
}

/// Claim the hourly reward.
pub async fn hourly(
    State(state): State<AppState>,
    Json(ctx): Json<CommandContext>,
) -> Result<Json<HourlyReward>, ApiError> {
    let result = state.engine.economy.claim_hourly_reward(ctx.user_id).await;
    respond("hourly", &ctx, result)
}

/// Claim today's interest.
pub async fn interest(
    State(state): State<AppState>,
    Json(ctx): Json<CommandContext>,
) -> Result<Json<InterestReward>, ApiError> {
    let result = state.engine.economy.claim_daily_interest(ctx.user_id).await;
    respond("interest", &ctx, result)
}

/// Admin reward. Role checks belong to the chat platform.
pub async fn grant(
    State(state): State<AppState>,
    Json(req): Json<AdjustRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let result = state
        .engine
        .economy
        .grant(req.target_id, req.amount)
        .await
        .map(|balance| BalanceResponse {
            user_id: req.target_id,
            balance,
        });
    respond("grant", &req.ctx, result)
}

/// Admin penalty. Role checks belong to the chat platform.
pub async fn fine(
    State(state): State<AppState>,
    Json(req): Json<AdjustRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let result = state
        .engine
        .economy
        .fine(req.target_id, req.amount)
        .await
        .map(|balance| BalanceResponse {
            user_id: req.target_id,
            balance,
        });
    respond("fine", &req.ctx, result)
}

/// Roll the odd/even die.
pub async fn dice(
    State(state): State<AppState>,
    Json(req): Json<DiceRequest>,
) -> Result<Json<OddEvenPlay>, ApiError> {
    let result = async {
        require_channel(&state, &req.ctx).await?;
        state
            .engine
            .economy
            .play_odd_even(req.ctx.user_id, req.choice, req.wager)
            .await
    }
    .await;
    respond("dice", &req.ctx, result)
}
