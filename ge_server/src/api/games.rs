//! Blackjack command handlers.

use axum::{Json, extract::State};
use guild_economy::session::{HitOutcome, SessionView, Settlement};
use serde::Deserialize;

use super::{ApiError, AppState, CommandContext, require_channel, respond};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    #[serde(flatten)]
    pub ctx: CommandContext,
    pub wager: i64,
}

fn record_settlement(settlement: &Settlement) {
    metrics::settlements_total(
        &settlement.reason.to_string(),
        &settlement.result.to_string(),
    );
    if let Some(commission) = settlement.payout.commission {
        metrics::commission_paid(commission.amount);
    }
}

/// Deal a new hand.
pub async fn start(
    State(state): State<AppState>,
    Json(req): Json<StartRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let result = async {
        require_channel(&state, &req.ctx).await?;
        state
            .engine
            .blackjack
            .start_session(req.ctx.guild_id, req.ctx.user_id, req.wager)
            .await
    }
    .await;
    metrics::active_sessions(state.engine.blackjack.active_sessions().await);
    respond("blackjack_start", &req.ctx, result)
}

/// Draw a card.
pub async fn hit(
    State(state): State<AppState>,
    Json(ctx): Json<CommandContext>,
) -> Result<Json<HitOutcome>, ApiError> {
    let result = async {
        require_channel(&state, &ctx).await?;
        state.engine.blackjack.hit(ctx.user_id).await
    }
    .await;
    if let Ok(HitOutcome::Settled(settlement)) = &result {
        record_settlement(settlement);
    }
    respond("blackjack_hit", &ctx, result)
}

/// Stand and let the dealer play out.
pub async fn stand(
    State(state): State<AppState>,
    Json(ctx): Json<CommandContext>,
) -> Result<Json<Settlement>, ApiError> {
    let result = async {
        require_channel(&state, &ctx).await?;
        state.engine.blackjack.stand(ctx.user_id).await
    }
    .await
    .inspect(record_settlement);
    metrics::active_sessions(state.engine.blackjack.active_sessions().await);
    respond("blackjack_stand", &ctx, result)
}

/// Show the caller's hand.
pub async fn view(
    State(state): State<AppState>,
    Json(ctx): Json<CommandContext>,
) -> Result<Json<SessionView>, ApiError> {
    let result = state.engine.blackjack.view(ctx.user_id).await;
    respond("blackjack_view", &ctx, result)
}
