//! HTTP/JSON command API for the economy server.
//!
//! Stands in for the chat platform's command dispatch: every command is a JSON
//! `POST` carrying the acting guild, channel and user.
//!
//! # Modules
//!
//! - [`economy`]: Balances, transfers, rewards, admin adjustments and dice
//! - [`land`]: Land purchase and ownership queries
//! - [`games`]: Blackjack session commands
//! - [`guild`]: Guild settings
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health                      - Health check
//! POST /api/balance                 - Current balance
//! POST /api/transfer                - Send money to another user
//! POST /api/hourly                  - Claim the hourly reward
//! POST /api/interest                - Claim daily interest
//! POST /api/grant                   - Admin reward
//! POST /api/fine                    - Admin penalty
//! POST /api/dice                    - Odd/even dice        (command channel)
//! POST /api/land/buy                - Buy the current location
//! POST /api/land/info               - Location details     (command channel)
//! POST /api/land/mine               - Caller's locations   (command channel)
//! POST /api/land/ranking            - Owner leaderboard    (command channel)
//! POST /api/land/history            - Trade log of a location
//! POST /api/blackjack/start         - Deal a hand          (command channel)
//! POST /api/blackjack/hit           - Draw a card          (command channel)
//! POST /api/blackjack/stand         - Finish the hand      (command channel)
//! POST /api/blackjack/view          - Current hand
//! POST /api/guild/command-channel   - Restrict commands to a channel
//! POST /api/guild/notification      - Set the reminder channel and role
//! POST /api/guild/settings          - Show guild settings
//! ```
//!
//! Errors are returned as `{"error": "<kind>", "message": "<text>"}`.

pub mod economy;
pub mod games;
pub mod guild;
pub mod land;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use guild_economy::{
    EconomyEngine, EconomyError, EconomyResult,
    db::Database,
    economy::UserId,
    guild::{ChannelId, GuildId},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::{logging, metrics};

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: EconomyEngine,
    /// Present when running against PostgreSQL
    pub db: Option<Database>,
}

/// Who issued a command, and where
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct CommandContext {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub user_id: UserId,
}

/// Error body returned to the transport
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// An economy error rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub EconomyError);

impl From<EconomyError> for ApiError {
    fn from(err: EconomyError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            EconomyError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            EconomyError::PermissionDenied => StatusCode::FORBIDDEN,
            EconomyError::NoActiveSession => StatusCode::NOT_FOUND,
            EconomyError::SessionAlreadyActive | EconomyError::SelfPurchase => {
                StatusCode::CONFLICT
            }
            EconomyError::InsufficientFunds { .. } | EconomyError::BelowMinimumBalance { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            EconomyError::CooldownActive { .. } => StatusCode::TOO_MANY_REQUESTS,
            EconomyError::Database(_) | EconomyError::TransactionFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.0.kind().to_string(),
            message: self.0.client_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Record metrics and a log line for a finished command, then render it.
pub(crate) fn respond<T: Serialize>(
    command: &str,
    ctx: &CommandContext,
    result: EconomyResult<T>,
) -> Result<Json<T>, ApiError> {
    match result {
        Ok(value) => {
            metrics::commands_total(command, "ok");
            logging::log_command(command, ctx.guild_id, ctx.user_id, Ok(()));
            Ok(Json(value))
        }
        Err(err) => {
            metrics::commands_total(command, err.kind());
            if err.is_operator_fault() {
                metrics::transaction_failures_total(command);
            }
            logging::log_command(command, ctx.guild_id, ctx.user_id, Err(err.kind()));
            Err(ApiError(err))
        }
    }
}

/// Fail with `PermissionDenied` unless the guild allows commands in this channel.
pub(crate) async fn require_channel(state: &AppState, ctx: &CommandContext) -> EconomyResult<()> {
    state
        .engine
        .guilds
        .require_command_permission(ctx.guild_id, ctx.channel_id)
        .await
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/balance", post(economy::balance))
        .route("/transfer", post(economy::transfer))
        .route("/hourly", post(economy::hourly))
        .route("/interest", post(economy::interest))
        .route("/grant", post(economy::grant))
        .route("/fine", post(economy::fine))
        .route("/dice", post(economy::dice))
        .route("/land/buy", post(land::buy))
        .route("/land/info", post(land::info))
        .route("/land/mine", post(land::mine))
        .route("/land/ranking", post(land::ranking))
        .route("/land/history", post(land::history))
        .route("/blackjack/start", post(games::start))
        .route("/blackjack/hit", post(games::hit))
        .route("/blackjack/stand", post(games::stand))
        .route("/blackjack/view", post(games::view))
        .route("/guild/command-channel", post(guild::set_command_channel))
        .route("/guild/notification", post(guild::set_notification))
        .route("/guild/settings", post(guild::settings));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when storage is reachable, `503 Service Unavailable` otherwise.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (storage, db_healthy) = match &state.db {
        Some(db) => ("postgres", db.health_check().await.is_ok()),
        None => ("memory", true),
    };
    let active_sessions = state.engine.blackjack.active_sessions().await;
    metrics::active_sessions(active_sessions);

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "storage": storage,
        "database": db_healthy,
        "active_sessions": active_sessions,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
