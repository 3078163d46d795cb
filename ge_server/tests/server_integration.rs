//! Integration tests for the HTTP command API over an in-memory engine.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use ge_server::api::{AppState, create_router};
use guild_economy::{EconomyEngine, SystemClock, economy::EconomyConfig};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot` method

fn create_test_server() -> (axum::Router, EconomyEngine) {
    let engine = EconomyEngine::in_memory(Arc::new(SystemClock::new()), EconomyConfig::default());
    let app = create_router(AppState {
        engine: engine.clone(),
        db: None,
    });
    (app, engine)
}

async fn post(app: &axum::Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn ctx(user_id: i64) -> Value {
    json!({ "guild_id": 1, "channel_id": 100, "user_id": user_id })
}

fn with(mut base: Value, extra: Value) -> Value {
    if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }
    base
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = create_test_server();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_balance_of_new_user_is_zero() {
    let (app, _) = create_test_server();
    let (status, body) = post(&app, "/api/balance", ctx(7)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], 0);
}

#[tokio::test]
async fn test_transfer_and_insufficient_funds() {
    let (app, engine) = create_test_server();
    engine.economy.grant(1, 500).await.unwrap();

    let (status, body) = post(
        &app,
        "/api/transfer",
        with(ctx(1), json!({ "receiver_id": 2, "amount": 200 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sender_balance"], 300);
    assert_eq!(body["receiver_balance"], 200);

    let (status, body) = post(
        &app,
        "/api/transfer",
        with(ctx(1), json!({ "receiver_id": 2, "amount": 301 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "insufficient_funds");
}

#[tokio::test]
async fn test_hourly_cooldown_reported() {
    let (app, _) = create_test_server();
    let (status, _) = post(&app, "/api/hourly", ctx(3)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(&app, "/api/hourly", ctx(3)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "cooldown_active");
    assert!(body["message"].as_str().unwrap().starts_with("Available again in"));
}

#[tokio::test]
async fn test_land_purchase_then_takeover() {
    let (app, engine) = create_test_server();
    engine.economy.grant(1, 1_000_000).await.unwrap();
    engine.economy.grant(2, 1_200_000).await.unwrap();

    let (status, body) = post(&app, "/api/land/buy", ctx(1)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "PURCHASE");

    let (status, body) = post(&app, "/api/land/buy", ctx(1)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "self_purchase");

    let (status, body) = post(&app, "/api/land/buy", ctx(2)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "TRANSFER");
    assert_eq!(body["price"], 1_200_000);

    let (_, info) = post(&app, "/api/land/info", ctx(2)).await;
    assert_eq!(info["owner_id"], 2);
    assert_eq!(info["acquisition_price"], 1_440_000);

    let (_, history) = post(&app, "/api/land/history", ctx(2)).await;
    assert_eq!(history.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_command_channel_restriction() {
    let (app, engine) = create_test_server();
    engine.economy.grant(1, 1_000).await.unwrap();

    let (status, _) = post(
        &app,
        "/api/guild/command-channel",
        with(ctx(1), json!({ "command_channel_id": 555 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Issued from channel 100, restricted to 555
    let (status, body) = post(
        &app,
        "/api/blackjack/start",
        with(ctx(1), json!({ "wager": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "permission_denied");

    // Unrestricted commands still work
    let (status, _) = post(&app, "/api/balance", ctx(1)).await;
    assert_eq!(status, StatusCode::OK);

    let allowed = json!({ "guild_id": 1, "channel_id": 555, "user_id": 1, "wager": 100 });
    let (status, _) = post(&app, "/api/blackjack/start", allowed).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_blackjack_flow() {
    let (app, engine) = create_test_server();
    engine.economy.grant(1, 1_000).await.unwrap();

    let (status, view) = post(
        &app,
        "/api/blackjack/start",
        with(ctx(1), json!({ "wager": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["player_hand"].as_array().unwrap().len(), 2);

    let (status, body) = post(
        &app,
        "/api/blackjack/start",
        with(ctx(1), json!({ "wager": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "session_already_active");

    let (status, settlement) = post(&app, "/api/blackjack/stand", ctx(1)).await;
    assert_eq!(status, StatusCode::OK);
    let net = settlement["net"].as_i64().unwrap();
    assert_eq!(settlement["balance"].as_i64().unwrap(), 1_000 + net);

    let (status, body) = post(&app, "/api/blackjack/hit", ctx(1)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "no_active_session");
}

#[tokio::test]
async fn test_invalid_wager_rejected() {
    let (app, _) = create_test_server();
    let (status, body) = post(
        &app,
        "/api/dice",
        with(ctx(1), json!({ "choice": "odd", "wager": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_amount");
}

#[tokio::test]
async fn test_notification_settings_round_trip() {
    let (app, _) = create_test_server();
    let (status, body) = post(
        &app,
        "/api/guild/notification",
        with(
            ctx(1),
            json!({ "notification_channel_id": 42, "notification_role_id": 9 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notification_channel_id"], 42);
    assert_eq!(body["notification_role_id"], 9);
    assert_eq!(body["command_channel_id"], Value::Null);
}
