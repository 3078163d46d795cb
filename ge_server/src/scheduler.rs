//! Background timers: the daily interest reminder and the abandoned-session sweep.

use chrono::Duration;
use guild_economy::{
    Clock, EconomyEngine,
    guild::{DailySchedule, Notifier, broadcast_interest_reminder},
};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::metrics;

/// Sleep until each daily firing and broadcast the interest reminder.
pub fn spawn_daily_notifier(
    engine: EconomyEngine,
    schedule: DailySchedule,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let delay = schedule.delay_until_next(clock.now());
            tracing::debug!(seconds = delay.num_seconds(), "Next interest reminder scheduled");
            tokio::time::sleep(delay.to_std().unwrap_or_default()).await;

            match broadcast_interest_reminder(&engine.guilds, notifier.as_ref()).await {
                Ok(count) => tracing::info!(guilds = count, "Interest reminder sent"),
                Err(e) => tracing::error!(error = %e, "Interest reminder failed"),
            }

            // Step past the firing instant so a fast clock cannot fire twice
            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        }
    })
}

/// Periodically forfeit blackjack sessions older than `ttl`.
pub fn spawn_session_sweeper(
    engine: EconomyEngine,
    ttl: Duration,
    every: std::time::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            sweep_once(&engine, ttl).await;
        }
    })
}

/// One sweep; returns the number of sessions forfeited.
pub async fn sweep_once(engine: &EconomyEngine, ttl: Duration) -> usize {
    let results = engine.blackjack.expire_stale(ttl).await;
    for result in &results {
        match result {
            Ok(settlement) => {
                metrics::settlements_total(
                    &settlement.reason.to_string(),
                    &settlement.result.to_string(),
                );
            }
            Err(e) => {
                metrics::transaction_failures_total("expire_session");
                tracing::error!(error = %e, "Failed to settle expired session");
            }
        }
    }
    metrics::active_sessions(engine.blackjack.active_sessions().await);
    results.len()
}
