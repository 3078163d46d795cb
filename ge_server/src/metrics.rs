//! Prometheus metrics for monitoring economy server health.
//!
//! Metrics are exposed in Prometheus text format on a dedicated listener.
//!
//! # Metrics Categories
//!
//! - **Command Metrics**: Handled commands by name and outcome
//! - **Game Metrics**: Active blackjack sessions, settlements by result
//! - **Ledger Metrics**: Persistence faults, land trades
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use ge_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::commands_total("transfer", "ok");
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// Command Metrics
// ============================================================================

/// Count a handled command. `outcome` is `ok` or an error kind.
pub fn commands_total(command: &str, outcome: &str) {
    metrics::counter!("economy_commands_total",
        "command" => command.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

// ============================================================================
// Game Metrics
// ============================================================================

/// Set current active blackjack sessions count.
pub fn active_sessions(count: usize) {
    metrics::gauge!("blackjack_active_sessions").set(count as f64);
}

/// Count a settled blackjack hand.
pub fn settlements_total(reason: &str, result: &str) {
    metrics::counter!("blackjack_settlements_total",
        "reason" => reason.to_string(),
        "result" => result.to_string()
    )
    .increment(1);
}

/// Record commission paid to a land owner.
pub fn commission_paid(amount: i64) {
    metrics::histogram!("blackjack_commission_amount").record(amount as f64);
}

// ============================================================================
// Ledger Metrics
// ============================================================================

/// Increment persistence fault counter.
pub fn transaction_failures_total(operation: &str) {
    metrics::counter!("ledger_transaction_failures_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Count a land trade by kind (`PURCHASE` or `TRANSFER`).
pub fn land_trades_total(kind: &str) {
    metrics::counter!("land_trades_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_exporter() {
        // No recorder installed; calls are no-ops
        commands_total("balance", "ok");
        active_sessions(3);
        settlements_total("stand", "win");
        commission_paid(2);
        transaction_failures_total("transfer");
        land_trades_total("PURCHASE");
    }
}
