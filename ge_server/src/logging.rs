//! Structured logging configuration.
//!
//! The library logs through the `log` facade; the subscriber installed here
//! picks those records up alongside the server's own `tracing` events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Initialize structured logging
///
/// Configurable log levels via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use ge_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log one handled command
///
/// Rejections caused by the user are logged at debug; persistence faults are
/// logged by the library itself.
pub fn log_command(command: &str, guild_id: i64, user_id: i64, outcome: Result<(), &str>) {
    match outcome {
        Ok(()) => tracing::info!(
            command = command,
            guild_id = guild_id,
            user_id = user_id,
            "Command completed"
        ),
        Err(kind) => tracing::debug!(
            command = command,
            guild_id = guild_id,
            user_id = user_id,
            error = kind,
            "Command rejected"
        ),
    }
}
