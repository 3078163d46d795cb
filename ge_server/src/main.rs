//! Guild economy server.
//!
//! Serves the command API over HTTP and runs the daily interest reminder and
//! the abandoned-session sweep in the background.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Error};
use ge_server::{
    api,
    config::{ServerConfig, StorageMode},
    logging, metrics, scheduler,
};
use guild_economy::{
    Clock, EconomyEngine, SystemClock,
    db::Database,
    guild::{DailySchedule, LogNotifier},
};
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Run the guild economy server

USAGE:
  ge_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/guild_economy]

FLAGS:
  --memory                 Keep all state in memory instead of PostgreSQL
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  HOURLY_REWARD_MIN/MAX    Hourly reward range
  INTEREST_RATE_BPS        Daily interest in basis points
  BASE_LAND_PRICE          Price of an unowned location
  NOTIFICATION_TIME        Local HH:MM of the daily reminder
  SESSION_TTL_SECS         Blackjack sessions older than this are forfeited
  METRICS_BIND             Prometheus exporter address
  (See .env.example for all configuration options)
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
    memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs
            .opt_value_from_str("--bind")
            .context("Invalid --bind address")?,
        database_url: pargs
            .opt_value_from_str("--db-url")
            .context("Invalid --db-url")?,
        memory: pargs.contains("--memory"),
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url, args.memory)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(anyhow::Error::msg)?;
        info!("Prometheus metrics exported on {addr}");
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    info!("Time-gated rules read {}", clock.name());

    let (engine, db) = match config.storage {
        StorageMode::Memory => {
            log::warn!("Running with in-memory storage; state is lost on exit");
            (
                EconomyEngine::in_memory(clock.clone(), config.economy.clone()),
                None,
            )
        }
        StorageMode::Postgres => {
            info!("Connecting to database");
            let db = Database::new(&config.database)
                .await
                .context("Failed to connect to database")?;
            db.migrate().await.context("Failed to run migrations")?;
            info!("Database connected and migrated");
            (
                EconomyEngine::postgres(
                    &db,
                    clock.clone(),
                    config.economy.clone(),
                    Duration::from_secs(config.database.transaction_timeout_secs),
                ),
                Some(db),
            )
        }
    };

    let notifier = scheduler::spawn_daily_notifier(
        engine.clone(),
        DailySchedule::new(config.notification_time),
        Arc::new(LogNotifier),
        clock.clone(),
    );
    let sweeper = scheduler::spawn_session_sweeper(
        engine.clone(),
        config.session_ttl(),
        Duration::from_secs(config.session_sweep_interval_secs),
    );
    info!(
        "Interest reminder at {} local; sessions expire after {}s",
        config.notification_time, config.session_ttl_secs
    );

    let app = api::create_router(api::AppState {
        engine,
        db: db.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    notifier.abort();
    sweeper.abort();
    if let Some(db) = db {
        db.close().await;
    }

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install CTRL+C signal handler: {e}");
        std::future::pending::<()>().await;
    }
}
