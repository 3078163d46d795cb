//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use chrono::NaiveTime;
use guild_economy::{db::DatabaseConfig, economy::EconomyConfig};
use std::net::{Ipv4Addr, SocketAddr};

/// Default HTTP bind address
pub const DEFAULT_BIND: SocketAddr = SocketAddr::new(std::net::IpAddr::V4(Ipv4Addr::LOCALHOST), 8080);

/// Where ledger and registry state is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Postgres,
    /// Process memory only; everything is lost on exit
    Memory,
}

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    pub storage: StorageMode,
    /// Reward, interest and land price parameters
    pub economy: EconomyConfig,
    /// Local time of the daily interest reminder
    pub notification_time: NaiveTime,
    /// Blackjack sessions older than this are forfeited
    pub session_ttl_secs: i64,
    /// How often abandoned sessions are swept
    pub session_sweep_interval_secs: u64,
    /// Prometheus scrape address; metrics are off when unset
    pub metrics_bind: Option<SocketAddr>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    /// * `memory` - Force in-memory storage (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        memory: bool,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_env_strict("SERVER_BIND")?.unwrap_or(DEFAULT_BIND),
        };

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database.database_url = url;
        }

        let storage = if memory || std::env::var("STORAGE").is_ok_and(|v| v.eq_ignore_ascii_case("memory")) {
            StorageMode::Memory
        } else {
            StorageMode::Postgres
        };

        let defaults = EconomyConfig::default();
        let economy = EconomyConfig {
            hourly_reward_min: parse_env_or("HOURLY_REWARD_MIN", defaults.hourly_reward_min),
            hourly_reward_max: parse_env_or("HOURLY_REWARD_MAX", defaults.hourly_reward_max),
            hourly_cooldown_secs: parse_env_or("HOURLY_COOLDOWN_SECS", defaults.hourly_cooldown_secs),
            interest_rate_bps: parse_env_or("INTEREST_RATE_BPS", defaults.interest_rate_bps),
            interest_min_balance: parse_env_or(
                "INTEREST_MIN_BALANCE",
                defaults.interest_min_balance,
            ),
            base_land_price: parse_env_or("BASE_LAND_PRICE", defaults.base_land_price),
        };

        let notification_time = match std::env::var("NOTIFICATION_TIME") {
            Ok(raw) => parse_time_of_day(&raw).ok_or_else(|| ConfigError::Invalid {
                var: "NOTIFICATION_TIME".to_string(),
                reason: format!("Expected HH:MM, got {raw:?}"),
            })?,
            Err(_) => NaiveTime::MIN,
        };

        Ok(ServerConfig {
            bind,
            database,
            storage,
            economy,
            notification_time,
            session_ttl_secs: parse_env_or("SESSION_TTL_SECS", 900),
            session_sweep_interval_secs: parse_env_or("SESSION_SWEEP_INTERVAL_SECS", 60),
            metrics_bind: parse_env_strict("METRICS_BIND")?,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let economy = &self.economy;

        if economy.hourly_reward_min <= 0 {
            return Err(invalid("HOURLY_REWARD_MIN", "Must be greater than 0"));
        }

        if economy.hourly_reward_max < economy.hourly_reward_min {
            return Err(ConfigError::Invalid {
                var: "HOURLY_REWARD_MAX".to_string(),
                reason: format!(
                    "Must be at least the minimum reward ({})",
                    economy.hourly_reward_min
                ),
            });
        }

        if economy.hourly_cooldown_secs <= 0 {
            return Err(invalid("HOURLY_COOLDOWN_SECS", "Must be greater than 0"));
        }

        if !(0..=10_000).contains(&economy.interest_rate_bps) {
            return Err(invalid("INTEREST_RATE_BPS", "Must be between 0 and 10000"));
        }

        if economy.interest_min_balance < 0 {
            return Err(invalid("INTEREST_MIN_BALANCE", "Must not be negative"));
        }

        if economy.base_land_price <= 0 {
            return Err(invalid("BASE_LAND_PRICE", "Must be greater than 0"));
        }

        if self.session_ttl_secs <= 0 {
            return Err(invalid("SESSION_TTL_SECS", "Must be greater than 0"));
        }

        if self.session_sweep_interval_secs == 0 {
            return Err(invalid("SESSION_SWEEP_INTERVAL_SECS", "Must be greater than 0"));
        }

        if self.storage == StorageMode::Postgres && self.database.database_url.is_empty() {
            return Err(invalid("DATABASE_URL", "Must not be empty"));
        }

        Ok(())
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_ttl_secs)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn invalid(var: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var: var.to_string(),
        reason: reason.to_string(),
    }
}

/// `HH:MM` or `HH:MM:SS`
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parse an optional variable, failing when it is set to garbage
fn parse_env_strict<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().map(Some).map_err(|e: T::Err| ConfigError::Invalid {
            var: key.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig {
            bind: DEFAULT_BIND,
            database: DatabaseConfig::development(),
            storage: StorageMode::Memory,
            economy: EconomyConfig::default(),
            notification_time: NaiveTime::MIN,
            session_ttl_secs: 900,
            session_sweep_interval_secs: 60,
            metrics_bind: None,
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_config_error_display() {
        let err = invalid("BASE_LAND_PRICE", "Must be greater than 0");
        let msg = err.to_string();
        assert!(msg.contains("BASE_LAND_PRICE"));
        assert!(msg.contains("greater than 0"));
    }

    #[test]
    fn test_reward_range_must_be_ordered() {
        let mut config = config();
        config.economy.hourly_reward_min = 5_000;
        config.economy.hourly_reward_max = 1_000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("HOURLY_REWARD_MAX"));
    }

    #[test]
    fn test_base_price_must_be_positive() {
        let mut config = config();
        config.economy.base_land_price = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_interest_rate_bounds() {
        let mut config = config();
        config.economy.interest_rate_bps = 10_001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(
            parse_time_of_day("07:30"),
            NaiveTime::from_hms_opt(7, 30, 0)
        );
        assert_eq!(
            parse_time_of_day(" 23:59:59 "),
            NaiveTime::from_hms_opt(23, 59, 59)
        );
        assert_eq!(parse_time_of_day("25:00"), None);
        assert_eq!(parse_time_of_day("noon"), None);
    }
}
