//! Tunable economy parameters.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Smallest hourly reward
pub const HOURLY_REWARD_MIN: i64 = 1_000;
/// Largest hourly reward
pub const HOURLY_REWARD_MAX: i64 = 5_000;
/// Seconds between hourly rewards
pub const HOURLY_COOLDOWN_SECS: i64 = 3_600;
/// Daily interest rate in basis points (7.5%)
pub const INTEREST_RATE_BPS: i64 = 750;
/// Balance required before interest is paid
pub const INTEREST_MIN_BALANCE: i64 = 10_000;
/// Price of a location nobody has bought yet
pub const DEFAULT_BASE_PRICE: i64 = 1_000_000;

/// Economy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Inclusive lower bound of the hourly reward
    pub hourly_reward_min: i64,

    /// Inclusive upper bound of the hourly reward
    pub hourly_reward_max: i64,

    /// Minimum gap between hourly rewards, in seconds
    pub hourly_cooldown_secs: i64,

    /// Daily interest rate in basis points
    pub interest_rate_bps: i64,

    /// Minimum balance for daily interest
    pub interest_min_balance: i64,

    /// Price of an unowned location
    pub base_land_price: i64,
}

impl EconomyConfig {
    pub fn hourly_cooldown(&self) -> Duration {
        Duration::seconds(self.hourly_cooldown_secs)
    }

    /// Interest parameters handed to the ledger
    pub fn interest_policy(&self) -> InterestPolicy {
        InterestPolicy {
            rate_bps: self.interest_rate_bps,
            min_balance: self.interest_min_balance,
        }
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            hourly_reward_min: HOURLY_REWARD_MIN,
            hourly_reward_max: HOURLY_REWARD_MAX,
            hourly_cooldown_secs: HOURLY_COOLDOWN_SECS,
            interest_rate_bps: INTEREST_RATE_BPS,
            interest_min_balance: INTEREST_MIN_BALANCE,
            base_land_price: DEFAULT_BASE_PRICE,
        }
    }
}

/// Daily interest parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestPolicy {
    pub rate_bps: i64,
    pub min_balance: i64,
}

impl Default for InterestPolicy {
    fn default() -> Self {
        EconomyConfig::default().interest_policy()
    }
}
