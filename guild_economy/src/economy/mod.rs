//! Ledger: balances, transfers, hourly rewards and daily interest.

pub mod config;
pub mod errors;
pub mod manager;
pub mod models;
pub mod rules;

pub use config::{EconomyConfig, InterestPolicy};
pub use errors::{EconomyError, EconomyResult, format_remaining};
pub use manager::EconomyManager;
pub use models::{
    Account, Commission, HourlyReward, InterestReward, OddEvenPlay, Payout, TransferReceipt,
    UserId,
};
