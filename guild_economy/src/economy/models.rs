//! Ledger data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::OddEvenRound;

/// Platform-wide user id. Accounts are not scoped to a guild.
pub type UserId = i64;

/// Account model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub user_id: UserId,
    pub balance: i64,
    pub last_hourly_at: Option<DateTime<Utc>>,
    pub last_interest_at: Option<DateTime<Utc>>,
}

impl Account {
    /// A fresh zero-balance account that has never claimed anything.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            balance: 0,
            last_hourly_at: None,
            last_interest_at: None,
        }
    }
}

/// Result of a successful peer-to-peer transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub amount: i64,
    pub sender_balance: i64,
    pub receiver_balance: i64,
}

/// Hourly reward grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyReward {
    pub amount: i64,
    pub balance: i64,
}

/// Daily interest grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestReward {
    pub interest: i64,
    pub balance: i64,
}

/// Commission carved out of game winnings for a land owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commission {
    pub owner_id: UserId,
    pub amount: i64,
}

/// Balance changes applied together when a game settles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub player_id: UserId,
    /// Net change to the player's balance, after commission
    pub player_delta: i64,
    pub commission: Option<Commission>,
}

/// A settled odd/even roll and the player's balance afterwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OddEvenPlay {
    pub round: OddEvenRound,
    pub balance: i64,
}
