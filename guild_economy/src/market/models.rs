//! Property registry data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{economy::UserId, guild::GuildId};

/// A purchasable location inside a guild (a channel)
pub type LocationId = i64;

/// Property model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub guild_id: GuildId,
    pub location_id: LocationId,
    pub owner_id: Option<UserId>,
    pub price: i64,
    /// When the current owner bought it
    pub purchased_at: DateTime<Utc>,
    pub last_transaction_at: Option<DateTime<Utc>>,
}

/// Kind of a recorded land trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferKind {
    /// First sale of an unowned location
    Purchase,
    /// Takeover from a previous owner
    Transfer,
}

impl std::fmt::Display for TransferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferKind::Purchase => write!(f, "PURCHASE"),
            TransferKind::Transfer => write!(f, "TRANSFER"),
        }
    }
}

impl std::str::FromStr for TransferKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PURCHASE" => Ok(TransferKind::Purchase),
            "TRANSFER" => Ok(TransferKind::Transfer),
            other => Err(format!("unknown transfer kind {other}")),
        }
    }
}

/// Append-only audit record of a land trade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyTransfer {
    pub id: i64,
    pub guild_id: GuildId,
    pub location_id: LocationId,
    pub seller_id: Option<UserId>,
    pub buyer_id: UserId,
    pub price: i64,
    pub kind: TransferKind,
    pub created_at: DateTime<Utc>,
}

/// Input of the acquisition protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionRequest {
    pub guild_id: GuildId,
    pub location_id: LocationId,
    pub buyer_id: UserId,
    pub base_price: i64,
    pub now: DateTime<Utc>,
}

/// Completed acquisition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acquisition {
    pub guild_id: GuildId,
    pub location_id: LocationId,
    pub buyer_id: UserId,
    pub seller_id: Option<UserId>,
    pub price: i64,
    pub kind: TransferKind,
    pub buyer_balance: i64,
}

/// What a location costs right now
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyQuote {
    pub guild_id: GuildId,
    pub location_id: LocationId,
    pub owner_id: Option<UserId>,
    pub current_price: i64,
    /// Price the next buyer pays
    pub acquisition_price: i64,
    pub purchased_at: Option<DateTime<Utc>>,
    pub last_transaction_at: Option<DateTime<Utc>>,
}

/// A user's land in one guild
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holdings {
    pub owner_id: UserId,
    pub properties: Vec<Property>,
    pub total_value: i64,
}

/// One row of the guild land leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRanking {
    pub rank: u32,
    pub owner_id: UserId,
    pub property_count: i64,
    pub total_value: i64,
}
