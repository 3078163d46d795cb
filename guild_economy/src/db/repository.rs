//! Repository traits for the ledger, the property registry and guild settings.
//!
//! Each mutating method is one atomic unit: implementations run the whole
//! read-check-write sequence inside a single transaction (PostgreSQL) or under a
//! single lock (in-memory), so callers never observe a half-applied change.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::economy::{
    Account, EconomyResult, HourlyReward, InterestPolicy, InterestReward, Payout, TransferReceipt,
    UserId,
};
use crate::guild::{ChannelId, GuildId, GuildSettings, NotificationTarget, RoleId};
use crate::market::{
    Acquisition, AcquisitionRequest, LocationId, OwnerRanking, Property, PropertyTransfer,
};

/// Trait for account ledger operations
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Create a zero-balance account if none exists
    async fn ensure_account(&self, user_id: UserId) -> EconomyResult<()>;

    /// Find an account by user id
    async fn find_account(&self, user_id: UserId) -> EconomyResult<Option<Account>>;

    /// Add `delta` to the balance without any floor and return the new balance
    async fn adjust_balance(&self, user_id: UserId, delta: i64) -> EconomyResult<i64>;

    /// Move `amount` from sender to receiver if the sender can cover it
    async fn transfer(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        amount: i64,
    ) -> EconomyResult<TransferReceipt>;

    /// Credit `amount` and stamp `now` unless the previous claim is within `cooldown`
    async fn claim_hourly(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        amount: i64,
        cooldown: Duration,
    ) -> EconomyResult<HourlyReward>;

    /// Credit daily interest and stamp `now` if allowed by `policy`
    async fn claim_interest(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        policy: InterestPolicy,
    ) -> EconomyResult<InterestReward>;

    /// Apply a game settlement and return the player's new balance
    async fn apply_payout(&self, payout: &Payout) -> EconomyResult<i64>;
}

/// Trait for property registry operations
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Find a property; `None` means nobody has bought it yet
    async fn find_property(
        &self,
        guild_id: GuildId,
        location_id: LocationId,
    ) -> EconomyResult<Option<Property>>;

    /// Run the full acquisition protocol atomically
    async fn acquire(&self, request: &AcquisitionRequest) -> EconomyResult<Acquisition>;

    /// Properties owned by `owner_id` in a guild, newest purchase first
    async fn properties_owned_by(
        &self,
        guild_id: GuildId,
        owner_id: UserId,
    ) -> EconomyResult<Vec<Property>>;

    /// Owners ordered by total property value, highest first
    async fn owner_ranking(&self, guild_id: GuildId, limit: i64)
    -> EconomyResult<Vec<OwnerRanking>>;

    /// Owner of the guild's earliest-bought property, who collects game commission
    async fn commission_recipient(&self, guild_id: GuildId) -> EconomyResult<Option<UserId>>;

    /// Audit trail of a property, oldest first
    async fn transfer_history(
        &self,
        guild_id: GuildId,
        location_id: LocationId,
    ) -> EconomyResult<Vec<PropertyTransfer>>;
}

/// Trait for per-guild configuration
#[async_trait]
pub trait GuildSettingsRepository: Send + Sync {
    /// Get settings for a guild
    async fn find_settings(&self, guild_id: GuildId) -> EconomyResult<Option<GuildSettings>>;

    /// Restrict commands to one channel, or lift the restriction with `None`
    async fn set_command_channel(
        &self,
        guild_id: GuildId,
        channel_id: Option<ChannelId>,
    ) -> EconomyResult<()>;

    /// Set where the daily interest reminder goes
    async fn set_notification_target(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        role_id: Option<RoleId>,
    ) -> EconomyResult<()>;

    /// Every guild with a notification channel
    async fn notification_targets(&self) -> EconomyResult<Vec<NotificationTarget>>;
}
