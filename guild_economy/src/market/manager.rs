//! Marketplace service: land valuation, acquisition and ownership queries.

use super::{
    models::{
        Acquisition, AcquisitionRequest, Holdings, LocationId, OwnerRanking, PropertyQuote,
        PropertyTransfer, TransferKind,
    },
    rules,
};
use crate::{
    clock::Clock,
    db::PropertyRepository,
    economy::{EconomyResult, UserId, errors::log_fault},
    guild::GuildId,
};
use std::sync::Arc;

/// Number of owners shown on the land leaderboard
pub const DEFAULT_RANKING_LIMIT: i64 = 10;

/// Market manager
#[derive(Clone)]
pub struct MarketManager {
    registry: Arc<dyn PropertyRepository>,
    clock: Arc<dyn Clock>,
    base_price: i64,
}

impl MarketManager {
    pub fn new(registry: Arc<dyn PropertyRepository>, clock: Arc<dyn Clock>, base_price: i64) -> Self {
        Self {
            registry,
            clock,
            base_price,
        }
    }

    /// Price of a location nobody has bought yet
    pub fn base_price(&self) -> i64 {
        self.base_price
    }

    /// Buy a location at the default base price
    pub async fn acquire_property(
        &self,
        guild_id: GuildId,
        location_id: LocationId,
        buyer_id: UserId,
    ) -> EconomyResult<Acquisition> {
        self.acquire_property_at(guild_id, location_id, buyer_id, self.base_price)
            .await
    }

    /// Buy a location.
    ///
    /// Unowned land costs `base_price`; owned land costs 1.2x its current price
    /// and the full amount goes to the previous owner. The whole exchange is
    /// one transaction.
    ///
    /// # Errors
    ///
    /// * `EconomyError::SelfPurchase` - buyer already owns it
    /// * `EconomyError::InsufficientFunds` - buyer cannot pay the asking price
    /// * `EconomyError::TransactionFailed` - storage fault; nothing was changed
    pub async fn acquire_property_at(
        &self,
        guild_id: GuildId,
        location_id: LocationId,
        buyer_id: UserId,
        base_price: i64,
    ) -> EconomyResult<Acquisition> {
        let request = AcquisitionRequest {
            guild_id,
            location_id,
            buyer_id,
            base_price,
            now: self.clock.now(),
        };

        let acquisition = self
            .registry
            .acquire(&request)
            .await
            .inspect_err(|e| log_fault("acquire_property", buyer_id, e))?;

        match acquisition.kind {
            TransferKind::Purchase => log::info!(
                "User {buyer_id} bought location {location_id} in guild {guild_id} for {}",
                acquisition.price
            ),
            TransferKind::Transfer => log::info!(
                "User {buyer_id} took over location {location_id} in guild {guild_id} from user {:?} for {}",
                acquisition.seller_id,
                acquisition.price
            ),
        }
        Ok(acquisition)
    }

    /// Current owner and prices of a location
    pub async fn property_info(
        &self,
        guild_id: GuildId,
        location_id: LocationId,
    ) -> EconomyResult<PropertyQuote> {
        let property = self.registry.find_property(guild_id, location_id).await?;
        let (_, acquisition_price) = rules::asking_price(property.as_ref(), self.base_price)?;

        Ok(match property {
            Some(property) => PropertyQuote {
                guild_id,
                location_id,
                owner_id: property.owner_id,
                current_price: property.price,
                acquisition_price,
                purchased_at: property.owner_id.map(|_| property.purchased_at),
                last_transaction_at: property.last_transaction_at,
            },
            None => PropertyQuote {
                guild_id,
                location_id,
                owner_id: None,
                current_price: self.base_price,
                acquisition_price,
                purchased_at: None,
                last_transaction_at: None,
            },
        })
    }

    /// Every location `owner_id` holds in a guild, newest purchase first
    pub async fn properties_of(&self, guild_id: GuildId, owner_id: UserId) -> EconomyResult<Holdings> {
        let properties = self.registry.properties_owned_by(guild_id, owner_id).await?;
        let total_value = properties
            .iter()
            .fold(0i64, |total, property| total.saturating_add(property.price));

        Ok(Holdings {
            owner_id,
            properties,
            total_value,
        })
    }

    /// Owners ordered by total land value
    pub async fn ranking(&self, guild_id: GuildId, limit: i64) -> EconomyResult<Vec<OwnerRanking>> {
        self.registry.owner_ranking(guild_id, limit).await
    }

    /// Owner collecting commission on game winnings in this guild
    pub async fn commission_recipient(&self, guild_id: GuildId) -> EconomyResult<Option<UserId>> {
        self.registry.commission_recipient(guild_id).await
    }

    pub async fn transfer_history(
        &self,
        guild_id: GuildId,
        location_id: LocationId,
    ) -> EconomyResult<Vec<PropertyTransfer>> {
        self.registry.transfer_history(guild_id, location_id).await
    }
}
