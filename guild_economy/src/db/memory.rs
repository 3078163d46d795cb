//! In-memory repository used by tests and the `--memory` server mode.
//!
//! All state lives behind one `tokio::sync::Mutex`; holding it for the whole
//! operation gives the same all-or-nothing behavior as a database transaction.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

use super::repository::{GuildSettingsRepository, LedgerRepository, PropertyRepository};
use crate::economy::{
    Account, EconomyError, EconomyResult, HourlyReward, InterestPolicy, InterestReward, Payout,
    TransferReceipt, UserId, rules,
};
use crate::guild::{ChannelId, GuildId, GuildSettings, NotificationTarget, RoleId};
use crate::market::{
    Acquisition, AcquisitionRequest, LocationId, OwnerRanking, Property, PropertyTransfer,
    rules as market_rules,
};

#[derive(Debug)]
struct StoredProperty {
    /// Creation order, used to pick the commission recipient
    id: i64,
    property: Property,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<UserId, Account>,
    properties: BTreeMap<(GuildId, LocationId), StoredProperty>,
    transfers: Vec<PropertyTransfer>,
    settings: HashMap<GuildId, GuildSettings>,
    next_property_id: i64,
    pending_faults: usize,
}

impl State {
    fn account_mut(&mut self, user_id: UserId) -> &mut Account {
        self.accounts
            .entry(user_id)
            .or_insert_with(|| Account::new(user_id))
    }

    fn balance_of(&self, user_id: UserId) -> i64 {
        self.accounts.get(&user_id).map_or(0, |account| account.balance)
    }

    /// Fail the current operation if a fault was injected. Called after all
    /// checks and before the first write.
    fn commit_point(&mut self) -> EconomyResult<()> {
        if self.pending_faults > 0 {
            self.pending_faults -= 1;
            return Err(EconomyError::TransactionFailed(
                "injected storage fault".to_string(),
            ));
        }
        Ok(())
    }

    fn credit(&mut self, user_id: UserId, delta: i64) -> EconomyResult<i64> {
        let account = self.account_mut(user_id);
        account.balance = account
            .balance
            .checked_add(delta)
            .ok_or(EconomyError::InvalidAmount(delta))?;
        Ok(account.balance)
    }
}

/// Repository keeping every table in process memory
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` mutating operations fail with `TransactionFailed`
    /// after their checks pass and before anything is written.
    pub async fn inject_fault(&self, count: usize) {
        self.state.lock().await.pending_faults = count;
    }
}

#[async_trait]
impl LedgerRepository for MemoryRepository {
    async fn ensure_account(&self, user_id: UserId) -> EconomyResult<()> {
        self.state.lock().await.account_mut(user_id);
        Ok(())
    }

    async fn find_account(&self, user_id: UserId) -> EconomyResult<Option<Account>> {
        Ok(self.state.lock().await.accounts.get(&user_id).cloned())
    }

    async fn adjust_balance(&self, user_id: UserId, delta: i64) -> EconomyResult<i64> {
        let mut state = self.state.lock().await;
        state
            .balance_of(user_id)
            .checked_add(delta)
            .ok_or(EconomyError::InvalidAmount(delta))?;
        state.commit_point()?;
        state.credit(user_id, delta)
    }

    async fn transfer(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        amount: i64,
    ) -> EconomyResult<TransferReceipt> {
        let mut state = self.state.lock().await;

        let available = state.balance_of(sender_id);
        if available < amount {
            return Err(EconomyError::InsufficientFunds {
                available,
                required: amount,
            });
        }
        state
            .balance_of(receiver_id)
            .checked_add(amount)
            .ok_or(EconomyError::InvalidAmount(amount))?;

        state.commit_point()?;

        state.account_mut(receiver_id);
        let sender_balance = state.credit(sender_id, -amount)?;
        let receiver_balance = state.credit(receiver_id, amount)?;

        Ok(TransferReceipt {
            sender_id,
            receiver_id,
            amount,
            sender_balance: if sender_id == receiver_id {
                receiver_balance
            } else {
                sender_balance
            },
            receiver_balance,
        })
    }

    async fn claim_hourly(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        amount: i64,
        cooldown: Duration,
    ) -> EconomyResult<HourlyReward> {
        let mut state = self.state.lock().await;

        let last = state.accounts.get(&user_id).and_then(|a| a.last_hourly_at);
        if let Some(remaining) = rules::hourly_cooldown_remaining(last, now, cooldown) {
            return Err(EconomyError::CooldownActive { remaining });
        }

        state.commit_point()?;

        let balance = state.credit(user_id, amount)?;
        state.account_mut(user_id).last_hourly_at = Some(now);
        Ok(HourlyReward { amount, balance })
    }

    async fn claim_interest(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        policy: InterestPolicy,
    ) -> EconomyResult<InterestReward> {
        let mut state = self.state.lock().await;

        let (balance, last) = state
            .accounts
            .get(&user_id)
            .map_or((0, None), |a| (a.balance, a.last_interest_at));
        let interest = rules::check_interest(balance, last, now, &policy)?;

        state.commit_point()?;

        let balance = state.credit(user_id, interest)?;
        state.account_mut(user_id).last_interest_at = Some(now);
        Ok(InterestReward { interest, balance })
    }

    async fn apply_payout(&self, payout: &Payout) -> EconomyResult<i64> {
        let mut state = self.state.lock().await;
        state.commit_point()?;

        let balance = state.credit(payout.player_id, payout.player_delta)?;
        if let Some(commission) = payout.commission {
            state.credit(commission.owner_id, commission.amount)?;
        }
        Ok(balance)
    }
}

#[async_trait]
impl PropertyRepository for MemoryRepository {
    async fn find_property(
        &self,
        guild_id: GuildId,
        location_id: LocationId,
    ) -> EconomyResult<Option<Property>> {
        Ok(self
            .state
            .lock()
            .await
            .properties
            .get(&(guild_id, location_id))
            .map(|stored| stored.property.clone()))
    }

    async fn acquire(&self, request: &AcquisitionRequest) -> EconomyResult<Acquisition> {
        let mut state = self.state.lock().await;
        let key = (request.guild_id, request.location_id);

        let plan = market_rules::plan_acquisition(
            state.properties.get(&key).map(|stored| &stored.property),
            request.buyer_id,
            state.balance_of(request.buyer_id),
            request.base_price,
        )?;

        state.commit_point()?;

        let buyer_balance = state.credit(request.buyer_id, -plan.price)?;
        if let Some(seller_id) = plan.seller_id {
            state.credit(seller_id, plan.price)?;
        }

        let property = Property {
            guild_id: request.guild_id,
            location_id: request.location_id,
            owner_id: Some(request.buyer_id),
            price: plan.price,
            purchased_at: request.now,
            last_transaction_at: Some(request.now),
        };
        match state.properties.get_mut(&key) {
            Some(stored) => stored.property = property,
            None => {
                state.next_property_id += 1;
                let id = state.next_property_id;
                state.properties.insert(key, StoredProperty { id, property });
            }
        }

        let id = state.transfers.len() as i64 + 1;
        state.transfers.push(PropertyTransfer {
            id,
            guild_id: request.guild_id,
            location_id: request.location_id,
            seller_id: plan.seller_id,
            buyer_id: request.buyer_id,
            price: plan.price,
            kind: plan.kind,
            created_at: request.now,
        });

        Ok(Acquisition {
            guild_id: request.guild_id,
            location_id: request.location_id,
            buyer_id: request.buyer_id,
            seller_id: plan.seller_id,
            price: plan.price,
            kind: plan.kind,
            buyer_balance,
        })
    }

    async fn properties_owned_by(
        &self,
        guild_id: GuildId,
        owner_id: UserId,
    ) -> EconomyResult<Vec<Property>> {
        let state = self.state.lock().await;
        let mut owned: Vec<&StoredProperty> = state
            .properties
            .values()
            .filter(|s| s.property.guild_id == guild_id && s.property.owner_id == Some(owner_id))
            .collect();
        owned.sort_by(|a, b| {
            b.property
                .purchased_at
                .cmp(&a.property.purchased_at)
                .then(b.id.cmp(&a.id))
        });
        Ok(owned.into_iter().map(|s| s.property.clone()).collect())
    }

    async fn owner_ranking(
        &self,
        guild_id: GuildId,
        limit: i64,
    ) -> EconomyResult<Vec<OwnerRanking>> {
        let state = self.state.lock().await;

        let mut totals: HashMap<UserId, (i64, i64)> = HashMap::new();
        for stored in state.properties.values() {
            let property = &stored.property;
            if property.guild_id != guild_id {
                continue;
            }
            if let Some(owner_id) = property.owner_id {
                let entry = totals.entry(owner_id).or_default();
                entry.0 += 1;
                entry.1 = entry.1.saturating_add(property.price);
            }
        }

        let mut rows: Vec<(UserId, i64, i64)> = totals
            .into_iter()
            .map(|(owner_id, (count, total))| (owner_id, count, total))
            .collect();
        rows.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));

        Ok(rows
            .into_iter()
            .take(usize::try_from(limit.max(0)).unwrap_or(usize::MAX))
            .zip(1u32..)
            .map(|((owner_id, property_count, total_value), rank)| OwnerRanking {
                rank,
                owner_id,
                property_count,
                total_value,
            })
            .collect())
    }

    async fn commission_recipient(&self, guild_id: GuildId) -> EconomyResult<Option<UserId>> {
        let state = self.state.lock().await;
        Ok(state
            .properties
            .values()
            .filter(|s| s.property.guild_id == guild_id)
            .filter_map(|s| s.property.owner_id.map(|owner| (s.id, owner)))
            .min_by_key(|(id, _)| *id)
            .map(|(_, owner)| owner))
    }

    async fn transfer_history(
        &self,
        guild_id: GuildId,
        location_id: LocationId,
    ) -> EconomyResult<Vec<PropertyTransfer>> {
        let state = self.state.lock().await;
        Ok(state
            .transfers
            .iter()
            .filter(|t| t.guild_id == guild_id && t.location_id == location_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GuildSettingsRepository for MemoryRepository {
    async fn find_settings(&self, guild_id: GuildId) -> EconomyResult<Option<GuildSettings>> {
        Ok(self.state.lock().await.settings.get(&guild_id).cloned())
    }

    async fn set_command_channel(
        &self,
        guild_id: GuildId,
        channel_id: Option<ChannelId>,
    ) -> EconomyResult<()> {
        let mut state = self.state.lock().await;
        state
            .settings
            .entry(guild_id)
            .or_insert_with(|| GuildSettings::new(guild_id))
            .command_channel_id = channel_id;
        Ok(())
    }

    async fn set_notification_target(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        role_id: Option<RoleId>,
    ) -> EconomyResult<()> {
        let mut state = self.state.lock().await;
        let settings = state
            .settings
            .entry(guild_id)
            .or_insert_with(|| GuildSettings::new(guild_id));
        settings.notification_channel_id = Some(channel_id);
        settings.notification_role_id = role_id;
        Ok(())
    }

    async fn notification_targets(&self) -> EconomyResult<Vec<NotificationTarget>> {
        let state = self.state.lock().await;
        let mut targets: Vec<NotificationTarget> = state
            .settings
            .values()
            .filter_map(GuildSettings::notification_target)
            .collect();
        targets.sort_by_key(|target| target.guild_id);
        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn request(buyer_id: UserId, location_id: LocationId) -> AcquisitionRequest {
        AcquisitionRequest {
            guild_id: 1,
            location_id,
            buyer_id,
            base_price: 1_000_000,
            now: now(),
        }
    }

    #[tokio::test]
    async fn test_ensure_account_is_idempotent() {
        let repo = MemoryRepository::new();
        repo.ensure_account(7).await.unwrap();
        repo.adjust_balance(7, 50).await.unwrap();
        repo.ensure_account(7).await.unwrap();
        assert_eq!(repo.find_account(7).await.unwrap().unwrap().balance, 50);
    }

    #[tokio::test]
    async fn test_adjust_balance_has_no_floor() {
        let repo = MemoryRepository::new();
        assert_eq!(repo.adjust_balance(1, -250).await.unwrap(), -250);
    }

    #[tokio::test]
    async fn test_fault_leaves_state_untouched() {
        let repo = MemoryRepository::new();
        repo.adjust_balance(1, 100).await.unwrap();
        repo.inject_fault(1).await;

        let err = repo.transfer(1, 2, 40).await.unwrap_err();
        assert!(matches!(err, EconomyError::TransactionFailed(_)));
        assert_eq!(repo.find_account(1).await.unwrap().unwrap().balance, 100);
        assert!(repo.find_account(2).await.unwrap().is_none());

        // Fault consumed
        repo.transfer(1, 2, 40).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_acquisition_rolls_back() {
        let repo = MemoryRepository::new();
        repo.adjust_balance(5, 2_000_000).await.unwrap();
        repo.inject_fault(1).await;

        assert!(repo.acquire(&request(5, 10)).await.is_err());
        assert!(repo.find_property(1, 10).await.unwrap().is_none());
        assert!(repo.transfer_history(1, 10).await.unwrap().is_empty());
        assert_eq!(repo.find_account(5).await.unwrap().unwrap().balance, 2_000_000);
    }

    #[tokio::test]
    async fn test_commission_recipient_is_first_property_owner() {
        let repo = MemoryRepository::new();
        repo.adjust_balance(1, 5_000_000).await.unwrap();
        repo.adjust_balance(2, 5_000_000).await.unwrap();

        assert_eq!(repo.commission_recipient(1).await.unwrap(), None);

        repo.acquire(&request(1, 10)).await.unwrap();
        repo.acquire(&request(2, 20)).await.unwrap();
        assert_eq!(repo.commission_recipient(1).await.unwrap(), Some(1));

        // Taking over the first location moves the commission with it
        repo.acquire(&request(2, 10)).await.unwrap();
        assert_eq!(repo.commission_recipient(1).await.unwrap(), Some(2));
        assert_eq!(repo.commission_recipient(2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_notification_targets_skip_unconfigured() {
        let repo = MemoryRepository::new();
        repo.set_command_channel(1, Some(5)).await.unwrap();
        repo.set_notification_target(2, 9, Some(3)).await.unwrap();

        let targets = repo.notification_targets().await.unwrap();
        assert_eq!(
            targets,
            vec![NotificationTarget {
                guild_id: 2,
                channel_id: 9,
                role_id: Some(3)
            }]
        );
    }
}
