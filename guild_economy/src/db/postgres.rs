//! PostgreSQL repository.
#![allow(clippy::needless_raw_string_hashes)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use std::sync::Arc;

use super::{
    repository::{GuildSettingsRepository, LedgerRepository, PropertyRepository},
    timeouts::{DEFAULT_TRANSACTION_TIMEOUT, bounded},
};
use crate::economy::{
    Account, EconomyError, EconomyResult, HourlyReward, InterestPolicy, InterestReward, Payout,
    TransferReceipt, UserId, rules,
};
use crate::guild::{ChannelId, GuildId, GuildSettings, NotificationTarget, RoleId};
use crate::market::{
    Acquisition, AcquisitionRequest, LocationId, OwnerRanking, Property, PropertyTransfer,
    TransferKind, rules as market_rules,
};

/// Repository backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgEconomyRepository {
    pool: Arc<PgPool>,
    transaction_timeout: std::time::Duration,
}

impl PgEconomyRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            pool,
            transaction_timeout: DEFAULT_TRANSACTION_TIMEOUT,
        }
    }

    /// Override the per-transaction deadline
    pub fn with_transaction_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.transaction_timeout = timeout;
        self
    }

    /// Create the account if missing and lock its row for the rest of `tx`
    async fn lock_account(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
    ) -> EconomyResult<Account> {
        sqlx::query("INSERT INTO accounts (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

        let row = sqlx::query(
            r#"
            SELECT user_id, balance, last_hourly_at, last_interest_at
            FROM accounts
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(account_from_row(&row))
    }

    /// Lock several accounts in ascending id order, creating missing ones
    async fn lock_accounts(
        tx: &mut Transaction<'_, Postgres>,
        user_ids: &[UserId],
    ) -> EconomyResult<Vec<Account>> {
        let mut ids = user_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut accounts = Vec::with_capacity(ids.len());
        for user_id in ids {
            accounts.push(Self::lock_account(tx, user_id).await?);
        }
        Ok(accounts)
    }

    async fn add_to_balance(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
        delta: i64,
    ) -> EconomyResult<i64> {
        let row = sqlx::query(
            "UPDATE accounts SET balance = balance + $1 WHERE user_id = $2 RETURNING balance",
        )
        .bind(delta)
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row.get("balance"))
    }
}

fn account_from_row(row: &PgRow) -> Account {
    Account {
        user_id: row.get("user_id"),
        balance: row.get("balance"),
        last_hourly_at: row.get("last_hourly_at"),
        last_interest_at: row.get("last_interest_at"),
    }
}

fn property_from_row(row: &PgRow) -> Property {
    Property {
        guild_id: row.get("guild_id"),
        location_id: row.get("location_id"),
        owner_id: row.get("owner_id"),
        price: row.get("current_price"),
        purchased_at: row.get("purchased_at"),
        last_transaction_at: row.get("last_transaction_at"),
    }
}

fn balance_of(accounts: &[Account], user_id: UserId) -> i64 {
    accounts
        .iter()
        .find(|account| account.user_id == user_id)
        .map_or(0, |account| account.balance)
}

#[async_trait]
impl LedgerRepository for PgEconomyRepository {
    async fn ensure_account(&self, user_id: UserId) -> EconomyResult<()> {
        bounded(self.transaction_timeout, async {
            sqlx::query(
                "INSERT INTO accounts (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING",
            )
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await?;
            Ok(())
        })
        .await
    }

    async fn find_account(&self, user_id: UserId) -> EconomyResult<Option<Account>> {
        bounded(self.transaction_timeout, async {
            let row = sqlx::query(
                r#"
                SELECT user_id, balance, last_hourly_at, last_interest_at
                FROM accounts
                WHERE user_id = $1
                "#,
            )
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

            Ok(row.as_ref().map(account_from_row))
        })
        .await
    }

    async fn adjust_balance(&self, user_id: UserId, delta: i64) -> EconomyResult<i64> {
        bounded(self.transaction_timeout, async {
            let mut tx = self.pool.begin().await?;
            let account = Self::lock_account(&mut tx, user_id).await?;
            account
                .balance
                .checked_add(delta)
                .ok_or(EconomyError::InvalidAmount(delta))?;

            let balance = Self::add_to_balance(&mut tx, user_id, delta).await?;
            tx.commit().await?;
            Ok(balance)
        })
        .await
    }

    async fn transfer(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        amount: i64,
    ) -> EconomyResult<TransferReceipt> {
        bounded(self.transaction_timeout, async {
            let mut tx = self.pool.begin().await?;
            let accounts = Self::lock_accounts(&mut tx, &[sender_id, receiver_id]).await?;

            let available = balance_of(&accounts, sender_id);
            if available < amount {
                return Err(EconomyError::InsufficientFunds {
                    available,
                    required: amount,
                });
            }

            let sender_balance = Self::add_to_balance(&mut tx, sender_id, -amount).await?;
            let receiver_balance = Self::add_to_balance(&mut tx, receiver_id, amount).await?;
            tx.commit().await?;

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
        })
        .await
    }

    async fn claim_hourly(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        amount: i64,
        cooldown: Duration,
    ) -> EconomyResult<HourlyReward> {
        bounded(self.transaction_timeout, async {
            let mut tx = self.pool.begin().await?;
            let account = Self::lock_account(&mut tx, user_id).await?;

            if let Some(remaining) =
                rules::hourly_cooldown_remaining(account.last_hourly_at, now, cooldown)
            {
                return Err(EconomyError::CooldownActive { remaining });
            }

            let row = sqlx::query(
                r#"
                UPDATE accounts
                SET balance = balance + $1, last_hourly_at = $2
                WHERE user_id = $3
                RETURNING balance
                "#,
            )
            .bind(amount)
            .bind(now)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok(HourlyReward {
                amount,
                balance: row.get("balance"),
            })
        })
        .await
    }

    async fn claim_interest(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        policy: InterestPolicy,
    ) -> EconomyResult<InterestReward> {
        bounded(self.transaction_timeout, async {
            let mut tx = self.pool.begin().await?;
            let account = Self::lock_account(&mut tx, user_id).await?;

            let interest =
                rules::check_interest(account.balance, account.last_interest_at, now, &policy)?;

            let row = sqlx::query(
                r#"
                UPDATE accounts
                SET balance = balance + $1, last_interest_at = $2
                WHERE user_id = $3
                RETURNING balance
                "#,
            )
            .bind(interest)
            .bind(now)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok(InterestReward {
                interest,
                balance: row.get("balance"),
            })
        })
        .await
    }

    async fn apply_payout(&self, payout: &Payout) -> EconomyResult<i64> {
        bounded(self.transaction_timeout, async {
            let mut tx = self.pool.begin().await?;

            let mut ids = vec![payout.player_id];
            if let Some(commission) = payout.commission {
                ids.push(commission.owner_id);
            }
            Self::lock_accounts(&mut tx, &ids).await?;

            let balance = Self::add_to_balance(&mut tx, payout.player_id, payout.player_delta).await?;
            if let Some(commission) = payout.commission {
                Self::add_to_balance(&mut tx, commission.owner_id, commission.amount).await?;
            }

            tx.commit().await?;
            Ok(balance)
        })
        .await
    }
}

#[async_trait]
impl PropertyRepository for PgEconomyRepository {
    async fn find_property(
        &self,
        guild_id: GuildId,
        location_id: LocationId,
    ) -> EconomyResult<Option<Property>> {
        bounded(self.transaction_timeout, async {
            let row = sqlx::query(
                r#"
                SELECT guild_id, location_id, owner_id, current_price, purchased_at, last_transaction_at
                FROM properties
                WHERE guild_id = $1 AND location_id = $2
                "#,
            )
            .bind(guild_id)
            .bind(location_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

            Ok(row.as_ref().map(property_from_row))
        })
        .await
    }

    async fn acquire(&self, request: &AcquisitionRequest) -> EconomyResult<Acquisition> {
        bounded(self.transaction_timeout, async {
            let mut tx = self.pool.begin().await?;

            // Materialize the row so first-time buyers contend on the same lock.
            // It disappears again if the transaction rolls back.
            sqlx::query(
                r#"
                INSERT INTO properties (guild_id, location_id, owner_id, current_price, purchased_at)
                VALUES ($1, $2, NULL, $3, $4)
                ON CONFLICT (guild_id, location_id) DO NOTHING
                "#,
            )
            .bind(request.guild_id)
            .bind(request.location_id)
            .bind(request.base_price)
            .bind(request.now)
            .execute(&mut *tx)
            .await?;

            let row = sqlx::query(
                r#"
                SELECT id, guild_id, location_id, owner_id, current_price, purchased_at, last_transaction_at
                FROM properties
                WHERE guild_id = $1 AND location_id = $2
                FOR UPDATE
                "#,
            )
            .bind(request.guild_id)
            .bind(request.location_id)
            .fetch_one(&mut *tx)
            .await?;
            let property_id: i64 = row.get("id");
            let property = property_from_row(&row);

            let mut ids = vec![request.buyer_id];
            if let Some(owner_id) = property.owner_id {
                ids.push(owner_id);
            }
            let accounts = Self::lock_accounts(&mut tx, &ids).await?;

            let plan = market_rules::plan_acquisition(
                Some(&property),
                request.buyer_id,
                balance_of(&accounts, request.buyer_id),
                request.base_price,
            )?;

            let buyer_balance = Self::add_to_balance(&mut tx, request.buyer_id, -plan.price).await?;
            if let Some(seller_id) = plan.seller_id {
                Self::add_to_balance(&mut tx, seller_id, plan.price).await?;
            }

            sqlx::query(
                r#"
                UPDATE properties
                SET owner_id = $1, current_price = $2, purchased_at = $3, last_transaction_at = $3
                WHERE id = $4
                "#,
            )
            .bind(request.buyer_id)
            .bind(plan.price)
            .bind(request.now)
            .bind(property_id)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO property_transfers (property_id, seller_id, buyer_id, price, kind, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(property_id)
            .bind(plan.seller_id)
            .bind(request.buyer_id)
            .bind(plan.price)
            .bind(plan.kind.to_string())
            .bind(request.now)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;

            Ok(Acquisition {
                guild_id: request.guild_id,
                location_id: request.location_id,
                buyer_id: request.buyer_id,
                seller_id: plan.seller_id,
                price: plan.price,
                kind: plan.kind,
                buyer_balance,
            })
        })
        .await
    }

    async fn properties_owned_by(
        &self,
        guild_id: GuildId,
        owner_id: UserId,
    ) -> EconomyResult<Vec<Property>> {
        bounded(self.transaction_timeout, async {
            let rows = sqlx::query(
                r#"
                SELECT guild_id, location_id, owner_id, current_price, purchased_at, last_transaction_at
                FROM properties
                WHERE guild_id = $1 AND owner_id = $2
                ORDER BY purchased_at DESC, id DESC
                "#,
            )
            .bind(guild_id)
            .bind(owner_id)
            .fetch_all(self.pool.as_ref())
            .await?;

            Ok(rows.iter().map(property_from_row).collect())
        })
        .await
    }

    async fn owner_ranking(
        &self,
        guild_id: GuildId,
        limit: i64,
    ) -> EconomyResult<Vec<OwnerRanking>> {
        bounded(self.transaction_timeout, async {
            let rows = sqlx::query(
                r#"
                SELECT owner_id, COUNT(*) AS property_count, SUM(current_price)::BIGINT AS total_value
                FROM properties
                WHERE guild_id = $1 AND owner_id IS NOT NULL
                GROUP BY owner_id
                ORDER BY total_value DESC, owner_id ASC
                LIMIT $2
                "#,
            )
            .bind(guild_id)
            .bind(limit.max(0))
            .fetch_all(self.pool.as_ref())
            .await?;

            Ok(rows
                .iter()
                .zip(1u32..)
                .map(|(row, rank)| OwnerRanking {
                    rank,
                    owner_id: row.get("owner_id"),
                    property_count: row.get("property_count"),
                    total_value: row.get("total_value"),
                })
                .collect())
        })
        .await
    }

    async fn commission_recipient(&self, guild_id: GuildId) -> EconomyResult<Option<UserId>> {
        bounded(self.transaction_timeout, async {
            let row = sqlx::query(
                r#"
                SELECT owner_id
                FROM properties
                WHERE guild_id = $1 AND owner_id IS NOT NULL
                ORDER BY id ASC
                LIMIT 1
                "#,
            )
            .bind(guild_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

            Ok(row.map(|row| row.get("owner_id")))
        })
        .await
    }

    async fn transfer_history(
        &self,
        guild_id: GuildId,
        location_id: LocationId,
    ) -> EconomyResult<Vec<PropertyTransfer>> {
        bounded(self.transaction_timeout, async {
            let rows = sqlx::query(
                r#"
                SELECT t.id, p.guild_id, p.location_id, t.seller_id, t.buyer_id, t.price, t.kind, t.created_at
                FROM property_transfers t
                JOIN properties p ON p.id = t.property_id
                WHERE p.guild_id = $1 AND p.location_id = $2
                ORDER BY t.id ASC
                "#,
            )
            .bind(guild_id)
            .bind(location_id)
            .fetch_all(self.pool.as_ref())
            .await?;

            rows.iter()
                .map(|row| {
                    let kind: String = row.get("kind");
                    Ok(PropertyTransfer {
                        id: row.get("id"),
                        guild_id: row.get("guild_id"),
                        location_id: row.get("location_id"),
                        seller_id: row.get("seller_id"),
                        buyer_id: row.get("buyer_id"),
                        price: row.get("price"),
                        kind: kind
                            .parse::<TransferKind>()
                            .map_err(EconomyError::TransactionFailed)?,
                        created_at: row.get("created_at"),
                    })
                })
                .collect()
        })
        .await
    }
}

#[async_trait]
impl GuildSettingsRepository for PgEconomyRepository {
    async fn find_settings(&self, guild_id: GuildId) -> EconomyResult<Option<GuildSettings>> {
        bounded(self.transaction_timeout, async {
            let row = sqlx::query(
                r#"
                SELECT guild_id, command_channel_id, notification_channel_id, notification_role_id
                FROM guild_settings
                WHERE guild_id = $1
                "#,
            )
            .bind(guild_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

            Ok(row.map(|row| GuildSettings {
                guild_id: row.get("guild_id"),
                command_channel_id: row.get("command_channel_id"),
                notification_channel_id: row.get("notification_channel_id"),
                notification_role_id: row.get("notification_role_id"),
            }))
        })
        .await
    }

    async fn set_command_channel(
        &self,
        guild_id: GuildId,
        channel_id: Option<ChannelId>,
    ) -> EconomyResult<()> {
        bounded(self.transaction_timeout, async {
            sqlx::query(
                r#"
                INSERT INTO guild_settings (guild_id, command_channel_id)
                VALUES ($1, $2)
                ON CONFLICT (guild_id) DO UPDATE SET command_channel_id = EXCLUDED.command_channel_id
                "#,
            )
            .bind(guild_id)
            .bind(channel_id)
            .execute(self.pool.as_ref())
            .await?;
            Ok(())
        })
        .await
    }

    async fn set_notification_target(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        role_id: Option<RoleId>,
    ) -> EconomyResult<()> {
        bounded(self.transaction_timeout, async {
            sqlx::query(
                r#"
                INSERT INTO guild_settings (guild_id, notification_channel_id, notification_role_id)
                VALUES ($1, $2, $3)
                ON CONFLICT (guild_id) DO UPDATE
                SET notification_channel_id = EXCLUDED.notification_channel_id,
                    notification_role_id = EXCLUDED.notification_role_id
                "#,
            )
            .bind(guild_id)
            .bind(channel_id)
            .bind(role_id)
            .execute(self.pool.as_ref())
            .await?;
            Ok(())
        })
        .await
    }

    async fn notification_targets(&self) -> EconomyResult<Vec<NotificationTarget>> {
        bounded(self.transaction_timeout, async {
            let rows = sqlx::query(
                r#"
                SELECT guild_id, notification_channel_id, notification_role_id
                FROM guild_settings
                WHERE notification_channel_id IS NOT NULL
                ORDER BY guild_id
                "#,
            )
            .fetch_all(self.pool.as_ref())
            .await?;

            Ok(rows
                .iter()
                .map(|row| NotificationTarget {
                    guild_id: row.get("guild_id"),
                    channel_id: row.get("notification_channel_id"),
                    role_id: row.get("notification_role_id"),
                })
                .collect())
        })
        .await
    }
}
