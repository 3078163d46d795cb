//! Economy service: balances, transfers and time-gated rewards.

use super::{
    config::EconomyConfig,
    errors::{EconomyError, EconomyResult, log_fault},
    models::{Account, HourlyReward, InterestReward, OddEvenPlay, Payout, TransferReceipt, UserId},
};
use crate::{
    clock::Clock,
    db::LedgerRepository,
    game::{Parity, dice},
};
use rand::{Rng, rng};
use std::sync::Arc;

/// Economy manager
#[derive(Clone)]
pub struct EconomyManager {
    ledger: Arc<dyn LedgerRepository>,
    clock: Arc<dyn Clock>,
    config: EconomyConfig,
}

impl EconomyManager {
    /// Create a new economy manager
    ///
    /// # Arguments
    ///
    /// * `ledger` - Account storage
    /// * `clock` - Time source for cooldowns
    /// * `config` - Reward and interest parameters
    pub fn new(
        ledger: Arc<dyn LedgerRepository>,
        clock: Arc<dyn Clock>,
        config: EconomyConfig,
    ) -> Self {
        Self {
            ledger,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// Create a zero-balance account for `user_id` if there is none. Idempotent.
    pub async fn ensure_account(&self, user_id: UserId) -> EconomyResult<()> {
        self.ledger
            .ensure_account(user_id)
            .await
            .inspect_err(|e| log_fault("ensure_account", user_id, e))
    }

    /// Full account record, created on first access
    pub async fn account(&self, user_id: UserId) -> EconomyResult<Account> {
        self.ensure_account(user_id).await?;
        Ok(self
            .ledger
            .find_account(user_id)
            .await?
            .unwrap_or_else(|| Account::new(user_id)))
    }

    pub async fn get_balance(&self, user_id: UserId) -> EconomyResult<i64> {
        Ok(self.account(user_id).await?.balance)
    }

    /// Add `delta` to a balance. There is no floor; callers check sufficiency.
    pub async fn adjust_balance(&self, user_id: UserId, delta: i64) -> EconomyResult<i64> {
        self.ensure_account(user_id).await?;
        self.ledger
            .adjust_balance(user_id, delta)
            .await
            .inspect_err(|e| log_fault("adjust_balance", user_id, e))
    }

    /// Move `amount` between two accounts.
    ///
    /// # Errors
    ///
    /// * `EconomyError::InvalidAmount` - `amount` is not positive
    /// * `EconomyError::InsufficientFunds` - sender cannot cover `amount`
    pub async fn transfer(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        amount: i64,
    ) -> EconomyResult<TransferReceipt> {
        if amount <= 0 {
            return Err(EconomyError::InvalidAmount(amount));
        }

        self.ensure_account(sender_id).await?;
        self.ensure_account(receiver_id).await?;

        let receipt = self
            .ledger
            .transfer(sender_id, receiver_id, amount)
            .await
            .inspect_err(|e| log_fault("transfer", sender_id, e))?;

        log::info!("User {sender_id} sent {amount} to user {receiver_id}");
        Ok(receipt)
    }

    /// Grant a random reward once per cooldown window.
    pub async fn claim_hourly_reward(&self, user_id: UserId) -> EconomyResult<HourlyReward> {
        self.ensure_account(user_id).await?;

        let amount = rng().random_range(self.config.hourly_reward_min..=self.config.hourly_reward_max);
        let reward = self
            .ledger
            .claim_hourly(user_id, self.clock.now(), amount, self.config.hourly_cooldown())
            .await
            .inspect_err(|e| log_fault("claim_hourly_reward", user_id, e))?;

        log::info!("User {user_id} claimed hourly reward of {amount}");
        Ok(reward)
    }

    /// Pay interest once per server-local calendar day.
    pub async fn claim_daily_interest(&self, user_id: UserId) -> EconomyResult<InterestReward> {
        self.ensure_account(user_id).await?;

        let reward = self
            .ledger
            .claim_interest(user_id, self.clock.now(), self.config.interest_policy())
            .await
            .inspect_err(|e| log_fault("claim_daily_interest", user_id, e))?;

        log::info!("User {user_id} claimed daily interest of {}", reward.interest);
        Ok(reward)
    }

    /// Administrator reward
    pub async fn grant(&self, user_id: UserId, amount: i64) -> EconomyResult<i64> {
        if amount <= 0 {
            return Err(EconomyError::InvalidAmount(amount));
        }
        let balance = self.adjust_balance(user_id, amount).await?;
        log::info!("Granted {amount} to user {user_id}");
        Ok(balance)
    }

    /// Administrator penalty. The balance may go negative.
    pub async fn fine(&self, user_id: UserId, amount: i64) -> EconomyResult<i64> {
        if amount <= 0 {
            return Err(EconomyError::InvalidAmount(amount));
        }
        let balance = self.adjust_balance(user_id, -amount).await?;
        log::info!("Fined user {user_id} {amount}");
        Ok(balance)
    }

    /// Check a wager against the current balance without reserving it.
    pub async fn validate_wager(&self, user_id: UserId, wager: i64) -> EconomyResult<()> {
        if wager <= 0 {
            return Err(EconomyError::InvalidAmount(wager));
        }

        let available = self.get_balance(user_id).await?;
        if available < wager {
            return Err(EconomyError::InsufficientFunds {
                available,
                required: wager,
            });
        }
        Ok(())
    }

    /// Apply a game settlement in one ledger transaction
    pub async fn apply_payout(&self, payout: &Payout) -> EconomyResult<i64> {
        self.ledger
            .apply_payout(payout)
            .await
            .inspect_err(|e| log_fault("apply_payout", payout.player_id, e))
    }

    /// Roll the odd/even die for `wager`.
    pub async fn play_odd_even(
        &self,
        user_id: UserId,
        choice: Parity,
        wager: i64,
    ) -> EconomyResult<OddEvenPlay> {
        self.validate_wager(user_id, wager).await?;

        let round = dice::roll_odd_even(choice, wager);
        let balance = self.adjust_balance(user_id, round.net).await?;

        log::info!(
            "User {user_id} rolled {} betting {choice} for {wager}: net {}",
            round.face,
            round.net
        );
        Ok(OddEvenPlay { round, balance })
    }
}
