//! Blackjack session coordinator.
//!
//! Drives a session through start, hit and stand, then settles it against the
//! ledger. The session leaves the table before any money moves.

use chrono::Duration;
use std::sync::Arc;

use super::{
    models::{GameSession, HitOutcome, SessionView, SettleReason, Settlement},
    table::{SessionTable, Step},
};
use crate::{
    clock::Clock,
    economy::{EconomyError, EconomyManager, EconomyResult, UserId, errors::log_fault, rules},
    game::{Deck, blackjack},
    guild::GuildId,
    market::MarketManager,
};

/// Blackjack coordinator
#[derive(Clone)]
pub struct BlackjackCoordinator {
    economy: EconomyManager,
    market: MarketManager,
    table: Arc<SessionTable>,
    clock: Arc<dyn Clock>,
}

impl BlackjackCoordinator {
    pub fn new(
        economy: EconomyManager,
        market: MarketManager,
        table: Arc<SessionTable>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            economy,
            market,
            table,
            clock,
        }
    }

    /// Start a hand with a freshly shuffled deck.
    ///
    /// # Errors
    ///
    /// * `EconomyError::SessionAlreadyActive` - the user is mid-hand
    /// * `EconomyError::InvalidAmount` - wager is not positive
    /// * `EconomyError::InsufficientFunds` - wager exceeds the balance
    pub async fn start_session(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        wager: i64,
    ) -> EconomyResult<SessionView> {
        self.start_session_with_deck(guild_id, user_id, wager, Deck::shuffled())
            .await
    }

    /// Start a hand dealt from `deck`.
    pub async fn start_session_with_deck(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        wager: i64,
        deck: Deck,
    ) -> EconomyResult<SessionView> {
        if self.table.contains(user_id).await {
            return Err(EconomyError::SessionAlreadyActive);
        }
        self.economy.validate_wager(user_id, wager).await?;

        let session = GameSession::deal(user_id, guild_id, wager, deck, self.clock.now());
        let view = self.table.try_insert(session).await?;

        log::info!("User {user_id} started blackjack in guild {guild_id} for {wager}");
        Ok(view)
    }

    /// Draw a card. Going over 21 settles the hand.
    pub async fn hit(&self, user_id: UserId) -> EconomyResult<HitOutcome> {
        match self.table.act(user_id, GameSession::hit).await? {
            Step::InProgress(view) => Ok(HitOutcome::InProgress(view)),
            Step::Finished(session, reason) => {
                Ok(HitOutcome::Settled(self.settle(*session, reason).await?))
            }
        }
    }

    /// Let the dealer play out and settle.
    pub async fn stand(&self, user_id: UserId) -> EconomyResult<Settlement> {
        match self
            .table
            .act(user_id, |session| Some(session.stand()))
            .await?
        {
            Step::Finished(session, reason) => self.settle(*session, reason).await,
            Step::InProgress(_) => Err(EconomyError::NoActiveSession),
        }
    }

    /// Snapshot of the user's hand
    pub async fn view(&self, user_id: UserId) -> EconomyResult<SessionView> {
        self.table
            .view(user_id)
            .await
            .ok_or(EconomyError::NoActiveSession)
    }

    pub async fn active_sessions(&self) -> usize {
        self.table.len().await
    }

    /// Forfeit every hand older than `ttl`. Each loses its wager.
    pub async fn expire_stale(&self, ttl: Duration) -> Vec<EconomyResult<Settlement>> {
        let cutoff = self.clock.now() - ttl;
        let stale = self.table.remove_started_before(cutoff).await;
        if !stale.is_empty() {
            log::warn!("Expiring {} abandoned blackjack sessions", stale.len());
        }

        let mut settlements = Vec::with_capacity(stale.len());
        for session in stale {
            settlements.push(self.settle(session, SettleReason::Timeout).await);
        }
        settlements
    }

    /// Score a removed session and apply the payout.
    async fn settle(&self, session: GameSession, reason: SettleReason) -> EconomyResult<Settlement> {
        let GameSession {
            user_id,
            guild_id,
            player_hand,
            dealer_hand,
            wager,
            ..
        } = session;

        let outcome = match reason {
            SettleReason::Timeout => Ok(blackjack::forfeit(wager)),
            SettleReason::Bust => blackjack::resolve(&player_hand, &dealer_hand, true, wager),
            SettleReason::Stand => blackjack::resolve(&player_hand, &dealer_hand, false, wager),
        }
        .inspect_err(|e| log_fault("settle", user_id, e))?;

        let owner = if outcome.net > 0 {
            self.market
                .commission_recipient(guild_id)
                .await
                .inspect_err(|e| log_fault("settle", user_id, e))?
        } else {
            None
        };
        let payout = rules::split_winnings(user_id, outcome.net, owner)
            .inspect_err(|e| log_fault("settle", user_id, e))?;
        let balance = self.economy.apply_payout(&payout).await?;

        log::info!(
            "User {user_id} finished blackjack in guild {guild_id} ({reason}): {} net {}",
            outcome.result,
            outcome.net
        );
        if let Some(commission) = payout.commission {
            log::info!(
                "Commission of {} paid to user {} in guild {guild_id}",
                commission.amount,
                commission.owner_id
            );
        }

        Ok(Settlement {
            user_id,
            guild_id,
            reason,
            result: outcome.result,
            wager,
            net: outcome.net,
            payout,
            player_total: blackjack::score(&player_hand),
            dealer_total: blackjack::score(&dealer_hand),
            player_hand,
            dealer_hand,
            balance,
        })
    }
}
