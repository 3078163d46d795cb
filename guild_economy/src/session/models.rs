//! Blackjack session data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    economy::{Payout, UserId},
    game::{Card, Deck, GameResult, blackjack},
    guild::GuildId,
};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Waiting for the player's next action
    Active,
    /// Finished; about to be removed from the table
    Settled,
}

/// Why a session ended
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleReason {
    /// Player went over 21 on a hit
    Bust,
    /// Player stood and the dealer played out
    Stand,
    /// Player stopped responding
    Timeout,
}

impl fmt::Display for SettleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bust => write!(f, "bust"),
            Self::Stand => write!(f, "stand"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

/// One user's in-progress hand. Lives only in process memory.
#[derive(Clone, Debug)]
pub struct GameSession {
    pub user_id: UserId,
    pub guild_id: GuildId,
    pub deck: Deck,
    pub player_hand: Vec<Card>,
    pub dealer_hand: Vec<Card>,
    /// Validated against the balance at start, not reserved
    pub wager: i64,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
}

impl GameSession {
    /// Deal two cards each, player first.
    pub fn deal(
        user_id: UserId,
        guild_id: GuildId,
        wager: i64,
        mut deck: Deck,
        started_at: DateTime<Utc>,
    ) -> Self {
        let player_hand = vec![deck.draw(), deck.draw()];
        let dealer_hand = vec![deck.draw(), deck.draw()];
        Self {
            user_id,
            guild_id,
            deck,
            player_hand,
            dealer_hand,
            wager,
            status: SessionStatus::Active,
            started_at,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Draw for the player. Returns `Bust` when the hand goes over 21.
    pub fn hit(&mut self) -> Option<SettleReason> {
        let card = self.deck.draw();
        self.player_hand.push(card);
        if blackjack::is_bust(&self.player_hand) {
            self.status = SessionStatus::Settled;
            Some(SettleReason::Bust)
        } else {
            None
        }
    }

    /// Play out the dealer's hand and finish.
    pub fn stand(&mut self) -> SettleReason {
        while blackjack::dealer_should_draw(&self.dealer_hand) {
            let card = self.deck.draw();
            self.dealer_hand.push(card);
        }
        self.status = SessionStatus::Settled;
        SettleReason::Stand
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            user_id: self.user_id,
            guild_id: self.guild_id,
            wager: self.wager,
            player_hand: self.player_hand.clone(),
            player_total: blackjack::score(&self.player_hand),
            dealer_upcard: self.dealer_hand.first().copied(),
            started_at: self.started_at,
        }
    }
}

/// What the player may see of an in-progress hand. The dealer's hole card
/// stays hidden.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SessionView {
    pub user_id: UserId,
    pub guild_id: GuildId,
    pub wager: i64,
    pub player_hand: Vec<Card>,
    pub player_total: u32,
    pub dealer_upcard: Option<Card>,
    pub started_at: DateTime<Utc>,
}

/// A finished hand with the money moved for it
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Settlement {
    pub user_id: UserId,
    pub guild_id: GuildId,
    pub reason: SettleReason,
    pub result: GameResult,
    pub wager: i64,
    /// Player's net before commission
    pub net: i64,
    pub payout: Payout,
    pub player_hand: Vec<Card>,
    pub player_total: u32,
    pub dealer_hand: Vec<Card>,
    pub dealer_total: u32,
    /// Player balance after the payout
    pub balance: i64,
}

/// Result of a hit
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum HitOutcome {
    InProgress(SessionView),
    Settled(Settlement),
}
