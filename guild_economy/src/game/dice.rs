//! Odd/even dice game.

use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    Odd,
    Even,
}

impl Parity {
    pub fn of(face: u8) -> Self {
        if face % 2 == 1 { Self::Odd } else { Self::Even }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Odd => write!(f, "odd"),
            Self::Even => write!(f, "even"),
        }
    }
}

impl FromStr for Parity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "odd" => Ok(Self::Odd),
            "even" => Ok(Self::Even),
            other => Err(format!("expected odd or even, got {other}")),
        }
    }
}

/// One resolved roll.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct OddEvenRound {
    pub face: u8,
    pub choice: Parity,
    pub won: bool,
    /// Balance change for the player
    pub net: i64,
}

/// A correct guess nets three quarters of the wager, truncated.
pub fn winnings_for(wager: i64) -> i64 {
    wager.saturating_mul(3) / 4
}

/// Score a roll of `face` for a player who guessed `choice`.
pub fn settle_roll(face: u8, choice: Parity, wager: i64) -> OddEvenRound {
    let won = Parity::of(face) == choice;
    OddEvenRound {
        face,
        choice,
        won,
        net: if won { winnings_for(wager) } else { -wager },
    }
}

/// Roll one die and score it.
pub fn roll_odd_even(choice: Parity, wager: i64) -> OddEvenRound {
    let face = rng().random_range(1..=6);
    settle_roll(face, choice, wager)
}
