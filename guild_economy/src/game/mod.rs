//! Wagering game engine: cards, blackjack scoring and the odd/even dice game.
//!
//! The engine is pure. Balances and session bookkeeping live in
//! [`crate::economy`] and [`crate::session`].

pub mod blackjack;
pub mod dice;
pub mod entities;

pub use blackjack::{GameResult, Outcome, is_natural, resolve, score};
pub use dice::{OddEvenRound, Parity};
pub use entities::{Card, Deck, Suit, Value};
