//! Blackjack scoring and outcome resolution.
//!
//! Everything here is pure: the session coordinator feeds hands in and applies
//! the resulting net change to the ledger.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::entities::Card;
use crate::economy::{EconomyError, EconomyResult};

/// Highest total that does not bust.
pub const BLACKJACK: u32 = 21;
/// The dealer keeps drawing while below this total.
pub const DEALER_STANDS_AT: u32 = 17;

/// Hand total with aces resolved greedily.
///
/// Non-ace cards are summed first; each ace then counts 11 if that keeps the
/// total at or under 21, otherwise 1.
pub fn score(hand: &[Card]) -> u32 {
    let (aces, others): (Vec<&Card>, Vec<&Card>) = hand.iter().partition(|card| card.is_ace());
    let mut total: u32 = others.iter().map(|card| card.points()).sum();
    for _ in aces {
        total += if total + 11 <= BLACKJACK { 11 } else { 1 };
    }
    total
}

/// Exactly two cards: one ace and one ten-value card.
pub fn is_natural(hand: &[Card]) -> bool {
    hand.len() == 2
        && hand.iter().any(Card::is_ace)
        && hand.iter().any(|card| card.points() == 10)
}

pub fn is_bust(hand: &[Card]) -> bool {
    score(hand) > BLACKJACK
}

/// Whether the dealer must draw another card.
pub fn dealer_should_draw(hand: &[Card]) -> bool {
    score(hand) < DEALER_STANDS_AT
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    /// Player went over 21
    Bust,
    /// Player natural against a non-natural dealer
    Blackjack,
    /// Dealer natural against a non-natural player
    DealerBlackjack,
    /// Dealer went over 21
    DealerBust,
    Win,
    Loss,
    Push,
    /// Session abandoned past its time limit
    Forfeit,
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Bust => "bust",
            Self::Blackjack => "blackjack",
            Self::DealerBlackjack => "dealer blackjack",
            Self::DealerBust => "dealer bust",
            Self::Win => "win",
            Self::Loss => "loss",
            Self::Push => "push",
            Self::Forfeit => "forfeit",
        };
        write!(f, "{repr}")
    }
}

/// Result of a finished hand and the player's net change before commission.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Outcome {
    pub result: GameResult,
    pub net: i64,
}

/// 1.5x the wager, truncated. Fails when the payout does not fit an `i64`.
pub fn natural_payout(wager: i64) -> EconomyResult<i64> {
    let payout = i128::from(wager) * 3 / 2;
    i64::try_from(payout).map_err(|_| EconomyError::InvalidAmount(wager))
}

/// An abandoned hand loses the wager, like a bust.
pub fn forfeit(wager: i64) -> Outcome {
    Outcome {
        result: GameResult::Forfeit,
        net: -wager,
    }
}

/// Decide a finished hand.
///
/// Naturals are checked before totals, so a dealer natural beats a player's
/// drawn 21 and costs the player 1.5x.
pub fn resolve(
    player: &[Card],
    dealer: &[Card],
    busted: bool,
    wager: i64,
) -> EconomyResult<Outcome> {
    let (result, net) = if busted {
        (GameResult::Bust, -wager)
    } else {
        match (is_natural(player), is_natural(dealer)) {
            (true, true) => (GameResult::Push, 0),
            (true, false) => (GameResult::Blackjack, natural_payout(wager)?),
            (false, true) => (GameResult::DealerBlackjack, -natural_payout(wager)?),
            (false, false) => {
                let (player_total, dealer_total) = (score(player), score(dealer));
                if dealer_total > BLACKJACK {
                    (GameResult::DealerBust, wager)
                } else if player_total > dealer_total {
                    (GameResult::Win, wager)
                } else if player_total < dealer_total {
                    (GameResult::Loss, -wager)
                } else {
                    (GameResult::Push, 0)
                }
            }
        }
    };

    Ok(Outcome { result, net })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Suit;

    fn hand(values: &[u8]) -> Vec<Card> {
        values.iter().map(|v| Card(*v, Suit::Spade)).collect()
    }

    #[test]
    fn test_score_faces_are_ten() {
        assert_eq!(score(&hand(&[11, 12])), 20);
        assert_eq!(score(&hand(&[13, 5, 2])), 17);
    }

    #[test]
    fn test_score_aces_greedy() {
        assert_eq!(score(&hand(&[1, 13])), 21);
        assert_eq!(score(&hand(&[1, 1])), 12);
        assert_eq!(score(&hand(&[1, 1, 9])), 21);
        assert_eq!(score(&hand(&[1, 5, 10])), 16);
        assert_eq!(score(&hand(&[5, 1, 10])), 16);
        assert_eq!(score(&hand(&[1, 1, 1, 1])), 14);
    }

    #[test]
    fn test_natural_requires_two_cards() {
        assert!(is_natural(&hand(&[1, 10])));
        assert!(is_natural(&hand(&[12, 1])));
        assert!(!is_natural(&hand(&[1, 9])));
        assert!(!is_natural(&hand(&[1, 5, 5])));
        assert!(!is_natural(&hand(&[10, 13])));
    }

    #[test]
    fn test_natural_beats_nineteen() {
        let outcome = resolve(&hand(&[1, 13]), &hand(&[9, 10]), false, 100).unwrap();
        assert_eq!(outcome.result, GameResult::Blackjack);
        assert_eq!(outcome.net, 150);
    }

    #[test]
    fn test_natural_payout_truncates() {
        let outcome = resolve(&hand(&[1, 13]), &hand(&[9, 10]), false, 5).unwrap();
        assert_eq!(outcome.net, 7);
    }

    #[test]
    fn test_both_naturals_push() {
        let outcome = resolve(&hand(&[1, 13]), &hand(&[10, 1]), false, 100).unwrap();
        assert_eq!(outcome.result, GameResult::Push);
        assert_eq!(outcome.net, 0);
    }

    #[test]
    fn test_dealer_natural_costs_one_and_a_half() {
        let outcome = resolve(&hand(&[7, 7, 7]), &hand(&[1, 12]), false, 100).unwrap();
        assert_eq!(outcome.result, GameResult::DealerBlackjack);
        assert_eq!(outcome.net, -150);
    }

    #[test]
    fn test_bust_loses_wager() {
        let outcome = resolve(&hand(&[10, 9, 5]), &hand(&[1, 12]), true, 100).unwrap();
        assert_eq!(outcome.result, GameResult::Bust);
        assert_eq!(outcome.net, -100);
    }

    #[test]
    fn test_dealer_bust_pays_even() {
        let outcome = resolve(&hand(&[10, 2]), &hand(&[10, 6, 9]), false, 100).unwrap();
        assert_eq!(outcome.result, GameResult::DealerBust);
        assert_eq!(outcome.net, 100);
    }

    #[test]
    fn test_totals_compare() {
        assert_eq!(resolve(&hand(&[10, 9]), &hand(&[10, 7]), false, 40).unwrap().net, 40);
        assert_eq!(resolve(&hand(&[10, 7]), &hand(&[10, 9]), false, 40).unwrap().net, -40);
        let push = resolve(&hand(&[10, 8]), &hand(&[9, 9]), false, 40).unwrap();
        assert_eq!(push.result, GameResult::Push);
        assert_eq!(push.net, 0);
    }

    #[test]
    fn test_natural_payout_beyond_i64_is_rejected() {
        assert_eq!(natural_payout(i64::MAX / 3).unwrap(), i64::MAX / 3 * 3 / 2);
        assert!(matches!(
            natural_payout(i64::MAX),
            Err(EconomyError::InvalidAmount(i64::MAX))
        ));
        assert!(resolve(&hand(&[1, 13]), &hand(&[9, 10]), false, i64::MAX).is_err());
        // Even-money results still settle at any wager
        let outcome = resolve(&hand(&[10, 9]), &hand(&[10, 7]), false, i64::MAX).unwrap();
        assert_eq!(outcome.net, i64::MAX);
    }

    #[test]
    fn test_dealer_draw_rule() {
        assert!(dealer_should_draw(&hand(&[10, 6])));
        assert!(!dealer_should_draw(&hand(&[10, 7])));
        assert!(!dealer_should_draw(&hand(&[1, 6])));
    }
}
