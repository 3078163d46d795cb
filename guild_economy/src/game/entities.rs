use rand::{rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Club, Suit::Spade, Suit::Diamond, Suit::Heart];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values.
pub type Value = u8;

/// A card is a tuple of a value (ace=1u8 ... king=13u8) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl Card {
    pub fn is_ace(&self) -> bool {
        self.0 == 1
    }

    /// Blackjack points with the ace counted low. Faces are worth 10.
    pub fn points(&self) -> u32 {
        u32::from(self.0.min(10))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            1 => "A",
            11 => "J",
            12 => "Q",
            13 => "K",
            v => &v.to_string(),
        };
        write!(f, "{value}{}", self.1)
    }
}

/// A draw pile. Cards come off the front in order.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
    pub deck_idx: usize,
}

impl Deck {
    /// All 52 cards, uniformly shuffled.
    pub fn shuffled() -> Self {
        let mut deck = Self::default();
        deck.shuffle();
        deck
    }

    /// A deck that deals `cards` in the given order before falling back to a
    /// fresh shuffled pile.
    pub fn stacked(cards: Vec<Card>) -> Self {
        Self { cards, deck_idx: 0 }
    }

    /// Take the next card. An exhausted pile is replaced by a new shuffled one.
    pub fn draw(&mut self) -> Card {
        if self.remaining() == 0 {
            *self = Self::shuffled();
        }
        let card = self.cards[self.deck_idx];
        self.deck_idx += 1;
        card
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.deck_idx)
    }

    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut rng());
        self.deck_idx = 0;
    }
}

impl Default for Deck {
    /// An ordered, unshuffled 52-card deck.
    fn default() -> Self {
        let cards = (1u8..=13)
            .flat_map(|value| Suit::ALL.into_iter().map(move |suit| Card(value, suit)))
            .collect();
        Self { cards, deck_idx: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_deck_has_52_unique_cards() {
        let deck = Deck::shuffled();
        assert_eq!(deck.remaining(), 52);
        let unique: HashSet<Card> = deck.cards.iter().copied().collect();
        assert_eq!(unique.len(), 52);
    }

    #[test]
    fn test_draw_removes_cards() {
        let mut deck = Deck::shuffled();
        let mut seen = HashSet::new();
        for i in 0..52 {
            assert_eq!(deck.remaining(), 52 - i);
            assert!(seen.insert(deck.draw()));
        }
        assert_eq!(deck.remaining(), 0);
    }

    #[test]
    fn test_exhausted_deck_refills() {
        let mut deck = Deck::stacked(vec![Card(1, Suit::Heart)]);
        assert_eq!(deck.draw(), Card(1, Suit::Heart));
        deck.draw();
        assert_eq!(deck.remaining(), 51);
    }

    #[test]
    fn test_stacked_deck_order() {
        let mut deck = Deck::stacked(vec![Card(13, Suit::Club), Card(2, Suit::Spade)]);
        assert_eq!(deck.draw(), Card(13, Suit::Club));
        assert_eq!(deck.draw(), Card(2, Suit::Spade));
    }

    #[test]
    fn test_points() {
        assert_eq!(Card(1, Suit::Club).points(), 1);
        assert_eq!(Card(9, Suit::Club).points(), 9);
        assert_eq!(Card(10, Suit::Club).points(), 10);
        assert_eq!(Card(13, Suit::Club).points(), 10);
    }

    #[test]
    fn test_card_display() {
        assert_eq!(Card(1, Suit::Spade).to_string(), "A♠");
        assert_eq!(Card(12, Suit::Heart).to_string(), "Q♥");
        assert_eq!(Card(7, Suit::Diamond).to_string(), "7♦");
    }
}
