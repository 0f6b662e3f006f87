use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const JOKER: Card = Card::new(Rank::Joker, Suit::Joker);

    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub const fn joker() -> Self {
        Self::JOKER
    }

    pub const fn is_joker(self) -> bool {
        self.suit.is_joker()
    }

    /// Numeric rank: 2-10 literal, J=11, Q=12, K=13, A=14, joker=0.
    pub const fn value(self) -> u8 {
        self.rank.value()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_joker() {
            return f.write_str("JOKER");
        }
        write!(f, "{}{}", self.rank, self.suit)
    }
}
