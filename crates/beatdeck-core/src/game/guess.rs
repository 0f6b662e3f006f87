use crate::model::card::Card;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Higher,
    Lower,
}

impl Direction {
    pub const BOTH: [Direction; 2] = [Direction::Higher, Direction::Lower];

    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Higher => "higher",
            Direction::Lower => "lower",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "higher" | "h" | "hi" => Ok(Direction::Higher),
            "lower" | "l" | "lo" => Ok(Direction::Lower),
            _ => Err(()),
        }
    }
}

/// Decides whether `drawn` placed on `top` satisfies the guess.
///
/// Jokers short-circuit before the equality check, so joker pairs never tie.
/// Equal ranked values always burn, whichever direction was called.
pub fn evaluate_guess(top: Card, drawn: Card, direction: Direction) -> bool {
    if drawn.is_joker() {
        return true;
    }
    if top.is_joker() {
        return true;
    }
    if drawn.value() == top.value() {
        return false;
    }
    (direction == Direction::Higher) == (drawn.value() > top.value())
}
