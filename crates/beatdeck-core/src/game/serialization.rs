use super::engine::{GameState, Phase, Resolution};
use crate::model::card::Card;
use crate::model::deck::{DECK_SIZE, Deck, JOKER_COUNT};
use crate::model::stack::{STACK_COUNT, Stack};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    pub deck: Deck,
    pub stacks: Vec<Stack>,
    #[serde(default)]
    pub selected: Option<usize>,
    pub phase: Phase,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub jokers_drawn: u32,
    #[serde(default)]
    pub drawn: Vec<Card>,
    #[serde(default)]
    resolution: Option<Resolution>,
    #[serde(default)]
    pub first_card_placed: bool,
    #[serde(default)]
    pub sneak_peek_used: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotError {
    StackCount(usize),
    SelectionOutOfRange(usize),
    /// A guess is pending on a stack that is already burned.
    SelectionBurned(usize),
    MissingResolution,
    /// Drawn and undrawn cards do not add up to one deck.
    CardCount { drawn: usize, remaining: usize },
    TooManyJokers(usize),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::StackCount(count) => {
                write!(f, "expected {STACK_COUNT} stacks, found {count}")
            }
            SnapshotError::SelectionOutOfRange(index) => {
                write!(f, "selected stack {index} does not exist")
            }
            SnapshotError::SelectionBurned(index) => {
                write!(f, "selected stack {index} is burned")
            }
            SnapshotError::MissingResolution => {
                f.write_str("snapshot is resolving a guess but has no resolution")
            }
            SnapshotError::CardCount { drawn, remaining } => write!(
                f,
                "{drawn} drawn and {remaining} remaining cards do not make a {DECK_SIZE}-card deck"
            ),
            SnapshotError::TooManyJokers(count) => {
                write!(f, "{count} jokers found, a deck has {JOKER_COUNT}")
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

impl GameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        GameSnapshot {
            deck: state.deck.clone(),
            stacks: state.stacks.to_vec(),
            selected: state.selected,
            phase: state.phase,
            current_streak: state.current_streak,
            longest_streak: state.longest_streak,
            jokers_drawn: state.jokers_drawn,
            drawn: state.drawn.clone(),
            resolution: state.resolution,
            first_card_placed: state.first_card_placed,
            sneak_peek_used: state.sneak_peek_used,
        }
    }

    pub fn restore(self) -> Result<GameState, SnapshotError> {
        let count = self.stacks.len();
        let stacks: [Stack; STACK_COUNT] = self
            .stacks
            .try_into()
            .map_err(|_| SnapshotError::StackCount(count))?;
        if let Some(index) = self.selected {
            if index >= STACK_COUNT {
                return Err(SnapshotError::SelectionOutOfRange(index));
            }
        }
        if self.phase == Phase::Resolving && self.resolution.is_none() {
            return Err(SnapshotError::MissingResolution);
        }
        if self.phase == Phase::Guessing {
            if let Some(index) = self.selected.filter(|&index| !stacks[index].is_active()) {
                return Err(SnapshotError::SelectionBurned(index));
            }
        }
        let (drawn, remaining) = (self.drawn.len(), self.deck.remaining());
        if drawn + remaining != DECK_SIZE {
            return Err(SnapshotError::CardCount { drawn, remaining });
        }
        let jokers = self
            .deck
            .cards()
            .iter()
            .chain(&self.drawn)
            .filter(|card| card.is_joker())
            .count();
        if jokers > JOKER_COUNT {
            return Err(SnapshotError::TooManyJokers(jokers));
        }

        Ok(GameState {
            deck: self.deck,
            stacks,
            selected: self.selected,
            phase: self.phase,
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            jokers_drawn: self.jokers_drawn,
            drawn: self.drawn,
            resolution: self.resolution,
            first_card_placed: self.first_card_placed,
            sneak_peek_used: self.sneak_peek_used,
        })
    }

    pub fn to_json(state: &GameState) -> serde_json::Result<String> {
        let snapshot = Self::capture(state);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
