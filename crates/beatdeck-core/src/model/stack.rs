use crate::model::card::Card;
use serde::{Deserialize, Serialize};

pub const STACK_COUNT: usize = 9;

/// One tableau position. Burned stacks keep their slot but take no more cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stack {
    Active(Vec<Card>),
    Burned,
}

impl Stack {
    pub fn dealt(card: Card) -> Self {
        Stack::Active(vec![card])
    }

    pub fn is_active(&self) -> bool {
        match self {
            Stack::Active(cards) => !cards.is_empty(),
            Stack::Burned => false,
        }
    }

    pub fn is_burned(&self) -> bool {
        matches!(self, Stack::Burned)
    }

    pub fn top(&self) -> Option<Card> {
        match self {
            Stack::Active(cards) => cards.last().copied(),
            Stack::Burned => None,
        }
    }

    pub fn cards(&self) -> &[Card] {
        match self {
            Stack::Active(cards) => cards,
            Stack::Burned => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.cards().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards().is_empty()
    }

    /// Returns false when the stack is burned and the card was not placed.
    pub(crate) fn push(&mut self, card: Card) -> bool {
        match self {
            Stack::Active(cards) => {
                cards.push(card);
                true
            }
            Stack::Burned => false,
        }
    }

    pub(crate) fn burn(&mut self) {
        *self = Stack::Burned;
    }
}
