use beatdeck_core::game::engine::GameState;
use beatdeck_core::game::guess::Direction;
use beatdeck_core::model::card::Card;
use beatdeck_core::model::deck::Deck;

const VALUE_SLOTS: usize = 15;

/// Counts of cards not yet seen, indexed by card value (0 = joker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnseenTracker {
    counts: [u8; VALUE_SLOTS],
    total: usize,
}

impl UnseenTracker {
    pub fn full_deck() -> Self {
        let mut tracker = Self {
            counts: [0; VALUE_SLOTS],
            total: 0,
        };
        for card in Deck::standard().cards() {
            tracker.counts[usize::from(card.value())] += 1;
            tracker.total += 1;
        }
        tracker
    }

    pub fn from_state(state: &GameState) -> Self {
        let mut tracker = Self::full_deck();
        for card in state.drawn() {
            tracker.note_seen(*card);
        }
        tracker
    }

    pub fn note_seen(&mut self, card: Card) {
        let slot = &mut self.counts[usize::from(card.value())];
        if *slot > 0 {
            *slot -= 1;
            self.total -= 1;
        }
    }

    pub fn unseen_count(&self) -> usize {
        self.total
    }

    pub fn unseen_of_value(&self, value: u8) -> u8 {
        self.counts.get(usize::from(value)).copied().unwrap_or(0)
    }

    /// Chance that the next draw makes `direction` correct on `top`.
    pub fn success_odds(&self, top: Card, direction: Direction) -> f64 {
        if top.is_joker() {
            return 1.0;
        }
        if self.total == 0 {
            return 0.0;
        }
        let value = usize::from(top.value());
        let range = match direction {
            Direction::Higher => (value + 1)..VALUE_SLOTS,
            Direction::Lower => 2..value,
        };
        let favourable: usize = self.counts[range].iter().map(|&n| usize::from(n)).sum();
        let jokers = usize::from(self.counts[0]);
        (favourable + jokers) as f64 / self.total as f64
    }
}
