use crate::game::guess::{Direction, evaluate_guess};
use crate::model::card::Card;
use crate::model::deck::{Deck, EmptyDeckError};
use crate::model::result::GameResult;
use crate::model::stack::{STACK_COUNT, Stack};
use core::fmt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::array;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Selecting,
    Guessing,
    Resolving,
    GameOver(GameResult),
}

impl Phase {
    pub const fn is_over(self) -> bool {
        matches!(self, Phase::GameOver(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Resolution {
    pub(crate) game_over: Option<GameResult>,
}

/// Everything a caller needs to present one guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GuessOutcome {
    pub stack_index: usize,
    pub direction: Direction,
    pub top_card: Card,
    pub drawn: Card,
    pub correct: bool,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub burned_stack: Option<usize>,
    pub game_over: Option<GameResult>,
    /// Phase the game moves to once the resolution is finished, given the
    /// selection at guess time.
    pub next_phase: Phase,
    pub remaining_cards: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    GameOver,
    StackOutOfRange(usize),
    StackBurned(usize),
    NotGuessing,
    NotResolving,
    NoSelection,
    PeekLocked,
    PeekUsed,
    EmptyDeck(EmptyDeckError),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::GameOver => f.write_str("the game is over"),
            GameError::StackOutOfRange(index) => write!(f, "stack {index} does not exist"),
            GameError::StackBurned(index) => write!(f, "stack {index} is burned"),
            GameError::NotGuessing => f.write_str("no stack is waiting for a guess"),
            GameError::NotResolving => f.write_str("no guess is being resolved"),
            GameError::NoSelection => f.write_str("no stack is selected"),
            GameError::PeekLocked => f.write_str("sneak peek unlocks after the first correct guess"),
            GameError::PeekUsed => f.write_str("sneak peek was already used this game"),
            GameError::EmptyDeck(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for GameError {}

impl From<EmptyDeckError> for GameError {
    fn from(err: EmptyDeckError) -> Self {
        GameError::EmptyDeck(err)
    }
}

/// Outcome of a finished game, before it is attributed to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub result: GameResult,
    pub stacks_remaining: u8,
    pub longest_streak: u32,
    pub remaining_cards: u8,
    pub jokers_drawn: u32,
}

impl GameSummary {
    pub fn headline(&self) -> String {
        match (self.result, self.remaining_cards) {
            (GameResult::Win, _) => format!(
                "You beat the deck! All cards have been used. Your longest streak was {}",
                self.longest_streak
            ),
            (GameResult::Lose, 0) => format!(
                "You used your final card but were unable to beat the deck. Your longest streak was {}",
                self.longest_streak
            ),
            (GameResult::Lose, remaining) => format!(
                "{remaining} cards were still remaining. Your longest streak was {}",
                self.longest_streak
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub(crate) deck: Deck,
    pub(crate) stacks: [Stack; STACK_COUNT],
    pub(crate) selected: Option<usize>,
    pub(crate) phase: Phase,
    pub(crate) current_streak: u32,
    pub(crate) longest_streak: u32,
    pub(crate) jokers_drawn: u32,
    pub(crate) drawn: Vec<Card>,
    pub(crate) resolution: Option<Resolution>,
    pub(crate) first_card_placed: bool,
    pub(crate) sneak_peek_used: bool,
}

impl GameState {
    pub fn new() -> Self {
        let seed: u64 = rand::random();
        Self::with_seed(seed)
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::with_rng(&mut rng)
    }

    pub fn with_rng<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        Self::with_deck(Deck::shuffled(rng)).expect("a full deck deals nine stacks")
    }

    /// Deals nine stacks from the top of `deck`.
    pub fn with_deck(mut deck: Deck) -> Result<Self, EmptyDeckError> {
        let mut drawn = Vec::with_capacity(deck.remaining());
        let mut jokers_drawn = 0;
        for _ in 0..STACK_COUNT {
            let card = deck.draw()?;
            if card.is_joker() {
                jokers_drawn += 1;
            }
            drawn.push(card);
        }
        let stacks = array::from_fn(|index| Stack::dealt(drawn[index]));

        Ok(Self {
            deck,
            stacks,
            selected: None,
            phase: Phase::Selecting,
            current_streak: 0,
            longest_streak: 0,
            jokers_drawn,
            drawn,
            resolution: None,
            first_card_placed: false,
            sneak_peek_used: false,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_over()
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn remaining_cards(&self) -> usize {
        self.deck.remaining()
    }

    pub fn stacks(&self) -> &[Stack; STACK_COUNT] {
        &self.stacks
    }

    pub fn stack(&self, index: usize) -> Option<&Stack> {
        self.stacks.get(index)
    }

    pub fn selected_stack(&self) -> Option<usize> {
        self.selected
    }

    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    pub fn longest_streak(&self) -> u32 {
        self.longest_streak
    }

    pub fn jokers_drawn(&self) -> u32 {
        self.jokers_drawn
    }

    /// Every card that has left the deck, in draw order.
    pub fn drawn(&self) -> &[Card] {
        &self.drawn
    }

    pub fn cards_drawn(&self) -> usize {
        self.drawn.len()
    }

    pub fn active_stacks(&self) -> usize {
        self.stacks.iter().filter(|stack| stack.is_active()).count()
    }

    pub fn burned_stacks(&self) -> usize {
        self.stacks.iter().filter(|stack| stack.is_burned()).count()
    }

    pub fn active_stack_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.stacks
            .iter()
            .enumerate()
            .filter(|(_, stack)| stack.is_active())
            .map(|(index, _)| index)
    }

    pub fn sneak_peek_available(&self) -> bool {
        self.first_card_placed && !self.sneak_peek_used && !self.is_over() && !self.deck.is_empty()
    }

    /// Targets a stack. While a guess is resolving this only records the
    /// selection for the next round.
    pub fn select_stack(&mut self, index: usize) -> Result<Phase, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        let stack = self
            .stacks
            .get(index)
            .ok_or(GameError::StackOutOfRange(index))?;
        if !stack.is_active() {
            return Err(GameError::StackBurned(index));
        }

        self.selected = Some(index);
        if self.phase == Phase::Selecting {
            self.phase = Phase::Guessing;
        }
        Ok(self.phase)
    }

    pub fn deselect(&mut self) -> Result<Phase, GameError> {
        match self.phase {
            Phase::Guessing => {
                self.selected = None;
                self.phase = Phase::Selecting;
                Ok(self.phase)
            }
            Phase::GameOver(_) => Err(GameError::GameOver),
            Phase::Selecting | Phase::Resolving => Err(GameError::NotGuessing),
        }
    }

    /// Draws one card onto the selected stack and moves to `Resolving`.
    ///
    /// Streaks, burns and the end-of-game result are applied immediately;
    /// `finish_resolution` only decides which phase comes next.
    pub fn guess(&mut self, direction: Direction) -> Result<GuessOutcome, GameError> {
        match self.phase {
            Phase::Guessing => {}
            Phase::GameOver(_) => return Err(GameError::GameOver),
            Phase::Selecting | Phase::Resolving => return Err(GameError::NotGuessing),
        }
        let stack_index = self.selected.ok_or(GameError::NoSelection)?;
        let top_card = self.stacks[stack_index]
            .top()
            .ok_or(GameError::StackBurned(stack_index))?;

        let drawn = self.draw_card()?;
        let correct = evaluate_guess(top_card, drawn, direction);
        self.stacks[stack_index].push(drawn);

        let mut burned_stack = None;
        let game_over = if correct {
            self.current_streak += 1;
            self.longest_streak = self.longest_streak.max(self.current_streak);
            self.first_card_placed = true;
            self.deck.is_empty().then_some(GameResult::Win)
        } else {
            self.current_streak = 0;
            self.stacks[stack_index].burn();
            burned_stack = Some(stack_index);
            if self.selected == Some(stack_index) {
                self.selected = None;
            }

            if self.active_stacks() == 0 {
                Some(GameResult::Lose)
            } else if self.deck.is_empty() {
                Some(GameResult::Win)
            } else {
                None
            }
        };

        self.phase = Phase::Resolving;
        self.resolution = Some(Resolution { game_over });

        Ok(GuessOutcome {
            stack_index,
            direction,
            top_card,
            drawn,
            correct,
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            burned_stack,
            game_over,
            next_phase: self.next_phase(game_over),
            remaining_cards: self.deck.remaining(),
        })
    }

    /// Leaves `Resolving`, honouring any selection made while resolving.
    pub fn finish_resolution(&mut self) -> Result<Phase, GameError> {
        if self.phase != Phase::Resolving {
            return Err(GameError::NotResolving);
        }
        let resolution = self.resolution.take().ok_or(GameError::NotResolving)?;
        let next = self.next_phase(resolution.game_over);
        if next != Phase::Guessing {
            self.selected = None;
        }
        self.phase = next;
        Ok(next)
    }

    /// Pure form of `guess` followed by `finish_resolution`.
    pub fn resolve_guess(&self, direction: Direction) -> Result<(GameState, GuessOutcome), GameError> {
        let mut next = self.clone();
        let mut outcome = next.guess(direction)?;
        outcome.next_phase = next.finish_resolution()?;
        Ok((next, outcome))
    }

    /// Reveals the next card without drawing it, once per game.
    pub fn peek_next(&mut self) -> Result<Card, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        if !self.first_card_placed {
            return Err(GameError::PeekLocked);
        }
        if self.sneak_peek_used {
            return Err(GameError::PeekUsed);
        }
        let card = self.deck.peek().ok_or(GameError::EmptyDeck(EmptyDeckError))?;
        self.sneak_peek_used = true;
        Ok(card)
    }

    pub fn summary(&self) -> Option<GameSummary> {
        let Phase::GameOver(result) = self.phase else {
            return None;
        };
        Some(GameSummary {
            result,
            stacks_remaining: self.active_stacks() as u8,
            longest_streak: self.longest_streak,
            remaining_cards: self.deck.remaining() as u8,
            jokers_drawn: self.jokers_drawn,
        })
    }

    fn draw_card(&mut self) -> Result<Card, EmptyDeckError> {
        let card = self.deck.draw()?;
        if card.is_joker() {
            self.jokers_drawn += 1;
        }
        self.drawn.push(card);
        Ok(card)
    }

    fn next_phase(&self, game_over: Option<GameResult>) -> Phase {
        if let Some(result) = game_over {
            return Phase::GameOver(result);
        }
        match self.selected {
            Some(index) if self.stacks[index].is_active() => Phase::Guessing,
            _ => Phase::Selecting,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
