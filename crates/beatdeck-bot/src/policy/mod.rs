mod heuristic;
mod random;

pub use heuristic::HeuristicPolicy;
pub use random::RandomPolicy;

use crate::tracker::UnseenTracker;
use beatdeck_core::game::engine::GameState;
use beatdeck_core::game::guess::Direction;
use core::str::FromStr;

/// Context provided to policies for decision-making
pub struct PolicyContext<'a> {
    pub state: &'a GameState,
    pub tracker: &'a UnseenTracker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub stack: usize,
    pub direction: Direction,
}

/// Picks the next stack and call; `None` when no stack is playable.
pub trait Policy: Send {
    fn choose_move(&mut self, ctx: &PolicyContext) -> Option<Decision>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BotDifficulty {
    Easy,
    #[default]
    Normal,
}

impl BotDifficulty {
    pub fn policy(self, seed: u64) -> Box<dyn Policy> {
        match self {
            BotDifficulty::Easy => Box::new(RandomPolicy::with_seed(seed)),
            BotDifficulty::Normal => Box::new(HeuristicPolicy::new()),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BotDifficulty::Easy => "easy",
            BotDifficulty::Normal => "normal",
        }
    }
}

impl FromStr for BotDifficulty {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" | "random" => Ok(BotDifficulty::Easy),
            "normal" | "default" | "heuristic" => Ok(BotDifficulty::Normal),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}
