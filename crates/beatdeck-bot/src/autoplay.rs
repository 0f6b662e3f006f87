use crate::policy::{BotDifficulty, Policy, PolicyContext};
use crate::tracker::UnseenTracker;
use beatdeck_core::game::engine::{GameError, GameState, GameSummary};
use core::fmt;
use tracing::{Level, event};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayError {
    NoMove,
    Game(GameError),
}

impl fmt::Display for AutoplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutoplayError::NoMove => f.write_str("policy returned no move for a live game"),
            AutoplayError::Game(err) => write!(f, "engine rejected move: {err}"),
        }
    }
}

impl std::error::Error for AutoplayError {}

impl From<GameError> for AutoplayError {
    fn from(err: GameError) -> Self {
        AutoplayError::Game(err)
    }
}

/// Drives `state` to game over with `policy`, resolving each guess at once.
pub fn autoplay(
    state: &mut GameState,
    policy: &mut dyn Policy,
) -> Result<GameSummary, AutoplayError> {
    loop {
        if let Some(summary) = state.summary() {
            return Ok(summary);
        }

        let tracker = UnseenTracker::from_state(state);
        let ctx = PolicyContext {
            state: &*state,
            tracker: &tracker,
        };
        let decision = policy.choose_move(&ctx).ok_or(AutoplayError::NoMove)?;

        state.select_stack(decision.stack)?;
        let outcome = state.guess(decision.direction)?;
        state.finish_resolution()?;

        event!(
            target: "beatdeck_bot::autoplay",
            Level::TRACE,
            stack = outcome.stack_index,
            top = %outcome.top_card,
            drawn = %outcome.drawn,
            direction = %outcome.direction,
            correct = outcome.correct,
            streak = outcome.current_streak,
            remaining = outcome.remaining_cards
        );
    }
}

/// Deals a seeded game and plays it out at the given difficulty.
pub fn play_seeded(
    seed: u64,
    difficulty: BotDifficulty,
) -> Result<(GameState, GameSummary), AutoplayError> {
    let mut state = GameState::with_seed(seed);
    let mut policy = difficulty.policy(seed);
    let summary = autoplay(&mut state, policy.as_mut())?;
    Ok((state, summary))
}

#[cfg(test)]
mod tests {
    use super::{autoplay, play_seeded};
    use crate::policy::{BotDifficulty, HeuristicPolicy};
    use beatdeck_core::game::engine::GameState;
    use beatdeck_core::model::deck::DECK_SIZE;
    use beatdeck_core::model::result::GameResult;

    #[test]
    fn autoplay_finishes_every_seed() {
        for seed in 0..25 {
            let mut state = GameState::with_seed(seed);
            let summary = autoplay(&mut state, &mut HeuristicPolicy::new()).expect("plays out");
            assert!(state.is_over());
            assert_eq!(state.cards_drawn() + state.remaining_cards(), DECK_SIZE);
            if summary.result == GameResult::Win {
                assert_eq!(summary.remaining_cards, 0);
            }
        }
    }

    #[test]
    fn seeded_play_is_reproducible() {
        let (_, a) = play_seeded(17, BotDifficulty::Easy).expect("plays");
        let (_, b) = play_seeded(17, BotDifficulty::Easy).expect("plays");
        assert_eq!(a, b);
    }

    #[test]
    fn heuristic_outplays_random_over_many_deals() {
        let mut heuristic_cards = 0u32;
        let mut random_cards = 0u32;
        for seed in 0..40 {
            let (_, smart) = play_seeded(seed, BotDifficulty::Normal).expect("plays");
            let (_, easy) = play_seeded(seed, BotDifficulty::Easy).expect("plays");
            heuristic_cards += u32::from(smart.remaining_cards);
            random_cards += u32::from(easy.remaining_cards);
        }
        assert!(heuristic_cards < random_cards);
    }
}
