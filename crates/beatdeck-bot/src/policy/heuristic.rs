use super::{Decision, Policy, PolicyContext};
use beatdeck_core::game::guess::Direction;
use tracing::{Level, event};

/// Plays the stack and call with the best odds against the unseen cards.
/// Ties go to the lowest stack index, then to `Higher`.
#[derive(Debug, Clone, Default)]
pub struct HeuristicPolicy;

impl HeuristicPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl Policy for HeuristicPolicy {
    fn choose_move(&mut self, ctx: &PolicyContext) -> Option<Decision> {
        let mut best: Option<(Decision, f64)> = None;

        for stack in ctx.state.active_stack_indices() {
            let Some(top) = ctx.state.stacks()[stack].top() else {
                continue;
            };
            for direction in Direction::BOTH {
                let odds = ctx.tracker.success_odds(top, direction);
                if best.is_none_or(|(_, best_odds)| odds > best_odds) {
                    best = Some((Decision { stack, direction }, odds));
                }
            }
        }

        if let Some((decision, odds)) = best {
            log_decision(ctx, decision, odds);
        }
        best.map(|(decision, _)| decision)
    }
}

fn log_decision(ctx: &PolicyContext, decision: Decision, odds: f64) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    event!(
        target: "beatdeck_bot::heuristic",
        Level::DEBUG,
        stack = decision.stack,
        direction = %decision.direction,
        odds,
        unseen = ctx.tracker.unseen_count(),
        remaining = ctx.state.remaining_cards()
    );
}
