use super::{Decision, Policy, PolicyContext};
use beatdeck_core::game::guess::Direction;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Uniformly random stack and call.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn choose_move(&mut self, ctx: &PolicyContext) -> Option<Decision> {
        let active: Vec<usize> = ctx.state.active_stack_indices().collect();
        let stack = *active.choose(&mut self.rng)?;
        let direction = if self.rng.gen_bool(0.5) {
            Direction::Higher
        } else {
            Direction::Lower
        };
        Some(Decision { stack, direction })
    }
}

#[cfg(test)]
mod tests {
    use super::RandomPolicy;
    use crate::policy::{Policy, PolicyContext};
    use crate::tracker::UnseenTracker;
    use beatdeck_core::game::engine::GameState;

    #[test]
    fn only_picks_active_stacks() {
        let state = GameState::with_seed(4);
        let tracker = UnseenTracker::from_state(&state);
        let ctx = PolicyContext {
            state: &state,
            tracker: &tracker,
        };
        let mut policy = RandomPolicy::with_seed(9);
        for _ in 0..20 {
            let decision = policy.choose_move(&ctx).expect("nine active stacks");
            assert!(state.stacks()[decision.stack].is_active());
        }
    }

    #[test]
    fn same_seed_same_choices() {
        let state = GameState::with_seed(4);
        let tracker = UnseenTracker::from_state(&state);
        let ctx = PolicyContext {
            state: &state,
            tracker: &tracker,
        };
        let mut a = RandomPolicy::with_seed(1);
        let mut b = RandomPolicy::with_seed(1);
        for _ in 0..10 {
            assert_eq!(a.choose_move(&ctx), b.choose_move(&ctx));
        }
    }
}
