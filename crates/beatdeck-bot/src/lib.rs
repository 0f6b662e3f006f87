pub mod autoplay;
pub mod policy;
pub mod tracker;

pub use autoplay::{AutoplayError, autoplay, play_seeded};
pub use policy::{BotDifficulty, Decision, HeuristicPolicy, Policy, PolicyContext, RandomPolicy};
pub use tracker::UnseenTracker;
