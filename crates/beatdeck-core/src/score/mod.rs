pub mod compare;
pub mod ranking;
pub mod record;

pub use compare::{compare_scores, is_better, should_replace};
pub use ranking::{RankingLimits, rank_records};
pub use record::{PlayerId, ScoreRecord};
