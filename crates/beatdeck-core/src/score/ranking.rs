use crate::model::result::GameResult;
use crate::score::compare::compare_scores;
use crate::score::record::ScoreRecord;

pub const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingLimits {
    /// Cap applied to the wins and to the losses before they are combined.
    pub per_result: Option<usize>,
    pub total: usize,
}

impl Default for RankingLimits {
    fn default() -> Self {
        Self {
            per_result: None,
            total: DEFAULT_LIMIT,
        }
    }
}

/// Display order: wins first, each partition sorted by its own keys, with the
/// newest record first on a full tie.
pub fn rank_records<I>(records: I, limits: RankingLimits) -> Vec<ScoreRecord>
where
    I: IntoIterator<Item = ScoreRecord>,
{
    let (mut wins, mut losses): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|record| record.result == GameResult::Win);

    for partition in [&mut wins, &mut losses] {
        partition.sort_by(|a, b| compare_scores(b, a));
        if let Some(cap) = limits.per_result {
            partition.truncate(cap);
        }
    }

    wins.extend(losses);
    wins.truncate(limits.total);
    wins
}
