//! Ordering of score records.
//!
//! Wins rank above losses. Wins are ordered by stacks remaining, then longest
//! streak; losses by fewest cards remaining, then longest streak. Anything
//! still tied goes to the more recent timestamp.

use crate::model::result::GameResult;
use crate::score::record::ScoreRecord;
use core::cmp::Ordering;

/// `Greater` when `a` ranks above `b`.
pub fn compare_scores(a: &ScoreRecord, b: &ScoreRecord) -> Ordering {
    outcome_order(a, b).then_with(|| a.timestamp.cmp(&b.timestamp))
}

/// Strictly better; a full tie is not better.
pub fn is_better(a: &ScoreRecord, b: &ScoreRecord) -> bool {
    compare_scores(a, b) == Ordering::Greater
}

/// Upsert rule: the incoming record replaces the stored one when it is
/// better or fully tied.
pub fn should_replace(incoming: &ScoreRecord, stored: &ScoreRecord) -> bool {
    compare_scores(incoming, stored) != Ordering::Less
}

/// Game-outcome keys only, ignoring timestamps.
fn outcome_order(a: &ScoreRecord, b: &ScoreRecord) -> Ordering {
    match (a.result, b.result) {
        (GameResult::Win, GameResult::Lose) => Ordering::Greater,
        (GameResult::Lose, GameResult::Win) => Ordering::Less,
        (GameResult::Win, GameResult::Win) => a
            .stacks_remaining
            .cmp(&b.stacks_remaining)
            .then_with(|| a.longest_streak.cmp(&b.longest_streak)),
        (GameResult::Lose, GameResult::Lose) => b
            .remaining_cards
            .cmp(&a.remaining_cards)
            .then_with(|| a.longest_streak.cmp(&b.longest_streak)),
    }
}

#[cfg(test)]
mod tests {
    use super::{compare_scores, is_better, should_replace};
    use crate::model::result::GameResult;
    use crate::score::record::{PlayerId, ScoreRecord};
    use core::cmp::Ordering;

    fn record(result: GameResult, stacks: u8, streak: u32, remaining: u8, ts: u64) -> ScoreRecord {
        ScoreRecord {
            player_id: PlayerId::new("p"),
            player_name: "p".to_string(),
            stacks_remaining: stacks,
            longest_streak: streak,
            remaining_cards: remaining,
            result,
            timestamp: ts,
        }
    }

    fn win(stacks: u8, streak: u32) -> ScoreRecord {
        record(GameResult::Win, stacks, streak, 0, 1)
    }

    fn lose(remaining: u8, streak: u32) -> ScoreRecord {
        record(GameResult::Lose, 0, streak, remaining, 1)
    }

    #[test]
    fn any_win_beats_any_loss() {
        let weak_win = win(1, 0);
        let strong_loss = record(GameResult::Lose, 9, 50, 0, 99);
        assert!(is_better(&weak_win, &strong_loss));
        assert!(!is_better(&strong_loss, &weak_win));
    }

    #[test]
    fn wins_prefer_stacks_before_streak() {
        assert!(is_better(&win(9, 52), &win(6, 60)));
        assert!(is_better(&win(5, 7), &win(5, 3)));
    }

    #[test]
    fn losses_prefer_fewer_remaining_cards_then_streak() {
        assert!(is_better(&lose(0, 1), &lose(3, 40)));
        assert!(is_better(&lose(4, 20), &lose(4, 10)));
    }

    #[test]
    fn loss_ordering_ignores_stacks_remaining() {
        let a = record(GameResult::Lose, 0, 5, 10, 1);
        let b = record(GameResult::Lose, 3, 5, 10, 1);
        assert_eq!(compare_scores(&a, &b), Ordering::Equal);
    }

    #[test]
    fn timestamp_breaks_full_ties() {
        let older = record(GameResult::Win, 4, 9, 0, 100);
        let newer = record(GameResult::Win, 4, 9, 0, 200);
        assert!(is_better(&newer, &older));
        assert!(should_replace(&newer, &older));
        assert!(!should_replace(&older, &newer));
    }

    #[test]
    fn identical_records_tie_and_replace() {
        let a = win(5, 5);
        assert_eq!(compare_scores(&a, &a), Ordering::Equal);
        assert!(!is_better(&a, &a));
        assert!(should_replace(&a, &a));
    }

    #[test]
    fn comparison_is_antisymmetric_and_transitive() {
        let records = [
            win(9, 1),
            win(5, 3),
            win(5, 7),
            win(3, 9),
            lose(0, 40),
            lose(0, 2),
            lose(12, 30),
            record(GameResult::Lose, 0, 2, 0, 7),
        ];
        for a in &records {
            for b in &records {
                assert_eq!(compare_scores(a, b), compare_scores(b, a).reverse());
                for c in &records {
                    if compare_scores(a, b) != Ordering::Less
                        && compare_scores(b, c) != Ordering::Less
                    {
                        assert_ne!(compare_scores(a, c), Ordering::Less);
                    }
                }
            }
        }
    }
}
