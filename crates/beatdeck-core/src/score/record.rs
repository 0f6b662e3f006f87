use crate::game::engine::GameSummary;
use crate::model::result::GameResult;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Leaderboard key; one stored entry per player.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Immutable outcome of one finished game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub player_id: PlayerId,
    pub player_name: String,
    /// Active (non-burned) stacks at game end.
    pub stacks_remaining: u8,
    pub longest_streak: u32,
    pub remaining_cards: u8,
    pub result: GameResult,
    /// Epoch milliseconds of the write.
    pub timestamp: u64,
}

impl ScoreRecord {
    pub fn from_summary(
        player_id: PlayerId,
        player_name: impl Into<String>,
        summary: &GameSummary,
        timestamp: u64,
    ) -> Self {
        Self {
            player_id,
            player_name: player_name.into(),
            stacks_remaining: summary.stacks_remaining,
            longest_streak: summary.longest_streak,
            remaining_cards: summary.remaining_cards,
            result: summary.result,
            timestamp,
        }
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{PlayerId, ScoreRecord};
    use crate::game::engine::GameSummary;
    use crate::model::result::GameResult;

    #[test]
    fn record_copies_summary_fields() {
        let summary = GameSummary {
            result: GameResult::Lose,
            stacks_remaining: 0,
            longest_streak: 12,
            remaining_cards: 17,
            jokers_drawn: 2,
        };
        let record = ScoreRecord::from_summary(PlayerId::new("p1"), "Ada", &summary, 1_000);
        assert_eq!(record.result, GameResult::Lose);
        assert_eq!(record.remaining_cards, 17);
        assert_eq!(record.longest_streak, 12);
        assert_eq!(record.timestamp, 1_000);
    }

    #[test]
    fn record_serializes_with_camel_case_fields() {
        let record = ScoreRecord {
            player_id: PlayerId::new("p1"),
            player_name: "Ada".to_string(),
            stacks_remaining: 9,
            longest_streak: 52,
            remaining_cards: 0,
            result: GameResult::Win,
            timestamp: 5,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"playerId\":\"p1\""));
        assert!(json.contains("\"stacksRemaining\":9"));
        assert!(json.contains("\"result\":\"win\""));
        let back: ScoreRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
