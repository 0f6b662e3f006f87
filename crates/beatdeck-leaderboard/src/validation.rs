use beatdeck_core::model::result::GameResult;
use beatdeck_core::model::deck::DECK_SIZE;
use beatdeck_core::model::stack::STACK_COUNT;
use beatdeck_core::score::{PlayerId, ScoreRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAX_NAME_LEN: usize = 20;
pub const DEFAULT_DENYLIST: &[&str] = &["admin", "administrator", "moderator", "system"];

/// Raw score submission as it arrives from a client. Every field is optional
/// so that missing values are reported instead of failing to parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    #[serde(default)]
    pub player_id: Option<String>,
    #[serde(default, alias = "username")]
    pub player_name: Option<String>,
    #[serde(default)]
    pub stacks_remaining: Option<i64>,
    #[serde(default)]
    pub longest_streak: Option<i64>,
    #[serde(default)]
    pub remaining_cards: Option<i64>,
    #[serde(default)]
    pub result: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("result must be 'win' or 'lose', got '{0}'")]
    InvalidResult(String),
    #[error("stacksRemaining must be between 0 and 9, got {0}")]
    StacksOutOfRange(i64),
    #[error("remainingCards must be between 0 and 54, got {0}")]
    CardsOutOfRange(i64),
    #[error("longestStreak must not be negative, got {0}")]
    NegativeStreak(i64),
    #[error("player name must not be empty")]
    EmptyName,
    #[error("player name must be at most {max} characters, got {len}")]
    NameTooLong { len: usize, max: usize },
    #[error("player name is not allowed")]
    NameDenied,
    #[error("month must be between 1 and 12, got {0}")]
    Month(u8),
    #[error("year {0} is out of range")]
    Year(i32),
    #[error("perResultLimit must be at least 1")]
    PerResultLimit,
}

/// Submission that passed every check; ready to be stamped and stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    pub player_id: PlayerId,
    pub player_name: String,
    pub stacks_remaining: u8,
    pub longest_streak: u32,
    pub remaining_cards: u8,
    pub result: GameResult,
}

impl ValidSubmission {
    pub fn into_record(self, timestamp: u64) -> ScoreRecord {
        ScoreRecord {
            player_id: self.player_id,
            player_name: self.player_name,
            stacks_remaining: self.stacks_remaining,
            longest_streak: self.longest_streak,
            remaining_cards: self.remaining_cards,
            result: self.result,
            timestamp,
        }
    }
}

impl ScoreSubmission {
    pub fn validate(&self, names: &NameFilter) -> Result<ValidSubmission, InvalidInput> {
        let raw_id = self.player_id.as_deref().map(str::trim).filter(|id| !id.is_empty());
        let raw_name = match (self.player_name.as_deref(), raw_id) {
            (Some(name), _) => name,
            (None, Some(id)) => id,
            (None, None) => return Err(InvalidInput::MissingField("playerName")),
        };
        let stacks = self
            .stacks_remaining
            .ok_or(InvalidInput::MissingField("stacksRemaining"))?;
        let streak = self
            .longest_streak
            .ok_or(InvalidInput::MissingField("longestStreak"))?;
        let cards = self
            .remaining_cards
            .ok_or(InvalidInput::MissingField("remainingCards"))?;
        let result = self
            .result
            .as_deref()
            .ok_or(InvalidInput::MissingField("result"))?;

        let result = result
            .parse::<GameResult>()
            .map_err(|_| InvalidInput::InvalidResult(result.to_string()))?;
        if !(0..=STACK_COUNT as i64).contains(&stacks) {
            return Err(InvalidInput::StacksOutOfRange(stacks));
        }
        if !(0..=DECK_SIZE as i64).contains(&cards) {
            return Err(InvalidInput::CardsOutOfRange(cards));
        }
        let longest_streak =
            u32::try_from(streak).map_err(|_| InvalidInput::NegativeStreak(streak))?;

        let player_name = names.check(raw_name)?;
        let player_id = match raw_id {
            Some(id) => PlayerId::new(id),
            None => PlayerId::new(player_name.clone()),
        };

        Ok(ValidSubmission {
            player_id,
            player_name,
            stacks_remaining: stacks as u8,
            longest_streak,
            remaining_cards: cards as u8,
            result,
        })
    }
}

/// Length limit plus a case-insensitive denylist matched as a whole name or
/// as a whole word inside the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFilter {
    max_len: usize,
    denylist: Vec<String>,
}

impl Default for NameFilter {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_NAME_LEN,
            DEFAULT_DENYLIST.iter().map(|w| w.to_string()),
        )
    }
}

impl NameFilter {
    pub fn new<I, S>(max_len: usize, denylist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let denylist = denylist
            .into_iter()
            .map(|word| word.as_ref().trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();
        Self { max_len, denylist }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Returns the trimmed name when it is acceptable.
    pub fn check(&self, raw: &str) -> Result<String, InvalidInput> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(InvalidInput::EmptyName);
        }
        let len = name.chars().count();
        if len > self.max_len {
            return Err(InvalidInput::NameTooLong {
                len,
                max: self.max_len,
            });
        }
        if self.is_denied(name) {
            return Err(InvalidInput::NameDenied);
        }
        Ok(name.to_string())
    }

    pub fn is_denied(&self, name: &str) -> bool {
        let lowered = name.to_lowercase();
        self.denylist
            .iter()
            .any(|word| lowered == *word || contains_word(&lowered, word))
    }
}

fn contains_word(haystack: &str, word: &str) -> bool {
    haystack.match_indices(word).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
