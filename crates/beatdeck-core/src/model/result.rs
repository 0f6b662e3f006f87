use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Final outcome of one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Win,
    Lose,
}

impl GameResult {
    pub const fn as_str(self) -> &'static str {
        match self {
            GameResult::Win => "win",
            GameResult::Lose => "lose",
        }
    }

    pub const fn is_win(self) -> bool {
        matches!(self, GameResult::Win)
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameResult {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(GameResult::Win),
            "lose" => Ok(GameResult::Lose),
            _ => Err(()),
        }
    }
}
