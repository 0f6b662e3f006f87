use beatdeck_core::score::ranking::DEFAULT_LIMIT;
use beatdeck_core::score::{RankingLimits, ScoreRecord, rank_records};
use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::validation::InvalidInput;

const MIN_YEAR: i32 = 1970;
const MAX_YEAR: i32 = 9998;

/// A calendar month in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthWindow {
    year: i32,
    month: u8,
}

impl MonthWindow {
    pub fn new(year: i32, month: u8) -> Result<Self, InvalidInput> {
        if !(1..=12).contains(&month) {
            return Err(InvalidInput::Month(month));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(InvalidInput::Year(year));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    /// First and last millisecond of the month, both inclusive.
    pub fn bounds_ms(&self) -> (u64, u64) {
        let start = month_start_ms(self.year, self.month);
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        (start, month_start_ms(next_year, next_month) - 1)
    }

    pub fn contains(&self, timestamp_ms: u64) -> bool {
        let (start, end) = self.bounds_ms();
        (start..=end).contains(&timestamp_ms)
    }
}

// Year and month are checked in `MonthWindow::new`, and the year after
// `MAX_YEAR` is still representable.
fn month_start_ms(year: i32, month: u8) -> u64 {
    let start = Month::try_from(month)
        .and_then(|month| Date::from_calendar_date(year, month, 1))
        .map(|date| date.midnight().assume_utc().unix_timestamp())
        .unwrap_or(0);
    (start.max(0) as u64) * 1_000
}

/// Filters and limits for one leaderboard read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardQuery {
    pub window: Option<MonthWindow>,
    pub per_result_limit: Option<usize>,
    pub limit: usize,
}

impl Default for LeaderboardQuery {
    fn default() -> Self {
        Self {
            window: None,
            per_result_limit: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl LeaderboardQuery {
    pub fn for_month(window: MonthWindow) -> Self {
        Self {
            window: Some(window),
            ..Self::default()
        }
    }

    pub fn apply(&self, rows: Vec<ScoreRecord>) -> Vec<ScoreRecord> {
        let in_window = rows
            .into_iter()
            .filter(|row| self.window.is_none_or(|window| window.contains(row.timestamp)));
        rank_records(
            in_window,
            RankingLimits {
                per_result: self.per_result_limit,
                total: self.limit,
            },
        )
    }
}
