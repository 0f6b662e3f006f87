use beatdeck_bot::{AutoplayError, BotDifficulty, play_seeded};
use beatdeck_core::game::engine::GameSummary;
use beatdeck_core::model::result::GameResult;
use serde::Serialize;
use tracing::info;

/// Aggregate over a batch of seeded bot games.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub difficulty: &'static str,
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub avg_longest_streak: f64,
    pub avg_remaining_cards: f64,
    pub best_streak: u32,
}

/// Plays `games` games with seeds `seed`, `seed + 1`, ...
pub fn simulate(
    games: usize,
    seed: u64,
    difficulty: BotDifficulty,
) -> Result<SimulationSummary, AutoplayError> {
    let mut summaries: Vec<GameSummary> = Vec::with_capacity(games);
    for offset in 0..games as u64 {
        let (_, summary) = play_seeded(seed.wrapping_add(offset), difficulty)?;
        summaries.push(summary);
    }

    let wins = summaries
        .iter()
        .filter(|s| s.result == GameResult::Win)
        .count();
    let mean = |value: fn(&GameSummary) -> f64| {
        if summaries.is_empty() {
            0.0
        } else {
            summaries.iter().map(value).sum::<f64>() / summaries.len() as f64
        }
    };

    let report = SimulationSummary {
        difficulty: difficulty.as_str(),
        games,
        wins,
        losses: games - wins,
        win_rate: if games == 0 { 0.0 } else { wins as f64 / games as f64 },
        avg_longest_streak: mean(|s| f64::from(s.longest_streak)),
        avg_remaining_cards: mean(|s| f64::from(s.remaining_cards)),
        best_streak: summaries.iter().map(|s| s.longest_streak).max().unwrap_or(0),
    };
    info!(
        difficulty = report.difficulty,
        games,
        wins,
        win_rate = report.win_rate,
        "simulation finished"
    );
    Ok(report)
}
