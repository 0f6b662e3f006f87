use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use beatdeck_bot::{BotDifficulty, play_seeded};
use beatdeck_cli::{interactive, simulate::simulate};
use beatdeck_core::AppInfo;
use beatdeck_core::game::engine::{GameState, GameSummary};
use beatdeck_leaderboard::{
    JsonFileBackend, LeaderboardRequest, LeaderboardService, ScoreSubmission, ServiceConfig,
    SystemClock, init_logging,
};

/// Beat the Deck: play, simulate and keep a leaderboard.
#[derive(Debug, Parser)]
#[command(name = "beatdeck", author, version, about = "Beat the Deck card game and leaderboard")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Override the leaderboard store file.
    #[arg(long, value_name = "PATH", global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play a game interactively on the terminal.
    Play {
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
        /// Submit the finished game to the leaderboard under this name.
        #[arg(long, value_name = "NAME")]
        player: Option<String>,
    },
    /// Let a bot play one game.
    Bot {
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
        #[arg(long, default_value = "normal")]
        difficulty: BotDifficulty,
        #[arg(long, value_name = "NAME")]
        player: Option<String>,
    },
    /// Play many seeded bot games and report the win rate.
    Simulate {
        #[arg(long, default_value_t = 100)]
        games: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value = "normal")]
        difficulty: BotDifficulty,
        #[arg(long)]
        json: bool,
    },
    /// Submit a score by hand.
    Submit {
        #[arg(long, value_name = "NAME")]
        player: String,
        #[arg(long, value_name = "ID")]
        player_id: Option<String>,
        #[arg(long)]
        stacks: i64,
        #[arg(long)]
        streak: i64,
        #[arg(long)]
        remaining: i64,
        /// "win" or "lose".
        #[arg(long)]
        result: String,
    },
    /// Print the leaderboard as JSON.
    Leaderboard {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u8>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        per_result: Option<usize>,
    },
    /// Report whether the leaderboard store is reachable.
    Health,
    /// Exit after validating the configuration.
    ValidateConfig,
}

fn load_config(cli: &Cli) -> Result<ServiceConfig> {
    let mut config = match &cli.config {
        Some(path) => ServiceConfig::from_path(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(store) = &cli.store {
        config.store.path = store.clone();
    }
    config.validate()?;
    Ok(config)
}

fn open_service(config: &ServiceConfig) -> LeaderboardService<JsonFileBackend> {
    let path = config.store.path.clone();
    LeaderboardService::start(
        move || JsonFileBackend::open(&path),
        config.settings(),
        Arc::new(SystemClock::new()),
    )
}

fn submission_for(player: &str, summary: &GameSummary) -> ScoreSubmission {
    ScoreSubmission {
        player_id: None,
        player_name: Some(player.to_string()),
        stacks_remaining: Some(i64::from(summary.stacks_remaining)),
        longest_streak: Some(i64::from(summary.longest_streak)),
        remaining_cards: Some(i64::from(summary.remaining_cards)),
        result: Some(summary.result.as_str().to_string()),
    }
}

fn submit(config: &ServiceConfig, submission: &ScoreSubmission) -> Result<()> {
    let service = open_service(config);
    let receipt = service
        .submit(submission)
        .context("submitting score to the leaderboard")?;
    println!(
        "{} ({}): {}",
        receipt.record.player_name,
        receipt.record.player_id,
        receipt.action.as_str()
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if matches!(cli.command, Command::ValidateConfig) {
        println!(
            "Configuration valid: store at {}, default limit {}",
            config.store.path.display(),
            config.leaderboard.default_limit
        );
        return Ok(());
    }

    let _logging_guard = init_logging(&config.logging)?;
    tracing::debug!(app = AppInfo::name(), version = AppInfo::version(), "starting");

    match cli.command {
        Command::Play { seed, player } => {
            let mut state = match seed {
                Some(seed) => GameState::with_seed(seed),
                None => GameState::new(),
            };
            println!("{}", AppInfo::title());
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            let summary = interactive::run(&mut state, stdin.lock(), &mut stdout)?;
            if let (Some(summary), Some(player)) = (summary, player) {
                submit(&config, &submission_for(&player, &summary))?;
            }
        }
        Command::Bot {
            seed,
            difficulty,
            player,
        } => {
            let seed = seed.unwrap_or_else(rand::random);
            let (_, summary) = play_seeded(seed, difficulty)?;
            println!("seed {seed} ({}): {}", difficulty.as_str(), summary.headline());
            if let Some(player) = player {
                submit(&config, &submission_for(&player, &summary))?;
            }
        }
        Command::Simulate {
            games,
            seed,
            difficulty,
            json,
        } => {
            let report = simulate(games, seed, difficulty)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{} games at {}: {} wins, {} losses ({:.1}% win rate), avg longest streak {:.1}, best {}",
                    report.games,
                    report.difficulty,
                    report.wins,
                    report.losses,
                    report.win_rate * 100.0,
                    report.avg_longest_streak,
                    report.best_streak
                );
            }
        }
        Command::Submit {
            player,
            player_id,
            stacks,
            streak,
            remaining,
            result,
        } => {
            let submission = ScoreSubmission {
                player_id,
                player_name: Some(player),
                stacks_remaining: Some(stacks),
                longest_streak: Some(streak),
                remaining_cards: Some(remaining),
                result: Some(result),
            };
            submit(&config, &submission)?;
        }
        Command::Leaderboard {
            year,
            month,
            limit,
            per_result,
        } => {
            let service = open_service(&config);
            let rows = service.leaderboard(&LeaderboardRequest {
                year,
                month,
                limit,
                per_result_limit: per_result,
            })?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Command::Health => {
            let service = open_service(&config);
            let health = service.health();
            println!("{}", serde_json::to_string_pretty(&health)?);
            if !health.store_available {
                bail!("leaderboard store at {} is unavailable", config.store.path.display());
            }
        }
        Command::ValidateConfig => {}
    }

    Ok(())
}
