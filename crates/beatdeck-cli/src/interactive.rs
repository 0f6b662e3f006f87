//! Line-oriented play against the engine on a terminal or any reader.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use beatdeck_core::game::engine::{GameError, GameState, GameSummary, Phase};
use beatdeck_core::game::guess::Direction;
use beatdeck_core::model::stack::{STACK_COUNT, Stack};

const HELP: &str = "commands: 1-9 select a stack, h/l guess higher/lower, d deselect, p sneak peek, b board, q quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Select(usize),
    Guess(Direction),
    Deselect,
    Peek,
    Board,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let word = raw.trim().to_ascii_lowercase();
        if let Ok(number) = word.parse::<usize>() {
            return match number {
                1..=STACK_COUNT => Ok(Command::Select(number - 1)),
                _ => Err(format!("pick a stack between 1 and {STACK_COUNT}")),
            };
        }
        if let Ok(direction) = word.parse::<Direction>() {
            return Ok(Command::Guess(direction));
        }
        match word.as_str() {
            "d" | "deselect" => Ok(Command::Deselect),
            "p" | "peek" => Ok(Command::Peek),
            "b" | "board" => Ok(Command::Board),
            "?" | "help" => Ok(Command::Help),
            "q" | "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command '{other}'")),
        }
    }
}

/// Renders the nine stacks with their top cards, marking the selection.
pub fn render_board(state: &GameState) -> String {
    let mut out = format!(
        "deck: {} cards | streak {} (best {})\n",
        state.remaining_cards(),
        state.current_streak(),
        state.longest_streak()
    );
    for (index, stack) in state.stacks().iter().enumerate() {
        let marker = if state.selected_stack() == Some(index) { '*' } else { ' ' };
        let cell = match stack {
            Stack::Burned => "burned".to_string(),
            Stack::Active(_) => match stack.top() {
                Some(top) => format!("{top} x{}", stack.len()),
                None => "empty".to_string(),
            },
        };
        out.push_str(&format!("{marker}{}:[{cell}] ", index + 1));
        if index % 3 == 2 {
            out.push('\n');
        }
    }
    out
}

/// Stack numbers are shown 1-based to players.
fn describe(err: GameError) -> String {
    match err {
        GameError::StackBurned(index) => format!("stack {} is burned", index + 1),
        GameError::StackOutOfRange(index) => format!("stack {} does not exist", index + 1),
        other => other.to_string(),
    }
}

/// Plays until the game ends, input runs out, or the player quits. Returns
/// the summary only for a finished game.
pub fn run<R, W>(state: &mut GameState, input: R, out: &mut W) -> io::Result<Option<GameSummary>>
where
    R: BufRead,
    W: Write,
{
    writeln!(out, "{HELP}")?;
    write!(out, "{}", render_board(state))?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "{message}")?;
                continue;
            }
        };

        match command {
            Command::Quit => return Ok(None),
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Board => write!(out, "{}", render_board(state))?,
            Command::Select(index) => match state.select_stack(index) {
                Ok(_) => writeln!(out, "stack {} selected, higher or lower?", index + 1)?,
                Err(err) => writeln!(out, "{}", describe(err))?,
            },
            Command::Deselect => match state.deselect() {
                Ok(_) => writeln!(out, "pick a stack")?,
                Err(err) => writeln!(out, "{}", describe(err))?,
            },
            Command::Peek => match state.peek_next() {
                Ok(card) => writeln!(out, "next card: {card}")?,
                Err(err) => writeln!(out, "{}", describe(err))?,
            },
            Command::Guess(direction) => {
                let outcome = match state.guess(direction) {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        writeln!(out, "{}", describe(err))?;
                        continue;
                    }
                };
                writeln!(
                    out,
                    "{} on {}: drew {} -> {}",
                    outcome.direction,
                    outcome.top_card,
                    outcome.drawn,
                    if outcome.correct { "correct" } else { "wrong" }
                )?;
                if let Some(index) = outcome.burned_stack {
                    writeln!(out, "stack {} burned", index + 1)?;
                }
                if let Err(err) = state.finish_resolution() {
                    writeln!(out, "{}", describe(err))?;
                }
                if let Some(summary) = state.summary() {
                    writeln!(out, "{}", summary.headline())?;
                    return Ok(Some(summary));
                }
                write!(out, "{}", render_board(state))?;
                if state.phase() == Phase::Selecting {
                    writeln!(out, "pick a stack")?;
                }
            }
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::{Command, render_board, run};
    use beatdeck_core::game::engine::GameState;
    use beatdeck_core::game::guess::Direction;
    use std::io::Cursor;

    fn play(state: &mut GameState, script: &str) -> (Option<beatdeck_core::game::engine::GameSummary>, String) {
        let mut out = Vec::new();
        let summary = run(state, Cursor::new(script.to_string()), &mut out).expect("io");
        (summary, String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn parses_commands() {
        assert_eq!("3".parse::<Command>(), Ok(Command::Select(2)));
        assert_eq!(" H ".parse::<Command>(), Ok(Command::Guess(Direction::Higher)));
        assert_eq!("lo".parse::<Command>(), Ok(Command::Guess(Direction::Lower)));
        assert_eq!("peek".parse::<Command>(), Ok(Command::Peek));
        assert!("0".parse::<Command>().is_err());
        assert!("10".parse::<Command>().is_err());
        assert!("jump".parse::<Command>().is_err());
    }

    #[test]
    fn board_marks_selected_stack() {
        let mut state = GameState::with_seed(3);
        state.select_stack(4).expect("select");
        let board = render_board(&state);
        assert!(board.contains("*5:["));
        assert!(board.starts_with("deck: 45 cards"));
    }

    #[test]
    fn select_then_deselect_then_quit() {
        let mut state = GameState::with_seed(9);
        let (summary, out) = play(&mut state, "1\nd\nq\n");
        assert!(summary.is_none());
        assert!(out.contains("stack 1 selected"));
        assert!(out.contains("pick a stack"));
        assert_eq!(state.selected_stack(), None);
    }

    #[test]
    fn peek_is_locked_at_start() {
        let mut state = GameState::with_seed(9);
        let (_, out) = play(&mut state, "p\n");
        assert!(out.contains("sneak peek unlocks after the first correct guess"));
    }

    #[test]
    fn scripted_game_runs_to_the_end() {
        let mut script = String::new();
        for _ in 0..60 {
            for stack in 1..=9 {
                script.push_str(&format!("{stack}\nh\n"));
            }
        }
        let mut state = GameState::with_seed(21);
        let (summary, out) = play(&mut state, &script);
        let summary = summary.expect("game finishes");
        assert!(state.is_over());
        assert!(out.contains(&summary.headline()));
    }
}
