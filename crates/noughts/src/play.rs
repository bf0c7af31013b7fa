//! Terminal game loop: a human against a computer policy.

use crate::config::AppConfig;
use crate::opponent::build_policy;
use crate::session::Session;
use anyhow::Result;
use noughts_core::{DecisionSource, GameStatus, MoveArbitrator, MoveError, MovePolicy};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument, warn};

const HELP: &str = "Enter a cell number 1-9, r to start a new game, q to quit.";

/// One line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Board index (0-8), entered as 1-9.
    Cell(usize),
    /// Abandon the current game.
    Reset,
    /// Leave.
    Quit,
    /// Show the controls.
    Help,
    /// Anything else.
    Unknown(String),
}

impl Input {
    /// Parses a line typed by the player.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.to_ascii_lowercase().as_str() {
            "r" | "reset" | "new" => Input::Reset,
            "q" | "quit" | "exit" => Input::Quit,
            "h" | "help" | "?" => Input::Help,
            other => match other.parse::<usize>() {
                Ok(n @ 1..=9) => Input::Cell(n - 1),
                _ => Input::Unknown(line.to_string()),
            },
        }
    }
}

/// Plays against the configured opponent on stdin/stdout.
#[instrument(skip(config), fields(opponent = %config.opponent(), human = %config.human()))]
pub async fn play(config: &AppConfig) -> Result<()> {
    let mut policy = build_policy(*config.opponent(), config, *config.seed())?;
    let mut session = Session::new(*config.human());
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    writeln!(stdout, "You are {} against {}. {}", session.human(), policy.name(), HELP)?;
    run_session(&mut session, policy.as_mut(), stdin, &mut stdout).await?;
    writeln!(stdout, "{}", session.tally())?;
    Ok(())
}

/// Drives `session` from `input` until the player quits or input ends.
///
/// While the computer is thinking, input is still read: a reset drops
/// the pending decision and starts a new game.
pub async fn run_session<R, W>(
    session: &mut Session,
    policy: &mut dyn MovePolicy,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let arbiter = MoveArbitrator::new();
    let mut lines = input.lines();
    writeln!(out, "\n{}\n", session.game().board())?;

    loop {
        if session.is_computer_turn() {
            writeln!(out, "{} is thinking...", policy.name())?;
            let pending = arbiter.decide(session.game().snapshot(), &mut *policy);
            tokio::pin!(pending);

            loop {
                tokio::select! {
                    biased;
                    result = &mut pending => {
                        let (mov, decision) = result?;
                        match session.apply_computer(mov) {
                            Ok(_) => {
                                writeln!(out, "Computer plays {}.", mov.index + 1)?;
                                if let (DecisionSource::Advisor, Some(rationale)) =
                                    (decision.source, &decision.rationale)
                                {
                                    writeln!(out, "  \"{}\"", rationale)?;
                                }
                                if decision.fell_back() {
                                    writeln!(out, "  (advisor unavailable, used fallback policy)")?;
                                }
                                writeln!(out, "\n{}\n", session.game().board())?;
                            }
                            Err(MoveError::StaleMove { .. }) => debug!(%mov, "Discarded stale move"),
                            Err(e) => return Err(e.into()),
                        }
                        break;
                    }
                    line = lines.next_line() => match line?.map(|l| Input::parse(&l)) {
                        None | Some(Input::Quit) => return Ok(()),
                        Some(Input::Reset) => {
                            info!("Reset while computer was thinking");
                            session.reset();
                            writeln!(out, "New game.\n\n{}\n", session.game().board())?;
                            break;
                        }
                        Some(_) => writeln!(out, "Wait for the computer, or r to reset, q to quit.")?,
                    },
                }
            }
            continue;
        }

        if session.game().is_terminal() {
            let verdict = match session.game().status() {
                GameStatus::Won(winner) if winner == session.human() => "You win!".to_string(),
                GameStatus::Won(winner) => format!("{} wins.", winner),
                _ => "Draw.".to_string(),
            };
            writeln!(out, "{} {}", verdict, session.tally())?;
            writeln!(out, "r for a new game, q to quit.")?;
        } else {
            write!(out, "Your move ({}): ", session.human())?;
            out.flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        match Input::parse(&line) {
            Input::Quit => return Ok(()),
            Input::Reset => {
                session.reset();
                writeln!(out, "New game.\n\n{}\n", session.game().board())?;
            }
            Input::Help => writeln!(out, "{}", HELP)?,
            Input::Cell(index) if !session.game().is_terminal() => match session.human_move(index) {
                Ok(_) => writeln!(out, "\n{}\n", session.game().board())?,
                Err(MoveError::SquareOccupied(index)) => {
                    writeln!(out, "Cell {} is taken. Try again.", index + 1)?;
                }
                Err(e) => {
                    warn!(error = %e, "Rejected human move");
                    writeln!(out, "{}. Try again.", e)?;
                }
            },
            Input::Cell(_) => writeln!(out, "The game is over. r for a new game, q to quit.")?,
            Input::Unknown(text) => writeln!(out, "Unrecognized input {:?}. {}", text, HELP)?,
        }
    }
}
