//! Policy-versus-policy matches.

use crate::config::AppConfig;
use crate::opponent::{OpponentKind, build_policy};
use noughts_core::{ArbiterError, GameState, GameStatus, MoveArbitrator, MovePolicy, Player};
use tracing::{debug, info, instrument};

/// Outcome counts over a series of games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelfPlayStats {
    /// Games played.
    pub games: u32,
    /// Games X won.
    pub x_wins: u32,
    /// Games O won.
    pub o_wins: u32,
    /// Drawn games.
    pub draws: u32,
    /// Moves where an advised policy fell back.
    pub fallbacks: u32,
}

impl std::fmt::Display for SelfPlayStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} games: X {} / O {} / draw {}",
            self.games, self.x_wins, self.o_wins, self.draws
        )?;
        if self.fallbacks > 0 {
            write!(f, " ({} advisor fallbacks)", self.fallbacks)?;
        }
        Ok(())
    }
}

/// Plays `games` games of `x` against `o`, X always moving first.
#[instrument(skip(x, o), fields(x = %x.name(), o = %o.name()))]
pub async fn run_matches(
    x: &mut dyn MovePolicy,
    o: &mut dyn MovePolicy,
    games: u32,
) -> Result<SelfPlayStats, ArbiterError> {
    let arbiter = MoveArbitrator::new();
    let mut stats = SelfPlayStats::default();

    for game_number in 1..=games {
        let mut game = GameState::new();
        while !game.is_terminal() {
            let policy: &mut dyn MovePolicy = match game.to_move() {
                Player::X => &mut *x,
                Player::O => &mut *o,
            };
            let report = arbiter.play_turn(&mut game, policy).await?;
            if report.decision.fell_back() {
                stats.fallbacks += 1;
            }
        }

        stats.games += 1;
        match game.status() {
            GameStatus::Won(Player::X) => stats.x_wins += 1,
            GameStatus::Won(Player::O) => stats.o_wins += 1,
            _ => stats.draws += 1,
        }
        debug!(game_number, status = %game.status(), "Game finished");
    }

    info!(%stats, "Self-play complete");
    Ok(stats)
}

/// Builds both policies from configuration and plays them.
///
/// X and O get different seeds derived from `seed` so two random
/// players do not mirror each other.
pub async fn selfplay(
    config: &AppConfig,
    x_kind: OpponentKind,
    o_kind: OpponentKind,
    games: u32,
    seed: Option<u64>,
) -> anyhow::Result<SelfPlayStats> {
    let seed = seed.or(*config.seed());
    let mut x = build_policy(x_kind, config, seed)?;
    let mut o = build_policy(o_kind, config, seed.map(|s| s.wrapping_add(1)))?;
    Ok(run_matches(x.as_mut(), o.as_mut(), games).await?)
}
