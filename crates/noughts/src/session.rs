//! A human-versus-computer session spanning several games.

use noughts_core::{ApplyResult, GameState, GameStatus, Move, MoveError, Player};
use tracing::{debug, info, instrument};

/// Results so far, from the human's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Games the human won.
    pub wins: u32,
    /// Games the computer won.
    pub losses: u32,
    /// Drawn games.
    pub draws: u32,
    /// Games reset before they finished.
    pub abandoned: u32,
}

impl std::fmt::Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "You {} - {} Computer ({} drawn, {} abandoned)",
            self.wins, self.losses, self.draws, self.abandoned
        )
    }
}

/// The current game plus the running tally.
///
/// A reset replaces the game, so any move decided for the old one
/// carries a stale generation and is refused.
#[derive(Debug, Clone)]
pub struct Session {
    game: GameState,
    human: Player,
    tally: Tally,
}

impl Session {
    /// Starts a session with the human playing `human`.
    #[instrument]
    pub fn new(human: Player) -> Self {
        info!("Starting session");
        Self {
            game: GameState::new(),
            human,
            tally: Tally::default(),
        }
    }

    /// The game in progress.
    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// The human's mark.
    pub fn human(&self) -> Player {
        self.human
    }

    /// The computer's mark.
    pub fn computer(&self) -> Player {
        self.human.opponent()
    }

    /// Results so far.
    pub fn tally(&self) -> Tally {
        self.tally
    }

    /// True when the game is live and the computer is to move.
    pub fn is_computer_turn(&self) -> bool {
        !self.game.is_terminal() && self.game.to_move() == self.computer()
    }

    /// Abandons the current game and starts a new one.
    ///
    /// Returns the new generation.
    #[instrument(skip(self), fields(old = self.game.generation()))]
    pub fn reset(&mut self) -> u64 {
        if !self.game.is_terminal() && !self.game.history().is_empty() {
            self.tally.abandoned += 1;
        }
        self.game = GameState::new();
        info!(generation = self.game.generation(), "Game reset");
        self.game.generation()
    }

    /// Places the human's mark at `index`.
    pub fn human_move(&mut self, index: usize) -> Result<ApplyResult, MoveError> {
        let result = self.game.apply_move(index, self.human)?;
        self.record(result);
        Ok(result)
    }

    /// Applies a move decided by the computer's policy.
    ///
    /// # Errors
    ///
    /// `StaleMove` if the game was reset after the move was decided.
    pub fn apply_computer(&mut self, mov: Move) -> Result<ApplyResult, MoveError> {
        if mov.player != self.computer() {
            return Err(MoveError::WrongTurn(mov.player));
        }
        let result = self.game.apply(mov)?;
        self.record(result);
        Ok(result)
    }

    fn record(&mut self, result: ApplyResult) {
        if !result.became_terminal {
            return;
        }
        match self.game.status() {
            GameStatus::Won(winner) if winner == self.human => self.tally.wins += 1,
            GameStatus::Won(_) => self.tally.losses += 1,
            GameStatus::Draw => self.tally.draws += 1,
            GameStatus::InProgress => {}
        }
        debug!(tally = %self.tally, "Game finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_win_is_tallied() {
        let mut session = Session::new(Player::X);
        let computer = session.computer();
        for (human, comp) in [(0, 3), (1, 4)] {
            session.human_move(human).unwrap();
            let mov = Move::new(comp, computer, session.game().generation());
            session.apply_computer(mov).unwrap();
        }
        let result = session.human_move(2).unwrap();
        assert!(result.became_terminal);
        assert_eq!(session.tally().wins, 1);
    }

    #[test]
    fn test_human_cannot_move_out_of_turn() {
        let mut session = Session::new(Player::O);
        assert!(session.is_computer_turn());
        assert_eq!(session.human_move(4), Err(MoveError::WrongTurn(Player::O)));
    }

    #[test]
    fn test_computer_move_for_old_game_is_stale() {
        let mut session = Session::new(Player::O);
        let old = session.game().generation();
        let mov = Move::new(4, Player::X, old);

        let new = session.reset();
        assert_ne!(old, new);
        assert!(matches!(session.apply_computer(mov), Err(MoveError::StaleMove { .. })));
        assert!(session.game().history().is_empty());
    }

    #[test]
    fn test_reset_counts_abandoned_games() {
        let mut session = Session::new(Player::X);
        session.reset();
        assert_eq!(session.tally().abandoned, 0);
        session.human_move(4).unwrap();
        session.reset();
        assert_eq!(session.tally().abandoned, 1);
    }
}
