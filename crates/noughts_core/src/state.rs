//! Game state machine.
//!
//! `InProgress(X) ⇄ InProgress(O)` on every accepted non-final move, and
//! either of them to `Won` or `Draw` on a winning or board-filling move.
//! Nothing leaves a terminal status; a new game is a new [`GameState`].

use crate::action::{Move, MoveError};
use crate::contracts::{Contract, MoveContract};
use crate::types::{Board, Player};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, instrument};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Current status of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Game is ongoing.
    InProgress,
    /// Game ended in a win.
    Won(Player),
    /// Game ended in a draw.
    Draw,
}

impl GameStatus {
    /// True for `Won` and `Draw`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    /// The winner, if the game was won.
    pub fn winner(self) -> Option<Player> {
        match self {
            GameStatus::Won(player) => Some(player),
            _ => None,
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameStatus::InProgress => write!(f, "In progress"),
            GameStatus::Won(player) => write!(f, "Player {} wins", player),
            GameStatus::Draw => write!(f, "Draw"),
        }
    }
}

/// Outcome of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyResult {
    /// The move ended the game.
    pub became_terminal: bool,
    /// The winner, if the move won the game.
    pub winner: Option<Player>,
}

/// Read-only copy of a game handed to policies.
///
/// Owned, so a policy can keep it across an await point without
/// borrowing the live state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    board: Board,
    to_move: Player,
    status: GameStatus,
    available: Vec<usize>,
    generation: u64,
}

impl Snapshot {
    /// Builds a snapshot of an arbitrary in-progress position.
    ///
    /// Used for analysis and tests; the generation is 0, which no live
    /// game ever has.
    pub fn of_position(board: Board, to_move: Player) -> Self {
        let status = match board.winner() {
            Some(winner) => GameStatus::Won(winner),
            None if board.is_full() => GameStatus::Draw,
            None => GameStatus::InProgress,
        };
        let available = if status.is_terminal() {
            Vec::new()
        } else {
            board.empty_indices()
        };
        Self {
            available,
            board,
            to_move,
            status,
            generation: 0,
        }
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mark to move.
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    /// Game status when the snapshot was taken.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Legal cell indices, ascending.
    pub fn available(&self) -> &[usize] {
        &self.available
    }

    /// Generation of the game this snapshot came from.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True if the game had finished.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// True if `index` is a legal move in this snapshot.
    pub fn is_available(&self, index: usize) -> bool {
        self.available.contains(&index)
    }
}

/// Complete game state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    to_move: Player,
    status: GameStatus,
    history: Vec<Move>,
    generation: u64,
}

impl GameState {
    /// Creates a new game with X to move and a fresh generation.
    #[instrument]
    pub fn new() -> Self {
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        debug!(generation, "New game");
        Self {
            board: Board::new(),
            to_move: Player::X,
            status: GameStatus::InProgress,
            history: Vec::new(),
            generation,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the player to move.
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    /// Returns the game status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns the winner, if any.
    pub fn winner(&self) -> Option<Player> {
        self.status.winner()
    }

    /// True once the game is won or drawn.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns the accepted moves in order.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Identifies this game instance.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Legal cell indices, ascending. Empty once the game is over.
    pub fn empty_indices(&self) -> Vec<usize> {
        if self.is_terminal() {
            Vec::new()
        } else {
            self.board.empty_indices()
        }
    }

    /// Immutable copy for policies and renderers.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.clone(),
            to_move: self.to_move,
            status: self.status,
            available: self.empty_indices(),
            generation: self.generation,
        }
    }

    /// Places `mark` at `index` on this game.
    ///
    /// # Errors
    ///
    /// `GameOver`, `WrongTurn`, `OutOfRange` or `SquareOccupied`. The
    /// state is untouched on error.
    pub fn apply_move(&mut self, index: usize, mark: Player) -> Result<ApplyResult, MoveError> {
        self.apply(Move::new(index, mark, self.generation))
    }

    /// Applies a move decided for this game.
    ///
    /// Same as [`GameState::apply_move`], and additionally rejects moves
    /// whose generation is not this game's with `StaleMove`.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn apply(&mut self, mov: Move) -> Result<ApplyResult, MoveError> {
        MoveContract::pre(self, &mov)?;

        #[cfg(debug_assertions)]
        let before = self.clone();

        self.board.place(mov.index, mov.player)?;
        self.history.push(mov);

        let result = if self.board.line_winner(mov.index, mov.player) {
            self.status = GameStatus::Won(mov.player);
            info!(winner = %mov.player, moves = self.history.len(), "Game won");
            ApplyResult {
                became_terminal: true,
                winner: Some(mov.player),
            }
        } else if self.board.is_full() {
            self.status = GameStatus::Draw;
            info!("Game drawn");
            ApplyResult {
                became_terminal: true,
                winner: None,
            }
        } else {
            self.to_move = mov.player.opponent();
            ApplyResult {
                became_terminal: false,
                winner: None,
            }
        };

        #[cfg(debug_assertions)]
        MoveContract::post(&before, self)?;

        debug!(%mov, status = %self.status, "Move applied");
        Ok(result)
    }

    #[cfg(test)]
    pub(crate) fn board_mut_for_tests(&mut self) -> &mut Board {
        &mut self.board
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turns_alternate() {
        let mut game = GameState::new();
        assert_eq!(game.to_move(), Player::X);
        game.apply_move(4, Player::X).unwrap();
        assert_eq!(game.to_move(), Player::O);
        game.apply_move(0, Player::O).unwrap();
        assert_eq!(game.to_move(), Player::X);
    }

    #[test]
    fn test_rejection_leaves_state_untouched() {
        let mut game = GameState::new();
        game.apply_move(4, Player::X).unwrap();
        let before = game.clone();

        assert_eq!(game.apply_move(4, Player::O), Err(MoveError::SquareOccupied(4)));
        assert_eq!(game.apply_move(0, Player::X), Err(MoveError::WrongTurn(Player::X)));
        assert_eq!(game.apply_move(9, Player::O), Err(MoveError::OutOfRange(9)));
        assert_eq!(game, before);
    }

    #[test]
    fn test_generations_are_unique() {
        let a = GameState::new();
        let b = GameState::new();
        assert_ne!(a.generation(), b.generation());
        assert_ne!(a.generation(), 0);
    }

    #[test]
    fn test_snapshot_of_terminal_has_no_moves() {
        let mut game = GameState::new();
        for (index, mark) in [(0, Player::X), (3, Player::O), (1, Player::X), (4, Player::O), (2, Player::X)] {
            game.apply_move(index, mark).unwrap();
        }
        let snapshot = game.snapshot();
        assert!(snapshot.is_terminal());
        assert!(snapshot.available().is_empty());
        assert_eq!(snapshot.status(), GameStatus::Won(Player::X));
    }

    #[test]
    fn test_of_position_detects_status() {
        let x = Some(Player::X);
        let snapshot = Snapshot::of_position(
            Board::from_cells([x, x, x, None, None, None, None, None, None]),
            Player::O,
        );
        assert_eq!(snapshot.status(), GameStatus::Won(Player::X));
        assert_eq!(snapshot.generation(), 0);
    }
}
