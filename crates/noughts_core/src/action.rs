//! First-class move types for tic-tac-toe.
//!
//! Moves are values, not side effects: a policy produces one, the
//! arbitrator validates it, and the caller applies it to the game it
//! was decided for.

use crate::types::Player;
use serde::{Deserialize, Serialize};

/// A player placing their mark on a cell of a specific game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Cell index (0-8).
    pub index: usize,
    /// The mark being placed.
    pub player: Player,
    /// Generation of the game state this move was decided for.
    pub generation: u64,
}

impl Move {
    /// Creates a new move.
    pub fn new(index: usize, player: Player, generation: u64) -> Self {
        Self {
            index,
            player,
            generation,
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.player, self.index)
    }
}

/// Error that can occur when validating or applying a move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    /// The index is not a board cell.
    #[display("Index {} is outside the board (0-8)", _0)]
    OutOfRange(#[error(not(source))] usize),

    /// The square at the index is already occupied.
    #[display("Square {} is already occupied", _0)]
    SquareOccupied(#[error(not(source))] usize),

    /// It's not this player's turn.
    #[display("It's not {}'s turn", _0)]
    WrongTurn(#[error(not(source))] Player),

    /// The game is already over.
    #[display("Game is already over")]
    GameOver,

    /// The move was decided for a different game instance.
    #[display("Move was decided for game {} but this is game {}", decided, current)]
    StaleMove {
        /// Generation recorded in the move.
        decided: u64,
        /// Generation of the state it was applied to.
        current: u64,
    },

    /// An invariant was violated (postcondition failure).
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(#[error(not(source))] String),
}

impl MoveError {
    /// True for errors that mean the caller chose a bad move and may retry.
    pub fn is_illegal_move(&self) -> bool {
        matches!(
            self,
            MoveError::OutOfRange(_) | MoveError::SquareOccupied(_) | MoveError::WrongTurn(_)
        )
    }
}
