//! Core domain types for tic-tac-toe.

use crate::action::MoveError;
use crate::rules;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Number of cells on the board.
pub const CELLS: usize = 9;

/// Player in the game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    schemars::JsonSchema,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Player {
    /// Player X (goes first).
    X,
    /// Player O (goes second).
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

/// A square on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Square {
    /// Empty square.
    Empty,
    /// Square occupied by a player.
    Occupied(Player),
}

impl Square {
    /// Returns the occupying player, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Square::Empty => None,
            Square::Occupied(player) => Some(player),
        }
    }
}

/// 3x3 tic-tac-toe board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    /// Squares in row-major order (0-8).
    squares: [Square; CELLS],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            squares: [Square::Empty; CELLS],
        }
    }

    /// Builds a board from raw cells (`None` = empty).
    ///
    /// No turn-order validation is done; this is for hypothetical
    /// positions and test fixtures.
    pub fn from_cells(cells: [Option<Player>; CELLS]) -> Self {
        Self {
            squares: cells.map(|cell| cell.map_or(Square::Empty, Square::Occupied)),
        }
    }

    /// Gets the square at the given index (0-8).
    pub fn cell_at(&self, index: usize) -> Result<Square, MoveError> {
        self.squares
            .get(index)
            .copied()
            .ok_or(MoveError::OutOfRange(index))
    }

    /// Places `mark` on an empty square.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for indices above 8, `SquareOccupied` if the square
    /// already holds a mark. The board is unchanged on error.
    #[instrument(skip(self))]
    pub fn place(&mut self, index: usize, mark: Player) -> Result<(), MoveError> {
        match self.cell_at(index)? {
            Square::Empty => {
                self.squares[index] = Square::Occupied(mark);
                Ok(())
            }
            Square::Occupied(_) => Err(MoveError::SquareOccupied(index)),
        }
    }

    /// Checks if a square is empty. Out-of-range indices are never empty.
    pub fn is_empty(&self, index: usize) -> bool {
        matches!(self.squares.get(index), Some(Square::Empty))
    }

    /// Indices of all empty squares, ascending.
    pub fn empty_indices(&self) -> Vec<usize> {
        (0..CELLS).filter(|&i| self.is_empty(i)).collect()
    }

    /// True when no empty square remains.
    pub fn is_full(&self) -> bool {
        self.squares.iter().all(|s| *s != Square::Empty)
    }

    /// Number of squares holding `mark`.
    pub fn count(&self, mark: Player) -> usize {
        self.squares
            .iter()
            .filter(|s| **s == Square::Occupied(mark))
            .count()
    }

    /// Checks whether `mark` completes a line through `last`.
    pub fn line_winner(&self, last: usize, mark: Player) -> bool {
        rules::lines_through(last).any(|line| {
            line.iter()
                .all(|&i| self.squares[i] == Square::Occupied(mark))
        })
    }

    /// Winner over all eight lines, if any.
    pub fn winner(&self) -> Option<Player> {
        rules::check_winner(self)
    }

    /// Returns all squares as a slice.
    pub fn squares(&self) -> &[Square; CELLS] {
        &self.squares
    }

    /// Formats the board as a human-readable string.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                match self.squares[pos] {
                    Square::Empty => result.push_str(&(pos + 1).to_string()),
                    Square::Occupied(player) => result.push_str(&player.to_string()),
                }
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}
