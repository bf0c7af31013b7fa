//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`]: the eight winning lines, win and draw
//! detection, and line inspection used by the heuristic policy.

use crate::types::{Board, Player, Square};
use tracing::instrument;

/// The eight winning lines: rows, columns, diagonals.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2], [3, 4, 5], [6, 7, 8], // Rows
    [0, 3, 6], [1, 4, 7], [2, 5, 8], // Columns
    [0, 4, 8], [2, 4, 6],            // Diagonals
];

/// Corner cells in tie-break order.
pub const CORNERS: [usize; 4] = [0, 2, 6, 8];

/// Edge cells in tie-break order.
pub const EDGES: [usize; 4] = [1, 3, 5, 7];

/// Center cell.
pub const CENTER: usize = 4;

/// Lines passing through `index`.
///
/// Only even indices lie on a diagonal.
pub fn lines_through(index: usize) -> impl Iterator<Item = &'static [usize; 3]> {
    let row = index / 3;
    let col = index % 3;
    let table: &'static [[usize; 3]; 8] = &LINES;
    table.iter().enumerate().filter_map(move |(n, line)| {
        let hit = match n {
            0..=2 => n == row,
            3..=5 => n - 3 == col,
            _ => index % 2 == 0 && line.contains(&index),
        };
        hit.then_some(line)
    })
}

/// Checks if there is a winner on the board.
///
/// Returns `Some(player)` if the player has three in a row,
/// `None` otherwise.
#[instrument(skip(board))]
pub fn check_winner(board: &Board) -> Option<Player> {
    let squares = board.squares();
    LINES.iter().find_map(|&[a, b, c]| {
        let sq = squares[a];
        if sq != Square::Empty && sq == squares[b] && sq == squares[c] {
            sq.player()
        } else {
            None
        }
    })
}

/// Checks if the board is full with no winner.
#[instrument(skip(board))]
pub fn is_draw(board: &Board) -> bool {
    board.is_full() && check_winner(board).is_none()
}

/// If `line` holds exactly two of `mark` and one empty cell, returns that cell.
pub fn completing_cell(board: &Board, line: &[usize; 3], mark: Player) -> Option<usize> {
    let squares = board.squares();
    let own = line
        .iter()
        .filter(|&&i| squares[i] == Square::Occupied(mark))
        .count();
    let empty = line.iter().find(|&&i| squares[i] == Square::Empty);
    if own == 2 { empty.copied() } else { None }
}

/// Cells where `mark` would complete a line right now, ascending, deduplicated.
pub fn winning_cells(board: &Board, mark: Player) -> Vec<usize> {
    let mut cells: Vec<usize> = LINES
        .iter()
        .filter_map(|line| completing_cell(board, line, mark))
        .collect();
    cells.sort_unstable();
    cells.dedup();
    cells
}
