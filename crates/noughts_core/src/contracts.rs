//! Contract-based validation for moves.
//!
//! Preconditions decide whether a move may be applied at all.
//! Postconditions re-check game invariants after a transition and run
//! in debug builds only.

use crate::action::{Move, MoveError};
use crate::state::GameState;
use crate::types::{Board, Player};
use tracing::{instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// Preconditions and postconditions for a state transition.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), MoveError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), MoveError>;
}

// ─────────────────────────────────────────────────────────────
//  Move Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the game has not finished.
pub struct GameNotOver;

impl GameNotOver {
    /// Rejects moves on a terminal state.
    pub fn check(game: &GameState) -> Result<(), MoveError> {
        if game.is_terminal() {
            Err(MoveError::GameOver)
        } else {
            Ok(())
        }
    }
}

/// Precondition: the move belongs to this game instance.
pub struct SameGeneration;

impl SameGeneration {
    /// Rejects moves decided for an earlier or different game.
    pub fn check(mov: &Move, game: &GameState) -> Result<(), MoveError> {
        if mov.generation != game.generation() {
            Err(MoveError::StaleMove {
                decided: mov.generation,
                current: game.generation(),
            })
        } else {
            Ok(())
        }
    }
}

/// Precondition: it must be the player's turn.
pub struct PlayersTurn;

impl PlayersTurn {
    /// Rejects a mark that is not the one to move.
    pub fn check(mov: &Move, game: &GameState) -> Result<(), MoveError> {
        if mov.player != game.to_move() {
            Err(MoveError::WrongTurn(mov.player))
        } else {
            Ok(())
        }
    }
}

/// Precondition: the target square must exist and be empty.
pub struct SquareIsEmpty;

impl SquareIsEmpty {
    /// Rejects out-of-range and occupied cells.
    pub fn check(mov: &Move, game: &GameState) -> Result<(), MoveError> {
        if game.board().cell_at(mov.index)?.player().is_some() {
            Err(MoveError::SquareOccupied(mov.index))
        } else {
            Ok(())
        }
    }
}

/// Composite precondition for applying a move.
pub struct LegalMove;

impl LegalMove {
    /// Validates all preconditions for a move.
    #[instrument(skip(game), fields(generation = game.generation()))]
    pub fn check(mov: &Move, game: &GameState) -> Result<(), MoveError> {
        GameNotOver::check(game)?;
        SameGeneration::check(mov, game)?;
        PlayersTurn::check(mov, game)?;
        SquareIsEmpty::check(mov, game)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Invariants
// ─────────────────────────────────────────────────────────────

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Invariant: squares are never overwritten.
///
/// Replaying the history onto an empty board must succeed and reproduce
/// the current board exactly.
pub struct MonotonicBoard;

impl Invariant<GameState> for MonotonicBoard {
    fn holds(game: &GameState) -> bool {
        let mut reconstructed = Board::new();
        for mov in game.history() {
            if reconstructed.place(mov.index, mov.player).is_err() {
                return false;
            }
        }
        reconstructed == *game.board()
    }

    fn description() -> &'static str {
        "Board squares are monotonic (never overwritten)"
    }
}

/// Invariant: X and O counts differ by at most one.
pub struct BalancedMarks;

impl Invariant<GameState> for BalancedMarks {
    fn holds(game: &GameState) -> bool {
        let x_count = game.board().count(Player::X);
        let o_count = game.board().count(Player::O);
        let valid = x_count.abs_diff(o_count) <= 1;
        if !valid {
            warn!(x_count, o_count, "Board balance violated");
        }
        valid
    }

    fn description() -> &'static str {
        "Mark counts differ by at most one"
    }
}

// ─────────────────────────────────────────────────────────────
//  Move Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for applying a move to a [`GameState`].
///
/// Preconditions: game not over, same generation, player's turn, empty
/// square. Postconditions: history grew by one, board monotonic, marks
/// balanced.
pub struct MoveContract;

impl Contract<GameState, Move> for MoveContract {
    fn pre(game: &GameState, action: &Move) -> Result<(), MoveError> {
        LegalMove::check(action, game)
    }

    fn post(before: &GameState, after: &GameState) -> Result<(), MoveError> {
        let mut violations = Vec::new();
        if after.history().len() != before.history().len() + 1 {
            violations.push("History grows by exactly one move");
        }
        if !MonotonicBoard::holds(after) {
            violations.push(MonotonicBoard::description());
        }
        if !BalancedMarks::holds(after) {
            violations.push(BalancedMarks::description());
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(MoveError::InvariantViolation(format!(
                "Postcondition failed: {}",
                violations.join("; ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_empty_square() {
        let game = GameState::new();
        let action = Move::new(4, Player::X, game.generation());
        assert!(MoveContract::pre(&game, &action).is_ok());
    }

    #[test]
    fn test_precondition_occupied_square() {
        let mut game = GameState::new();
        game.apply_move(4, Player::X).unwrap();
        let action = Move::new(4, Player::O, game.generation());
        assert_eq!(
            MoveContract::pre(&game, &action),
            Err(MoveError::SquareOccupied(4))
        );
    }

    #[test]
    fn test_precondition_wrong_turn() {
        let game = GameState::new();
        let action = Move::new(4, Player::O, game.generation());
        assert_eq!(
            MoveContract::pre(&game, &action),
            Err(MoveError::WrongTurn(Player::O))
        );
    }

    #[test]
    fn test_precondition_other_generation() {
        let game = GameState::new();
        let other = GameState::new();
        let action = Move::new(4, Player::X, other.generation());
        assert!(matches!(
            MoveContract::pre(&game, &action),
            Err(MoveError::StaleMove { .. })
        ));
    }

    #[test]
    fn test_postcondition_holds_after_move() {
        let before = GameState::new();
        let mut after = before.clone();
        after.apply_move(4, Player::X).unwrap();
        assert!(MoveContract::post(&before, &after).is_ok());
    }

    #[test]
    fn test_postcondition_detects_corruption() {
        let before = GameState::new();
        let mut after = before.clone();
        after.apply_move(4, Player::X).unwrap();
        after.board_mut_for_tests().place(0, Player::O).unwrap();
        assert!(MoveContract::post(&before, &after).is_err());
        assert!(!MonotonicBoard::holds(&after));
    }
}
