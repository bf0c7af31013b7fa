//! Tic-tac-toe game engine with pluggable move policies.
//!
//! # Architecture
//!
//! - **Board / rules**: nine cells, eight lines, win and draw detection
//! - **GameState**: turn order, move application, terminal detection
//! - **Policies**: random, heuristic, and advisor-backed with fallback
//! - **MoveArbitrator**: asks a policy, validates, returns a legal move
//!
//! # Example
//!
//! ```
//! use noughts_core::{GameState, HeuristicPolicy, MoveArbitrator, Player};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut game = GameState::new();
//! game.apply_move(0, Player::X)?;
//!
//! let mut ai = HeuristicPolicy::new();
//! let mov = MoveArbitrator::new().request_move(&game, &mut ai).await?;
//! game.apply(mov)?;
//! assert_eq!(game.board().cell_at(4)?, noughts_core::Square::Occupied(Player::O));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod arbiter;
mod contracts;
mod policy;
mod rules;
mod state;
mod types;

pub use action::{Move, MoveError};
pub use arbiter::{ArbiterError, MoveArbitrator, TurnReport};
pub use contracts::{
    BalancedMarks, Contract, GameNotOver, Invariant, LegalMove, MonotonicBoard, MoveContract,
    PlayersTurn, SameGeneration, SquareIsEmpty,
};
pub use policy::{
    AdvisorError, AdvisorErrorKind, AdvisorReply, AdvisorRequest, DecisionSource,
    ExternalAdvisedPolicy, HeuristicPolicy, HeuristicTier, MoveAdvisor, MoveDecision, MovePolicy,
    RandomPolicy,
};
pub use rules::{CENTER, CORNERS, EDGES, LINES, check_winner, is_draw};
pub use state::{ApplyResult, GameState, GameStatus, Snapshot};
pub use types::{Board, CELLS, Player, Square};

/// Alias used where "mark" reads better than "player".
pub type Mark = Player;
