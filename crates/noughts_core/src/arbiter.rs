//! Move arbitration: ask a policy, check its answer, hand back a move.

use crate::action::{Move, MoveError};
use crate::policy::{MoveDecision, MovePolicy};
use crate::state::{ApplyResult, GameState, Snapshot};
use derive_more::{Display, Error, From};
use tracing::{debug, error, instrument};

/// Errors surfaced by the arbitrator.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum ArbiterError {
    /// A move was requested for a finished game.
    #[display("Cannot request a move: game {} is over", generation)]
    #[from(ignore)]
    InvalidState {
        /// Generation of the finished game.
        generation: u64,
    },

    /// The policy returned a cell that is not available.
    #[display("Policy '{}' returned illegal cell {}", policy, index)]
    #[from(ignore)]
    PolicyContractViolation {
        /// Name of the offending policy.
        policy: String,
        /// The cell it returned.
        index: usize,
    },

    /// Applying the validated move failed.
    #[display("{}", _0)]
    Apply(MoveError),
}

/// Result of a full turn: the decision and what applying it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    /// The applied move.
    pub mov: Move,
    /// The policy's decision, rationale included.
    pub decision: MoveDecision,
    /// State change caused by the move.
    pub outcome: ApplyResult,
}

/// Orchestrates one decision at a time.
///
/// Does not mutate game state itself except through
/// [`MoveArbitrator::play_turn`], which is a plain request-then-apply.
#[derive(Debug, Clone, Default)]
pub struct MoveArbitrator;

impl MoveArbitrator {
    /// Creates an arbitrator.
    pub fn new() -> Self {
        Self
    }

    /// Asks `policy` for a move on `state`.
    ///
    /// # Errors
    ///
    /// `InvalidState` if the game is over (the policy is not called),
    /// `PolicyContractViolation` if the answer is not an available cell.
    pub async fn request_move(
        &self,
        state: &GameState,
        policy: &mut dyn MovePolicy,
    ) -> Result<Move, ArbiterError> {
        self.decide(state.snapshot(), policy)
            .await
            .map(|(mov, _)| mov)
    }

    /// Same contract as [`MoveArbitrator::request_move`] on an owned
    /// snapshot, also returning the policy's decision.
    ///
    /// Lets the caller release the game while the policy thinks; the
    /// returned move carries the snapshot's generation so a stale answer
    /// is rejected when applied.
    #[instrument(skip(self, snapshot, policy), fields(policy = %policy.name(), generation = snapshot.generation()))]
    pub async fn decide(
        &self,
        snapshot: Snapshot,
        policy: &mut dyn MovePolicy,
    ) -> Result<(Move, MoveDecision), ArbiterError> {
        if snapshot.is_terminal() || snapshot.available().is_empty() {
            return Err(ArbiterError::InvalidState {
                generation: snapshot.generation(),
            });
        }

        let decision = policy.choose_move(&snapshot).await;
        if !snapshot.is_available(decision.index) {
            error!(
                index = decision.index,
                available = ?snapshot.available(),
                "Policy contract violation"
            );
            return Err(ArbiterError::PolicyContractViolation {
                policy: policy.name().to_string(),
                index: decision.index,
            });
        }

        let mov = Move::new(decision.index, snapshot.to_move(), snapshot.generation());
        debug!(%mov, source = ?decision.source, "Move validated");
        Ok((mov, decision))
    }

    /// Requests a move from `policy` and applies it to `state`.
    pub async fn play_turn(
        &self,
        state: &mut GameState,
        policy: &mut dyn MovePolicy,
    ) -> Result<TurnReport, ArbiterError> {
        let (mov, decision) = self.decide(state.snapshot(), policy).await?;
        let outcome = state.apply(mov)?;
        Ok(TurnReport {
            mov,
            decision,
            outcome,
        })
    }
}
