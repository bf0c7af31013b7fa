//! Move policies: pluggable strategies that pick a cell from a snapshot.
//!
//! - [`RandomPolicy`]: uniform choice with an injected seedable RNG
//! - [`HeuristicPolicy`]: win > block > fork > center > corner > edge
//! - [`ExternalAdvisedPolicy`]: asks a [`MoveAdvisor`], validates the
//!   answer, and falls back to another policy on any failure

mod advised;
mod heuristic;
mod random;

pub use advised::{AdvisorError, AdvisorErrorKind, AdvisorReply, AdvisorRequest, ExternalAdvisedPolicy, MoveAdvisor};
pub use heuristic::{HeuristicPolicy, HeuristicTier};
pub use random::RandomPolicy;

use crate::state::Snapshot;
use serde::{Deserialize, Serialize};

/// Where a decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionSource {
    /// Uniform random choice.
    Random,
    /// A heuristic tier fired.
    Heuristic(HeuristicTier),
    /// The external advisor's answer was accepted.
    Advisor,
    /// The advisor failed; the fallback policy decided.
    Fallback,
}

/// A policy's chosen cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDecision {
    /// Chosen cell index.
    pub index: usize,
    /// Free-form explanation, diagnostic only.
    pub rationale: Option<String>,
    /// Which path produced the decision.
    pub source: DecisionSource,
}

impl MoveDecision {
    /// Creates a decision without rationale.
    pub fn new(index: usize, source: DecisionSource) -> Self {
        Self {
            index,
            rationale: None,
            source,
        }
    }

    /// Attaches a rationale.
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    /// True when an advisor failure forced the fallback path.
    pub fn fell_back(&self) -> bool {
        self.source == DecisionSource::Fallback
    }
}

/// Capability: choose a move given a snapshot.
///
/// Callers guarantee the snapshot is not terminal and has at least one
/// available cell. Implementations must return one of
/// [`Snapshot::available`]; the arbitrator treats anything else as a
/// broken policy.
#[async_trait::async_trait]
pub trait MovePolicy: Send + Sync {
    /// Picks a cell for `snapshot.to_move()`.
    async fn choose_move(&mut self, snapshot: &Snapshot) -> MoveDecision;

    /// Returns the policy's display name.
    fn name(&self) -> &str;
}

#[async_trait::async_trait]
impl<P: MovePolicy + ?Sized> MovePolicy for Box<P> {
    async fn choose_move(&mut self, snapshot: &Snapshot) -> MoveDecision {
        (**self).choose_move(snapshot).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
