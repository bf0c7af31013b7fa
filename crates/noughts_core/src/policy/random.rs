//! Uniform random policy.

use super::{DecisionSource, MoveDecision, MovePolicy};
use crate::state::Snapshot;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

/// Picks uniformly among available cells.
///
/// Randomness is injected: the RNG is owned by the policy and can be
/// seeded for reproducible games.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    name: String,
    rng: ChaCha8Rng,
}

impl RandomPolicy {
    /// Creates a policy with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Creates a policy seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }

    /// Creates a policy around an existing RNG.
    pub fn with_rng(rng: ChaCha8Rng) -> Self {
        Self {
            name: "Random".to_string(),
            rng,
        }
    }

    /// Synchronous pick, shared with the advisor fallback path.
    ///
    /// # Panics
    ///
    /// If the snapshot has no available cells.
    pub fn pick(&mut self, snapshot: &Snapshot) -> MoveDecision {
        let index = *snapshot
            .available()
            .choose(&mut self.rng)
            .expect("RandomPolicy called on a position with no legal moves");
        MoveDecision::new(index, DecisionSource::Random)
    }
}

#[async_trait::async_trait]
impl MovePolicy for RandomPolicy {
    #[instrument(skip(self, snapshot), fields(to_move = %snapshot.to_move()))]
    async fn choose_move(&mut self, snapshot: &Snapshot) -> MoveDecision {
        let decision = self.pick(snapshot);
        debug!(index = decision.index, "Random choice");
        decision
    }

    fn name(&self) -> &str {
        &self.name
    }
}
