//! Priority-ordered heuristic policy.
//!
//! Not a game-tree search: the first tier that yields a move wins, and
//! within a tier the lowest index is taken.

use super::{DecisionSource, MoveDecision, MovePolicy};
use crate::rules::{self, CENTER, CORNERS, EDGES};
use crate::state::Snapshot;
use crate::types::{Board, Player};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Heuristic tiers in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum HeuristicTier {
    /// Complete one of our own lines.
    Win,
    /// Stop the opponent completing a line.
    Block,
    /// Create two threats at once.
    ForkCreate,
    /// Deny the opponent a fork.
    ForkBlock,
    /// Take the center.
    Center,
    /// Take the first free corner.
    Corner,
    /// Take the first free edge.
    Edge,
}

/// Deterministic rule-based player.
#[derive(Debug, Clone)]
pub struct HeuristicPolicy {
    name: String,
    forks: bool,
}

impl HeuristicPolicy {
    /// Full heuristic including the fork tiers.
    pub fn new() -> Self {
        Self {
            name: "Heuristic".to_string(),
            forks: true,
        }
    }

    /// Win, block, center, corner, edge only.
    pub fn basic() -> Self {
        Self {
            name: "Heuristic (basic)".to_string(),
            forks: false,
        }
    }

    /// Whether fork tiers are evaluated.
    pub fn uses_forks(&self) -> bool {
        self.forks
    }

    /// Synchronous decision, shared with the advisor fallback path.
    ///
    /// # Panics
    ///
    /// If the snapshot has no available cells.
    #[instrument(skip(self, snapshot), fields(to_move = %snapshot.to_move()))]
    pub fn decide(&self, snapshot: &Snapshot) -> MoveDecision {
        let board = snapshot.board();
        let me = snapshot.to_move();
        let them = me.opponent();

        let tiers: [(HeuristicTier, Option<usize>); 3] = [
            (HeuristicTier::Win, first(rules::winning_cells(board, me))),
            (HeuristicTier::Block, first(rules::winning_cells(board, them))),
            (
                HeuristicTier::ForkCreate,
                self.forks.then(|| first(fork_cells(board, me))).flatten(),
            ),
        ];
        let forced = tiers
            .into_iter()
            .find_map(|(tier, cell)| cell.map(|c| (tier, c)))
            .or_else(|| {
                self.forks
                    .then(|| fork_block(board, me).map(|c| (HeuristicTier::ForkBlock, c)))
                    .flatten()
            });

        let (tier, index) = forced
            .or_else(|| board.is_empty(CENTER).then_some((HeuristicTier::Center, CENTER)))
            .or_else(|| first_free(board, &CORNERS).map(|c| (HeuristicTier::Corner, c)))
            .or_else(|| first_free(board, &EDGES).map(|c| (HeuristicTier::Edge, c)))
            .expect("HeuristicPolicy called on a position with no legal moves");

        debug!(%tier, index, "Heuristic choice");
        MoveDecision::new(index, DecisionSource::Heuristic(tier))
            .with_rationale(format!("{} at {}", tier, index))
    }
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MovePolicy for HeuristicPolicy {
    async fn choose_move(&mut self, snapshot: &Snapshot) -> MoveDecision {
        self.decide(snapshot)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn first(cells: Vec<usize>) -> Option<usize> {
    cells.first().copied()
}

fn first_free(board: &Board, cells: &[usize]) -> Option<usize> {
    cells.iter().copied().find(|&c| board.is_empty(c))
}

/// Empty cells where `mark` would end up with two simultaneous threats.
fn fork_cells(board: &Board, mark: Player) -> Vec<usize> {
    board
        .empty_indices()
        .into_iter()
        .filter(|&cell| {
            let mut next = board.clone();
            next.place(cell, mark).is_ok() && rules::winning_cells(&next, mark).len() >= 2
        })
        .collect()
}

/// Cell that stops the opponent of `me` from forking.
///
/// One opponent fork: occupy it. Several: force the opponent to block
/// somewhere that does not hand them a fork; failing that, occupy the
/// lowest fork cell.
fn fork_block(board: &Board, me: Player) -> Option<usize> {
    let them = me.opponent();
    let forks = fork_cells(board, them);
    match forks.as_slice() {
        [] => None,
        [only] => Some(*only),
        [lowest, ..] => board
            .empty_indices()
            .into_iter()
            .find(|&cell| {
                let mut next = board.clone();
                if next.place(cell, me).is_err() {
                    return false;
                }
                match rules::winning_cells(&next, me).as_slice() {
                    [forced] => !fork_cells(&next, them).contains(forced),
                    _ => false,
                }
            })
            .or(Some(*lowest)),
    }
}
