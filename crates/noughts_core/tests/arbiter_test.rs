//! Tests for move arbitration.

use noughts_core::{
    ArbiterError, DecisionSource, GameState, GameStatus, HeuristicPolicy, MoveArbitrator,
    MoveDecision, MoveError, MovePolicy, Player, RandomPolicy, Snapshot,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Policy that always answers the same cell, legal or not.
struct StubbornPolicy {
    index: usize,
    calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl MovePolicy for StubbornPolicy {
    async fn choose_move(&mut self, _snapshot: &Snapshot) -> MoveDecision {
        self.calls.fetch_add(1, Ordering::SeqCst);
        MoveDecision::new(self.index, DecisionSource::Random)
    }

    fn name(&self) -> &str {
        "Stubborn"
    }
}

fn stubborn(index: usize) -> (StubbornPolicy, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    (
        StubbornPolicy {
            index,
            calls: calls.clone(),
        },
        calls,
    )
}

#[tokio::test]
async fn test_request_move_returns_validated_move() {
    let game = GameState::new();
    let mov = MoveArbitrator::new()
        .request_move(&game, &mut HeuristicPolicy::new())
        .await
        .expect("Legal move");
    assert_eq!(mov.index, 4);
    assert_eq!(mov.player, Player::X);
    assert_eq!(mov.generation, game.generation());
    // Requesting does not apply.
    assert!(game.history().is_empty());
}

#[tokio::test]
async fn test_terminal_state_refused_without_calling_policy() {
    let mut game = GameState::new();
    for (index, mark) in [(0, Player::X), (3, Player::O), (1, Player::X), (4, Player::O), (2, Player::X)] {
        game.apply_move(index, mark).unwrap();
    }
    let (mut policy, calls) = stubborn(8);

    let result = MoveArbitrator::new().request_move(&game, &mut policy).await;
    assert_eq!(
        result,
        Err(ArbiterError::InvalidState {
            generation: game.generation()
        })
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_illegal_policy_answer_is_contract_violation() {
    let mut game = GameState::new();
    game.apply_move(4, Player::X).unwrap();

    for index in [4, 9] {
        let (mut policy, calls) = stubborn(index);
        let result = MoveArbitrator::new().request_move(&game, &mut policy).await;
        assert_eq!(
            result,
            Err(ArbiterError::PolicyContractViolation {
                policy: "Stubborn".to_string(),
                index,
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
    assert_eq!(game.history().len(), 1);
}

#[tokio::test]
async fn test_move_from_reset_game_is_stale() {
    let arbiter = MoveArbitrator::new();
    let mut game = GameState::new();
    let snapshot = game.snapshot();

    // The game is reset while the policy is thinking.
    game = GameState::new();
    let (mov, _) = arbiter
        .decide(snapshot, &mut RandomPolicy::seeded(1))
        .await
        .unwrap();

    assert!(matches!(game.apply(mov), Err(MoveError::StaleMove { .. })));
    assert!(game.history().is_empty());
}

#[tokio::test]
async fn test_play_turn_applies_move() {
    let arbiter = MoveArbitrator::new();
    let mut game = GameState::new();
    let report = arbiter
        .play_turn(&mut game, &mut HeuristicPolicy::new())
        .await
        .unwrap();
    assert_eq!(report.mov.index, 4);
    assert!(!report.outcome.became_terminal);
    assert_eq!(game.to_move(), Player::O);
}

#[tokio::test]
async fn test_heuristic_self_play_draws() {
    let arbiter = MoveArbitrator::new();
    let mut game = GameState::new();
    let mut x = HeuristicPolicy::new();
    let mut o = HeuristicPolicy::new();
    while !game.is_terminal() {
        let policy: &mut dyn MovePolicy = match game.to_move() {
            Player::X => &mut x,
            Player::O => &mut o,
        };
        arbiter.play_turn(&mut game, policy).await.unwrap();
    }
    assert_eq!(game.status(), GameStatus::Draw);
}

#[tokio::test]
async fn test_random_games_always_terminate_legally() {
    let arbiter = MoveArbitrator::new();
    let mut x = RandomPolicy::seeded(5);
    let mut o = HeuristicPolicy::basic();
    for _ in 0..100 {
        let mut game = GameState::new();
        let mut turns = 0;
        while !game.is_terminal() {
            let policy: &mut dyn MovePolicy = match game.to_move() {
                Player::X => &mut x,
                Player::O => &mut o,
            };
            arbiter.play_turn(&mut game, policy).await.unwrap();
            turns += 1;
        }
        assert!((5..=9).contains(&turns));
        assert_eq!(game.history().len(), turns);
    }
}
