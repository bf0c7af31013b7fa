//! Tests for the terminal play loop.

use noughts::{Session, run_session};
use noughts_core::{
    DecisionSource, GameStatus, HeuristicPolicy, MoveDecision, MovePolicy, Player, Snapshot,
};
use std::time::Duration;

/// Policy that never finishes deciding.
struct StuckPolicy;

#[async_trait::async_trait]
impl MovePolicy for StuckPolicy {
    async fn choose_move(&mut self, snapshot: &Snapshot) -> MoveDecision {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        MoveDecision::new(snapshot.available()[0], DecisionSource::Random)
    }

    fn name(&self) -> &str {
        "Stuck"
    }
}

async fn run(session: &mut Session, policy: &mut dyn MovePolicy, input: &str) -> String {
    let mut out = Vec::new();
    run_session(session, policy, input.as_bytes(), &mut out)
        .await
        .expect("Session runs");
    String::from_utf8(out).expect("UTF-8 output")
}

#[tokio::test]
async fn test_human_and_computer_alternate() {
    let mut session = Session::new(Player::O);
    let mut policy = HeuristicPolicy::new();
    // Computer X takes the center, human takes cell 1, computer takes a corner.
    let output = run(&mut session, &mut policy, "1\nq\n").await;

    let cells: Vec<usize> = session.game().history().iter().map(|m| m.index).collect();
    assert_eq!(cells, vec![4, 0, 2]);
    assert!(output.contains("Computer plays 5."));
    assert!(output.contains("Computer plays 3."));
}

#[tokio::test]
async fn test_bad_input_is_reported_not_fatal() {
    let mut session = Session::new(Player::X);
    let mut policy = HeuristicPolicy::new();
    let output = run(&mut session, &mut policy, "hello\n5\n5\nq\n").await;

    assert!(output.contains("Unrecognized input"));
    assert!(output.contains("Cell 5 is taken"));
    // X at 4, O in a corner, nothing else.
    assert_eq!(session.game().history().len(), 2);
}

#[tokio::test]
async fn test_reset_cancels_pending_decision() {
    let mut session = Session::new(Player::O);
    let first = session.game().generation();

    let started = std::time::Instant::now();
    let output = run(&mut session, &mut StuckPolicy, "r\nq\n").await;

    assert!(started.elapsed() < Duration::from_secs(60));
    assert!(output.contains("New game."));
    assert_ne!(session.game().generation(), first);
    assert!(session.game().history().is_empty());
}

#[tokio::test]
async fn test_end_of_input_quits() {
    let mut session = Session::new(Player::X);
    let mut policy = HeuristicPolicy::new();
    run(&mut session, &mut policy, "").await;
    assert!(session.game().history().is_empty());
}

#[tokio::test]
async fn test_completed_game_is_tallied() {
    let mut session = Session::new(Player::O);
    let mut policy = HeuristicPolicy::new();
    // X 4, O 0, X 2, O 7, then X completes the 2-4-6 diagonal.
    let output = run(&mut session, &mut policy, "1\n8\nq\n").await;

    assert_eq!(session.game().status(), GameStatus::Won(Player::X));
    assert_eq!(session.tally().losses, 1);
    assert!(output.contains("X wins."));
}
