//! Tests for policy-versus-policy matches.

use noughts::{AppConfig, OpponentKind, run_matches, selfplay};
use noughts_core::{HeuristicPolicy, RandomPolicy};

#[tokio::test]
async fn test_heuristic_mirror_always_draws() {
    let stats = run_matches(&mut HeuristicPolicy::new(), &mut HeuristicPolicy::new(), 10)
        .await
        .unwrap();
    assert_eq!(stats.games, 10);
    assert_eq!(stats.draws, 10);
    assert_eq!(stats.fallbacks, 0);
}

#[tokio::test]
async fn test_heuristic_outplays_random() {
    let mut random = RandomPolicy::seeded(99);
    let mut heuristic = HeuristicPolicy::new();

    let as_x = run_matches(&mut heuristic, &mut random, 200).await.unwrap();
    assert!(as_x.x_wins > as_x.o_wins * 4, "{}", as_x);

    let as_o = run_matches(&mut random, &mut heuristic, 200).await.unwrap();
    assert!(as_o.o_wins > as_o.x_wins, "{}", as_o);
    assert_eq!(as_o.x_wins + as_o.o_wins + as_o.draws, 200);
}

#[tokio::test]
async fn test_seeded_selfplay_is_reproducible() {
    let config = AppConfig::default();
    let a = selfplay(&config, OpponentKind::Random, OpponentKind::Random, 50, Some(7))
        .await
        .unwrap();
    let b = selfplay(&config, OpponentKind::Random, OpponentKind::Random, 50, Some(7))
        .await
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(a.games, 50);
}

#[tokio::test]
async fn test_zero_games() {
    let stats = run_matches(&mut HeuristicPolicy::new(), &mut HeuristicPolicy::basic(), 0)
        .await
        .unwrap();
    assert_eq!(stats, Default::default());
    assert_eq!(stats.to_string(), "0 games: X 0 / O 0 / draw 0");
}
