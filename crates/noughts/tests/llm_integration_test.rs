//! Live tests against LLM providers. Run with `--features api`.

use noughts::{AdvisorConfig, LlmAdvisor, LlmClient, LlmConfig, LlmProvider, PromptTemplate};
use noughts_core::{
    ExternalAdvisedPolicy, GameState, HeuristicPolicy, MoveAdvisor, AdvisorRequest, MovePolicy,
    Player,
};
use tracing::instrument;

fn config_for(provider: LlmProvider, model: &str) -> LlmConfig {
    let api_key = std::env::var(provider.api_key_var())
        .unwrap_or_else(|_| panic!("{} not set", provider.api_key_var()));
    LlmConfig::new(provider, api_key, model.to_string(), 150)
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_openai_connectivity() {
    dotenvy::dotenv().ok();

    let client = LlmClient::new(config_for(LlmProvider::OpenAI, "gpt-4o-mini"));
    let response = client
        .generate("You are a helpful assistant.", "Say 'Hello, world!' and nothing else.")
        .await
        .expect("Failed to generate");

    assert!(!response.is_empty(), "Response should not be empty");
    eprintln!("Response: {}", response);
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_anthropic_advisor_returns_legal_cell() {
    dotenvy::dotenv().ok();

    let defaults = AdvisorConfig::default();
    let advisor = LlmAdvisor::new(
        LlmClient::new(config_for(LlmProvider::Anthropic, "claude-3-5-haiku-20241022")),
        PromptTemplate::from_config(&defaults),
        defaults.retry(),
    );

    let mut game = GameState::new();
    game.apply_move(0, Player::X).unwrap();
    game.apply_move(4, Player::O).unwrap();
    game.apply_move(1, Player::X).unwrap();
    let snapshot = game.snapshot();

    let reply = advisor
        .advise(&AdvisorRequest::from_snapshot(&snapshot))
        .await
        .expect("Advisor reply");
    eprintln!("Reply: {:?}", reply);
    assert!(snapshot.is_available(reply.index as usize));

    let mut policy = ExternalAdvisedPolicy::new(advisor, Box::new(HeuristicPolicy::new()));
    let decision = policy.choose_move(&snapshot).await;
    assert!(snapshot.is_available(decision.index));
}
