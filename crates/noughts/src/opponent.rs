//! Builds move policies from configuration.

use crate::advisor::{LlmAdvisor, PromptTemplate};
use crate::config::{AppConfig, ConfigError};
use crate::llm_client::LlmClient;
use noughts_core::{ExternalAdvisedPolicy, HeuristicPolicy, MovePolicy, RandomPolicy};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Kind of computer player.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OpponentKind {
    /// Uniform random among legal cells.
    Random,
    /// Priority-ordered heuristic.
    Heuristic,
    /// LLM advisor with fallback.
    Advised,
}

/// Creates the policy for `kind`.
///
/// `seed` feeds the random policy, including a random fallback. The
/// advised kind needs the provider's API key in the environment.
#[instrument(skip(config))]
pub fn build_policy(
    kind: OpponentKind,
    config: &AppConfig,
    seed: Option<u64>,
) -> Result<Box<dyn MovePolicy>, ConfigError> {
    let policy: Box<dyn MovePolicy> = match kind {
        OpponentKind::Random => Box::new(match seed {
            Some(seed) => RandomPolicy::seeded(seed),
            None => RandomPolicy::from_entropy(),
        }),
        OpponentKind::Heuristic if *config.forks() => Box::new(HeuristicPolicy::new()),
        OpponentKind::Heuristic => Box::new(HeuristicPolicy::basic()),
        OpponentKind::Advised => {
            let advisor_config = config.advisor();
            if *advisor_config.fallback() == OpponentKind::Advised {
                return Err(ConfigError::new(
                    "advisor.fallback must be random or heuristic".to_string(),
                ));
            }
            let fallback = build_policy(*advisor_config.fallback(), config, seed)?;
            let advisor = LlmAdvisor::new(
                LlmClient::new(advisor_config.llm_config()?),
                PromptTemplate::from_config(advisor_config),
                advisor_config.retry(),
            );
            Box::new(ExternalAdvisedPolicy::new(advisor, fallback).with_deadline(advisor_config.deadline()))
        }
    };
    info!(policy = %policy.name(), "Built policy");
    Ok(policy)
}
