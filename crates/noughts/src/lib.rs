//! Terminal front end for the noughts engine.
//!
//! Wires the core policies to configuration, an LLM advisor with
//! retries, an interactive play loop and policy-versus-policy matches.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod advisor;
pub mod cli;
pub mod config;
pub mod llm_client;
pub mod opponent;
pub mod play;
pub mod retry;
pub mod selfplay;
pub mod session;

pub use advisor::{LlmAdvisor, PromptTemplate};
pub use config::{AdvisorConfig, AppConfig, ConfigError, DEFAULT_CONFIG_FILE};
pub use llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider};
pub use opponent::{OpponentKind, build_policy};
pub use play::{Input, play, run_session};
pub use retry::RetryPolicy;
pub use selfplay::{SelfPlayStats, run_matches, selfplay};
pub use session::{Session, Tally};
