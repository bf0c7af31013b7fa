//! Application configuration loaded from TOML.

use crate::llm_client::{LlmConfig, LlmProvider};
use crate::opponent::OpponentKind;
use crate::retry::RetryPolicy;
use derive_getters::Getters;
use derive_more::{Display, Error};
use noughts_core::Player;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Default config file looked up when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "noughts.toml";

const DEFAULT_SYSTEM_PROMPT: &str = "You are playing tic-tac-toe. Cells are numbered 0-8 in \
row-major order. Reply with a single JSON object matching the schema you are given, and nothing else.";

const DEFAULT_USER_TEMPLATE: &str = "Board:\n{board}\n\nYou play {mark}. Legal cells: {legal}.\n\n\
Answer with JSON matching this schema:\n{schema}";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Computer opponent for `play`.
    opponent: OpponentKind,

    /// Mark the human plays.
    human: Player,

    /// RNG seed; entropy when absent.
    seed: Option<u64>,

    /// Whether the heuristic evaluates fork tiers.
    forks: bool,

    /// LLM advisor settings.
    advisor: AdvisorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            opponent: OpponentKind::Heuristic,
            human: Player::X,
            seed: None,
            forks: true,
            advisor: AdvisorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(opponent = %config.opponent, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.advisor.validate()?;
        Ok(config)
    }

    /// Loads `path` if given, else [`DEFAULT_CONFIG_FILE`] if it exists,
    /// else the defaults.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Returns a copy with command-line overrides applied.
    pub fn with_overrides(
        mut self,
        opponent: Option<OpponentKind>,
        human: Option<Player>,
        seed: Option<u64>,
    ) -> Self {
        if let Some(opponent) = opponent {
            self.opponent = opponent;
        }
        if let Some(human) = human {
            self.human = human;
        }
        if seed.is_some() {
            self.seed = seed;
        }
        self
    }
}

/// Settings for the LLM-backed advisor.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// LLM provider (openai or anthropic).
    provider: LlmProvider,

    /// Model name.
    model: String,

    /// Maximum tokens per completion.
    max_tokens: u32,

    /// Policy used when the advisor fails.
    fallback: OpponentKind,

    /// Overall deadline for one move, retries included.
    deadline_ms: u64,

    /// Attempts per move.
    max_attempts: u32,

    /// First retry delay.
    backoff_ms: u64,

    /// Retry delay cap.
    max_backoff_ms: u64,

    /// Timeout for a single attempt.
    attempt_timeout_ms: u64,

    /// System prompt.
    system_prompt: String,

    /// User message with `{board}`, `{mark}`, `{legal}` and `{schema}` placeholders.
    user_template: String,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            model: "gpt-4o-mini".to_string(),
            max_tokens: 150,
            fallback: OpponentKind::Heuristic,
            deadline_ms: 30_000,
            max_attempts: 3,
            backoff_ms: 500,
            max_backoff_ms: 4_000,
            attempt_timeout_ms: 15_000,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            user_template: DEFAULT_USER_TEMPLATE.to_string(),
        }
    }
}

impl AdvisorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.fallback == OpponentKind::Advised {
            return Err(ConfigError::new(
                "advisor.fallback must be random or heuristic".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::new("advisor.max_attempts must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Overall deadline for one move.
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    /// Retry settings for advisor calls.
    pub fn retry(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.backoff_ms),
            Duration::from_millis(self.max_backoff_ms),
            Duration::from_millis(self.attempt_timeout_ms),
        )
    }

    /// Creates the LLM configuration, reading the provider's API key
    /// from the environment.
    #[instrument(skip(self), fields(provider = %self.provider, model = %self.model))]
    pub fn llm_config(&self) -> Result<LlmConfig, ConfigError> {
        let var = self.provider.api_key_var();
        let api_key = std::env::var(var)
            .map_err(|_| ConfigError::new(format!("{} environment variable not set", var)))?;
        debug!("Creating LLM config");
        Ok(LlmConfig::new(
            self.provider,
            api_key,
            self.model.clone(),
            self.max_tokens,
        ))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
