//! Policy that consults an external move advisor.
//!
//! The advisor is untrusted. Its answer is used only if it arrives
//! before the deadline, parses against [`AdvisorReply`], and names an
//! available cell. Every other outcome is handed to the fallback
//! policy, so callers always receive a legal decision.

use super::{DecisionSource, MoveDecision, MovePolicy};
use crate::state::Snapshot;
use crate::types::Player;
use derive_more::{Display, Error};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Default upper bound on one advisor consultation, retries included.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// What the advisor is told about the position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AdvisorRequest {
    /// Nine cells in row-major order; `null` is empty.
    pub board: Vec<Option<Player>>,
    /// The mark the advisor is choosing for.
    pub mark: Player,
    /// Legal cell indices.
    pub legal: Vec<usize>,
}

impl AdvisorRequest {
    /// Builds the request for the player to move in `snapshot`.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            board: snapshot.board().squares().iter().map(|s| s.player()).collect(),
            mark: snapshot.to_move(),
            legal: snapshot.available().to_vec(),
        }
    }

    /// Board as three rows of `X`, `O` and cell numbers.
    pub fn board_text(&self) -> String {
        self.board
            .chunks(3)
            .enumerate()
            .map(|(row, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .map(|(col, cell)| match cell {
                        Some(player) => player.to_string(),
                        None => (row * 3 + col).to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The advisor's answer, after schema validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AdvisorReply {
    /// Chosen cell index (0-8).
    pub index: i64,
    /// Optional short explanation.
    #[serde(default)]
    pub rationale: Option<String>,
}

impl AdvisorReply {
    /// Extracts and validates a reply from free-form advisor text.
    ///
    /// Accepts a bare JSON object or one wrapped in prose or a code
    /// fence. Text without a JSON object, or with invalid JSON, is
    /// `Malformed`; valid JSON of the wrong shape is `Schema`.
    #[instrument(skip(text), fields(len = text.len()))]
    pub fn parse(text: &str) -> Result<Self, AdvisorError> {
        let (start, end) = match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) if start < end => (start, end),
            _ => {
                return Err(AdvisorError::new(
                    AdvisorErrorKind::Malformed,
                    format!("No JSON object in advisor response: {:?}", text),
                ));
            }
        };
        let json = &text[start..=end];

        let value: serde_json::Value = serde_json::from_str(json).map_err(|e| {
            AdvisorError::new(AdvisorErrorKind::Malformed, format!("Invalid JSON: {}", e))
        })?;
        let reply: Self = serde_json::from_value(value).map_err(|e| {
            AdvisorError::new(AdvisorErrorKind::Schema, format!("Reply does not match schema: {}", e))
        })?;

        debug!(index = reply.index, "Parsed advisor reply");
        Ok(reply)
    }

    /// JSON schema of the reply, pretty-printed, for advisor prompts.
    pub fn json_schema() -> String {
        let schema = schemars::schema_for!(AdvisorReply);
        serde_json::to_string_pretty(&schema).unwrap_or_default()
    }
}

/// Category of advisor failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum AdvisorErrorKind {
    /// Network, HTTP or provider error.
    Transport,
    /// No answer within the allotted time.
    Timeout,
    /// Response was not parseable.
    Malformed,
    /// Response parsed but did not match the reply schema.
    Schema,
}

/// Advisor failure. Never escapes [`ExternalAdvisedPolicy`].
#[derive(Debug, Clone, Display, Error)]
#[display("Advisor error ({}): {} at {}:{}", kind, message, file, line)]
pub struct AdvisorError {
    /// Failure category.
    pub kind: AdvisorErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl AdvisorError {
    /// Creates a new advisor error.
    #[track_caller]
    pub fn new(kind: AdvisorErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        debug!(%kind, error_message = %message, "Advisor error created");
        Self {
            kind,
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// External collaborator that proposes moves.
#[async_trait::async_trait]
pub trait MoveAdvisor: Send + Sync {
    /// Proposes a move for `request.mark`.
    async fn advise(&self, request: &AdvisorRequest) -> Result<AdvisorReply, AdvisorError>;

    /// Name used in logs.
    fn name(&self) -> &str;
}

/// Advisor-backed policy with a fallback.
pub struct ExternalAdvisedPolicy<A> {
    name: String,
    advisor: A,
    fallback: Box<dyn MovePolicy>,
    deadline: Duration,
}

impl<A: MoveAdvisor> ExternalAdvisedPolicy<A> {
    /// Wraps `advisor`, deferring to `fallback` whenever it fails.
    pub fn new(advisor: A, fallback: Box<dyn MovePolicy>) -> Self {
        let name = format!("{} (fallback: {})", advisor.name(), fallback.name());
        info!(policy = %name, "Creating advised policy");
        Self {
            name,
            advisor,
            fallback,
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Overrides the overall deadline for one consultation.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// The wrapped advisor.
    pub fn advisor(&self) -> &A {
        &self.advisor
    }

    async fn consult(&self, snapshot: &Snapshot) -> Result<MoveDecision, AdvisorError> {
        let request = AdvisorRequest::from_snapshot(snapshot);
        let reply = tokio::time::timeout(self.deadline, self.advisor.advise(&request))
            .await
            .map_err(|_| {
                AdvisorError::new(
                    AdvisorErrorKind::Timeout,
                    format!("No advice within {:?}", self.deadline),
                )
            })??;

        let index = usize::try_from(reply.index)
            .ok()
            .filter(|&i| snapshot.is_available(i))
            .ok_or_else(|| {
                AdvisorError::new(
                    AdvisorErrorKind::Schema,
                    format!("Advisor chose illegal cell {} (legal: {:?})", reply.index, request.legal),
                )
            })?;

        let mut decision = MoveDecision::new(index, DecisionSource::Advisor);
        decision.rationale = reply.rationale;
        Ok(decision)
    }
}

#[async_trait::async_trait]
impl<A: MoveAdvisor> MovePolicy for ExternalAdvisedPolicy<A> {
    #[instrument(skip(self, snapshot), fields(policy = %self.name, to_move = %snapshot.to_move()))]
    async fn choose_move(&mut self, snapshot: &Snapshot) -> MoveDecision {
        match self.consult(snapshot).await {
            Ok(decision) => {
                info!(index = decision.index, "Advisor move accepted");
                decision
            }
            Err(e) => {
                warn!(error = %e, fallback = %self.fallback.name(), "Advisor failed, using fallback");
                let mut decision = self.fallback.choose_move(snapshot).await;
                decision.source = DecisionSource::Fallback;
                decision
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_object() {
        let reply = AdvisorReply::parse(r#"{"index": 4, "rationale": "center"}"#).unwrap();
        assert_eq!(reply.index, 4);
        assert_eq!(reply.rationale.as_deref(), Some("center"));
    }

    #[test]
    fn test_parse_fenced_object() {
        let text = "Sure!\n```json\n{\"index\": 2}\n```\nGood luck.";
        let reply = AdvisorReply::parse(text).unwrap();
        assert_eq!(reply.index, 2);
        assert_eq!(reply.rationale, None);
    }

    #[test]
    fn test_parse_no_json_is_malformed() {
        let err = AdvisorReply::parse("I'd play the center").unwrap_err();
        assert_eq!(err.kind, AdvisorErrorKind::Malformed);
    }

    #[test]
    fn test_parse_broken_json_is_malformed() {
        let err = AdvisorReply::parse("{index: four}").unwrap_err();
        assert_eq!(err.kind, AdvisorErrorKind::Malformed);
    }

    #[test]
    fn test_parse_wrong_shape_is_schema() {
        let err = AdvisorReply::parse(r#"{"move": 4}"#).unwrap_err();
        assert_eq!(err.kind, AdvisorErrorKind::Schema);
        let err = AdvisorReply::parse(r#"{"index": "4"}"#).unwrap_err();
        assert_eq!(err.kind, AdvisorErrorKind::Schema);
    }

    #[test]
    fn test_schema_mentions_fields() {
        let schema = AdvisorReply::json_schema();
        assert!(schema.contains("index"));
        assert!(schema.contains("rationale"));
    }

    #[test]
    fn test_request_board_text() {
        let mut state = crate::state::GameState::new();
        state.apply_move(4, Player::X).unwrap();
        let request = AdvisorRequest::from_snapshot(&state.snapshot());
        assert_eq!(request.mark, Player::O);
        assert_eq!(request.legal, vec![0, 1, 2, 3, 5, 6, 7, 8]);
        assert_eq!(request.board_text(), "0 | 1 | 2\n3 | X | 5\n6 | 7 | 8");
    }
}
