//! LLM-backed move advisor.

use crate::config::AdvisorConfig;
use crate::llm_client::LlmClient;
use crate::retry::RetryPolicy;
use noughts_core::{AdvisorError, AdvisorErrorKind, AdvisorReply, AdvisorRequest, MoveAdvisor};
use tracing::{debug, instrument};

/// Prompt text sent to the model.
///
/// The user template may contain `{board}`, `{mark}`, `{legal}` and
/// `{schema}`; each is replaced on render.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters, derive_new::new)]
pub struct PromptTemplate {
    system: String,
    user: String,
}

impl PromptTemplate {
    /// Takes the prompts from the advisor configuration.
    pub fn from_config(config: &AdvisorConfig) -> Self {
        Self::new(config.system_prompt().clone(), config.user_template().clone())
    }

    /// Fills the user template for `request`.
    pub fn render(&self, request: &AdvisorRequest) -> String {
        let legal = request
            .legal
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        self.user
            .replace("{board}", &request.board_text())
            .replace("{mark}", &request.mark.to_string())
            .replace("{legal}", &legal)
            .replace("{schema}", &AdvisorReply::json_schema())
    }
}

/// Asks an LLM for a move, retrying failed or unusable answers.
#[derive(Debug, Clone)]
pub struct LlmAdvisor {
    name: String,
    client: LlmClient,
    prompt: PromptTemplate,
    retry: RetryPolicy,
}

impl LlmAdvisor {
    /// Creates an advisor around `client`.
    pub fn new(client: LlmClient, prompt: PromptTemplate, retry: RetryPolicy) -> Self {
        let name = format!("LLM ({})", client.config().model());
        Self {
            name,
            client,
            prompt,
            retry,
        }
    }

    /// Retry settings in use.
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }
}

#[async_trait::async_trait]
impl MoveAdvisor for LlmAdvisor {
    #[instrument(skip(self, request), fields(advisor = %self.name, mark = %request.mark))]
    async fn advise(&self, request: &AdvisorRequest) -> Result<AdvisorReply, AdvisorError> {
        let system = self.prompt.system().as_str();
        let user = self.prompt.render(request);
        let client = &self.client;

        self.retry
            .run(|attempt| {
                let user = &user;
                async move {
                    debug!(attempt, "Consulting LLM");
                    let text = client
                        .generate(system, user)
                        .await
                        .map_err(|e| AdvisorError::new(AdvisorErrorKind::Transport, e.message))?;
                    let reply = AdvisorReply::parse(&text)?;
                    // An illegal cell is worth another attempt; the model may do better.
                    let legal = usize::try_from(reply.index)
                        .map(|i| request.legal.contains(&i))
                        .unwrap_or(false);
                    if !legal {
                        return Err(AdvisorError::new(
                            AdvisorErrorKind::Schema,
                            format!("Cell {} is not legal (legal: {:?})", reply.index, request.legal),
                        ));
                    }
                    Ok(reply)
                }
            })
            .await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
