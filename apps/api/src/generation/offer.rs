//! Generation Client: a personalised first-touch message from a CV and a job description.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::generation::language::{detect_language, foreign_fragments, Language};
use crate::generation::prompts::PORTFOLIO_LINK;
use crate::llm_client::prompts::PromptTemplate;
use crate::llm_client::retry::{with_backoff, RetryPolicy};
use crate::llm_client::{ChatMessage, ChatProvider, ChatRequest, LlmError};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("LLM provider error: {0}")]
    Provider(#[from] LlmError),
}

/// CV as the caller has it: plain text, or structured JSON that is sent stringified.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CvInput {
    Text(String),
    Structured(serde_json::Value),
}

impl CvInput {
    pub fn render(&self) -> String {
        match self {
            CvInput::Text(text) => text.clone(),
            CvInput::Structured(value) => value.to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            CvInput::Text(text) => text.trim().is_empty(),
            CvInput::Structured(value) => value.is_null(),
        }
    }
}

/// One generated message and what we know about its language.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferDraft {
    pub message: String,
    pub language: Language,
    /// Template phrases of the other language found in `message`.
    pub foreign_fragments: Vec<&'static str>,
}

pub fn build_request(prompt: &PromptTemplate, cv: &str, job_description: &str) -> ChatRequest {
    ChatRequest {
        messages: vec![
            ChatMessage::system(&prompt.body),
            ChatMessage::user(format!("CV: {cv}\n\nJob Description: {job_description}")),
        ],
        response_format: None,
    }
}

/// Returns the model's text verbatim. No completion at all is "nothing to send",
/// an empty string rather than an error.
pub async fn generate_offer(
    provider: &dyn ChatProvider,
    prompt: &PromptTemplate,
    retry: RetryPolicy,
    cv: &str,
    job_description: &str,
) -> Result<String, GenerationError> {
    let request = build_request(prompt, cv, job_description);
    debug!(model = provider.model(), prompt = %prompt.label(), "requesting offer");

    let response = with_backoff(retry, || provider.chat(&request)).await?;
    Ok(response.first_content().unwrap_or_default().to_string())
}

/// `generate_offer` plus a language check of the result against the job description.
pub async fn draft_offer(
    provider: &dyn ChatProvider,
    prompt: &PromptTemplate,
    retry: RetryPolicy,
    cv: &CvInput,
    job_description: &str,
) -> Result<OfferDraft, GenerationError> {
    let language = detect_language(job_description);
    let message = generate_offer(provider, prompt, retry, &cv.render(), job_description).await?;

    let foreign = foreign_fragments(&message, language);
    if !foreign.is_empty() {
        warn!(?language, ?foreign, "offer mixes languages");
    }
    if message.is_empty() {
        info!("provider produced no offer text");
    } else if !message.contains(PORTFOLIO_LINK) {
        warn!("offer is missing the portfolio link");
    }

    Ok(OfferDraft {
        message,
        language,
        foreign_fragments: foreign,
    })
}
