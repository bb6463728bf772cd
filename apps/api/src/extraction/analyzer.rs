//! Extraction Client: raw message text in, validated vacancy fields out.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::extraction::prompts::SCHEMA_NAME;
use crate::extraction::schema::{check_conformance, vacancy_schema, VACANCY_FIELDS};
use crate::llm_client::prompts::PromptTemplate;
use crate::llm_client::retry::{with_backoff, RetryPolicy};
use crate::llm_client::{ChatMessage, ChatProvider, ChatRequest, LlmError, ResponseFormat};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("LLM provider error: {0}")]
    Provider(#[from] LlmError),

    /// The payload did not match the output contract. `raw` is kept for logs.
    #[error("LLM response violates the vacancy schema: {}", .reasons.join("; "))]
    SchemaViolation { raw: String, reasons: Vec<String> },

    #[error("LLM returned no completion")]
    EmptyResponse,

    #[error("LLM classified the message as a vacancy but returned no title")]
    MissingTitle { raw: String },
}

impl ExtractionError {
    /// Verbatim model output, when there was one.
    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            ExtractionError::SchemaViolation { raw, .. } | ExtractionError::MissingTitle { raw } => {
                Some(raw.as_str())
            }
            _ => None,
        }
    }
}

/// Structured fields the model extracts from one message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExtractedVacancy {
    pub is_vacancy: bool,
    pub title: String,
    pub company: String,
    pub salary_min: i64,
    pub salary_max: i64,
    pub currency: String,
    pub skills: Vec<String>,
    pub is_remote: bool,
    pub grade: String,
    pub location: String,
    pub description: String,
}

impl ExtractedVacancy {
    /// Business rules the schema cannot express.
    pub fn check_invariants(&self) -> Result<(), &'static str> {
        if self.is_vacancy && self.title.trim().is_empty() {
            return Err("vacancy without a title");
        }
        Ok(())
    }

    /// Non-vacancies keep only their classification; everything the model may
    /// have filled in anyway is reset to defaults.
    pub fn normalized(self) -> Self {
        if self.is_vacancy {
            self
        } else {
            Self::default()
        }
    }
}

/// A successful extraction plus the payload it was decoded from.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub fields: ExtractedVacancy,
    pub raw: String,
}

impl Extraction {
    /// The raw payload as JSON, for the record's `raw` column.
    pub fn raw_json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.raw).ok()
    }
}

pub fn build_request(prompt: &PromptTemplate, text: &str) -> ChatRequest {
    ChatRequest {
        messages: vec![ChatMessage::system(&prompt.body), ChatMessage::user(text)],
        response_format: Some(ResponseFormat::strict_schema(
            SCHEMA_NAME,
            vacancy_schema().clone(),
        )),
    }
}

/// Decodes a model payload against the vacancy contract. Never coerces: any
/// departure from the schema is a `SchemaViolation`.
pub fn decode(raw: &str) -> Result<ExtractedVacancy, ExtractionError> {
    let violation = |reasons: Vec<String>| ExtractionError::SchemaViolation {
        raw: raw.to_string(),
        reasons,
    };

    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| violation(vec![format!("invalid JSON: {e}")]))?;

    let problems = check_conformance(VACANCY_FIELDS, &value);
    if !problems.is_empty() {
        return Err(violation(problems));
    }

    serde_json::from_value(value).map_err(|e| violation(vec![e.to_string()]))
}

/// Classifies `text` and extracts vacancy fields from it.
pub async fn analyze_vacancy(
    provider: &dyn ChatProvider,
    prompt: &PromptTemplate,
    retry: RetryPolicy,
    text: &str,
) -> Result<Extraction, ExtractionError> {
    let request = build_request(prompt, text);
    debug!(
        model = provider.model(),
        prompt = %prompt.label(),
        chars = text.chars().count(),
        "requesting vacancy extraction"
    );

    let response = with_backoff(retry, || provider.chat(&request)).await?;
    let raw = response
        .first_content()
        .ok_or(ExtractionError::EmptyResponse)?
        .to_string();

    let fields = match decode(&raw) {
        Ok(fields) => fields,
        Err(e) => {
            warn!(error = %e, raw = %raw, "discarding non-conforming extraction");
            return Err(e);
        }
    };

    if fields.check_invariants().is_err() {
        warn!(raw = %raw, "vacancy returned without a title");
        return Err(ExtractionError::MissingTitle { raw });
    }

    Ok(Extraction {
        fields: fields.normalized(),
        raw,
    })
}
