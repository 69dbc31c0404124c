//! Abstractions for generating document summaries via a hosted LLM API.
//!
//! The production adapter issues chat-completion requests directly to the OpenAI
//! REST API. The base URL is overridable so tests (and proxy deployments) can point
//! the client elsewhere.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::config::get_config;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Summary granularity requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryType {
    /// Two or three sentences; the summaries endpoint default.
    #[default]
    Short,
    /// One balanced paragraph; used by the workflow pipeline.
    General,
    /// Multi-paragraph coverage of the main points.
    Detailed,
}

impl SummaryType {
    /// Instruction prefix handed to the model for this granularity.
    fn instruction(self) -> &'static str {
        match self {
            Self::Short => "Summarize the document in two to three sentences.",
            Self::General => {
                "Summarize the document in one concise paragraph covering its main points."
            }
            Self::Detailed => {
                "Write a detailed summary of the document, covering every major section."
            }
        }
    }

    /// Wire name of this summary type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::General => "general",
            Self::Detailed => "detailed",
        }
    }
}

impl std::str::FromStr for SummaryType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "general" => Ok(Self::General),
            "detailed" => Ok(Self::Detailed),
            _ => Err(()),
        }
    }
}

/// Errors surfaced while requesting a summary.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// The summarization API was unreachable.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// The provider returned an error response.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// The provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by summarization providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Generate a summary of `text` at the requested granularity.
    async fn summarize(
        &self,
        text: &str,
        summary_type: SummaryType,
    ) -> Result<String, SummarizationClientError>;
}

/// Build a summarization client when a credential is configured.
///
/// Returns `None` when `OPENAI_API_KEY` is absent; callers surface that as a
/// configuration error rather than attempting a request that cannot succeed.
pub fn get_summarization_client() -> Option<Box<dyn SummarizationClient + Send + Sync>> {
    let config = get_config();
    let api_key = config.openai_api_key.clone()?;
    let base_url = config
        .openai_base_url
        .clone()
        .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
    Some(Box::new(OpenAiSummarizationClient::new(
        api_key,
        base_url,
        config.openai_model.clone(),
    )))
}

/// Summarization adapter for the OpenAI chat-completions API.
pub struct OpenAiSummarizationClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiSummarizationClient {
    /// Create a client with an explicit credential, base URL, and model.
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        let http = Client::builder()
            .user_agent("docflow/summaries")
            .build()
            .expect("Failed to construct reqwest::Client for summarization");
        Self {
            http,
            api_key,
            base_url,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl SummarizationClient for OpenAiSummarizationClient {
    async fn summarize(
        &self,
        text: &str,
        summary_type: SummaryType,
    ) -> Result<String, SummarizationClientError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": summary_type.instruction() },
                { "role": "user", "content": text }
            ],
            "temperature": 0.2,
        });

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to reach summarization API at {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationClientError::GenerationFailed(format!(
                "summarization API returned {status}: {body}"
            )));
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode completion response: {error}"
            ))
        })?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                SummarizationClientError::InvalidResponse(
                    "completion response contained no choices".into(),
                )
            })?;

        Ok(content.trim().to_string())
    }
}
