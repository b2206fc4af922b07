// ABOUTME: External completion endpoint used by the backlog chat assistant
// ABOUTME: Azure OpenAI chat-completions client behind the AnswerProvider trait

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use bulletin_config::constants;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

const SYSTEM_PROMPT: &str = "You are a product strategy assistant. Answer only from provided backlog context. If missing, say you do not have that data.";
const DEFAULT_MAX_TOKENS: u32 = 600;
const DEFAULT_TEMPERATURE: f32 = 0.2;
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum AIServiceError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Invalid response format")]
    InvalidResponse,

    #[error("question is required")]
    EmptyQuestion,
}

pub type AIServiceResult<T> = Result<T, AIServiceError>;

/// Something that can answer a backlog question from a text context
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Label reported alongside answers from this provider
    fn name(&self) -> &'static str;

    async fn answer(&self, question: &str, context: &str) -> AIServiceResult<String>;
}

/// Connection details for an Azure OpenAI deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureOpenAiConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
}

impl AzureOpenAiConfig {
    /// Read the endpoint settings from the environment.
    /// Returns `None` unless endpoint, key and deployment are all set.
    pub fn from_env() -> Option<Self> {
        let read = |name: &str| {
            env::var(name)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Some(Self {
            endpoint: read(constants::AZURE_OPENAI_ENDPOINT)?,
            api_key: read(constants::AZURE_OPENAI_API_KEY)?,
            deployment: read(constants::AZURE_OPENAI_DEPLOYMENT)?,
            api_version: read(constants::AZURE_OPENAI_API_VERSION)
                .unwrap_or_else(|| constants::DEFAULT_AZURE_API_VERSION.to_string()),
        })
    }

    pub fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    temperature: f32,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat-completions client for one Azure OpenAI deployment
pub struct AzureOpenAiService {
    client: Client,
    config: AzureOpenAiConfig,
}

impl AzureOpenAiService {
    pub fn new(config: AzureOpenAiConfig) -> AIServiceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        info!("Using Azure OpenAI deployment: {}", config.deployment);
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AzureOpenAiConfig {
        &self.config
    }
}

#[async_trait]
impl AnswerProvider for AzureOpenAiService {
    fn name(&self) -> &'static str {
        "azure"
    }

    async fn answer(&self, question: &str, context: &str) -> AIServiceResult<String> {
        let request = CompletionRequest {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: format!("Backlog context:\n{}\n\nQuestion: {}", context, question),
                },
            ],
        };

        debug!(
            "Making completion request: deployment={}, context_chars={}",
            self.config.deployment,
            context.len()
        );

        let response = self
            .client
            .post(self.config.completions_url())
            .header("api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!("Completion request timed out after {} seconds", REQUEST_TIMEOUT_SECS);
                    AIServiceError::ApiError("Request timed out".to_string())
                } else {
                    error!("Completion request failed: {}", e);
                    AIServiceError::RequestFailed(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Completion endpoint error: {} - {}", status, error_text);
            return Err(AIServiceError::ApiError(format!(
                "API returned {}: {}",
                status, error_text
            )));
        }

        let payload: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AIServiceError::ParseError(e.to_string()))?;

        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AIServiceError::InvalidResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(endpoint: &str) -> AzureOpenAiConfig {
        AzureOpenAiConfig {
            endpoint: endpoint.to_string(),
            api_key: "secret".to_string(),
            deployment: "roadmap".to_string(),
            api_version: "2024-10-21".to_string(),
        }
    }

    #[test]
    fn test_completions_url_trims_trailing_slash() {
        assert_eq!(
            config("https://example.openai.azure.com/").completions_url(),
            "https://example.openai.azure.com/openai/deployments/roadmap/chat/completions?api-version=2024-10-21"
        );
    }

    #[tokio::test]
    async fn test_answer_reads_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/deployments/roadmap/chat/completions"))
            .and(query_param("api-version", "2024-10-21"))
            .and(header("api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "SSO ships in Q2." } }]
            })))
            .mount(&server)
            .await;

        let service = AzureOpenAiService::new(config(&server.uri())).unwrap();
        let answer = service.answer("When is SSO?", "SSO | Q2, 2026").await.unwrap();

        assert_eq!(answer, "SSO ships in Q2.");
    }

    #[tokio::test]
    async fn test_error_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let service = AzureOpenAiService::new(config(&server.uri())).unwrap();
        let result = service.answer("anything", "").await;

        assert!(matches!(result, Err(AIServiceError::ApiError(_))));
    }

    #[tokio::test]
    async fn test_empty_choices_are_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let service = AzureOpenAiService::new(config(&server.uri())).unwrap();
        let result = service.answer("anything", "").await;

        assert!(matches!(result, Err(AIServiceError::InvalidResponse)));
    }
}
