// ABOUTME: Backlog chat assistant
// ABOUTME: Tries the external provider first and falls back to the local answerer

use std::sync::Arc;

use bulletin_core::InitiativeRecord;
use serde::Serialize;
use tracing::{info, warn};

use crate::local::local_answer;
use crate::service::{AIServiceError, AIServiceResult, AnswerProvider, AzureOpenAiConfig, AzureOpenAiService};

/// Initiatives included in the provider context
const CONTEXT_LIMIT: usize = 200;

const LOCAL_MODE: &str = "local";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatAnswer {
    pub answer: String,
    pub mode: &'static str,
}

/// One line per initiative: `title | quarter | status | lead:… | notes:…`
pub fn build_context(initiatives: &[InitiativeRecord]) -> String {
    initiatives
        .iter()
        .take(CONTEXT_LIMIT)
        .map(|item| {
            format!(
                "{} | {} | {} | lead:{} | notes:{}",
                item.title,
                item.quarter,
                item.status.as_str(),
                item.lead,
                item.notes.join("; ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Clone, Default)]
pub struct ChatAssistant {
    provider: Option<Arc<dyn AnswerProvider>>,
}

impl ChatAssistant {
    /// Assistant that only answers locally
    pub fn local() -> Self {
        Self { provider: None }
    }

    pub fn with_provider(provider: Arc<dyn AnswerProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// Use Azure OpenAI when its settings are present in the environment
    pub fn from_env() -> Self {
        let Some(config) = AzureOpenAiConfig::from_env() else {
            info!("No completion endpoint configured - chat answers locally");
            return Self::local();
        };

        match AzureOpenAiService::new(config) {
            Ok(service) => Self::with_provider(Arc::new(service)),
            Err(e) => {
                warn!("Failed to build completion client, answering locally: {}", e);
                Self::local()
            }
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider
            .as_ref()
            .map(|provider| provider.name())
            .unwrap_or(LOCAL_MODE)
    }

    /// Answer a question about the given initiatives
    pub async fn ask(
        &self,
        question: &str,
        initiatives: &[InitiativeRecord],
    ) -> AIServiceResult<ChatAnswer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AIServiceError::EmptyQuestion);
        }

        if let Some(provider) = &self.provider {
            let context = build_context(initiatives);
            match provider.answer(question, &context).await {
                Ok(answer) => {
                    return Ok(ChatAnswer {
                        answer,
                        mode: provider.name(),
                    })
                }
                Err(e) => warn!("{} provider unavailable, answering locally: {}", provider.name(), e),
            }
        }

        Ok(ChatAnswer {
            answer: local_answer(question, initiatives),
            mode: LOCAL_MODE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bulletin_core::InitiativeStatus;
    use pretty_assertions::assert_eq;

    struct Echo;

    #[async_trait]
    impl AnswerProvider for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn answer(&self, question: &str, context: &str) -> AIServiceResult<String> {
            Ok(format!("{} / {}", question, context))
        }
    }

    struct Down;

    #[async_trait]
    impl AnswerProvider for Down {
        fn name(&self) -> &'static str {
            "down"
        }

        async fn answer(&self, _question: &str, _context: &str) -> AIServiceResult<String> {
            Err(AIServiceError::InvalidResponse)
        }
    }

    fn sso() -> InitiativeRecord {
        InitiativeRecord {
            title: "SSO".to_string(),
            quarter: "Q2, 2026".to_string(),
            status: InitiativeStatus::OnTrack,
            lead: "Ada".to_string(),
            notes: vec!["Okta first".to_string(), "Then Azure AD".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_build_context_line_format() {
        assert_eq!(
            build_context(&[sso()]),
            "SSO | Q2, 2026 | on_track | lead:Ada | notes:Okta first; Then Azure AD"
        );
    }

    #[test]
    fn test_build_context_is_limited() {
        let many = vec![sso(); CONTEXT_LIMIT + 5];
        assert_eq!(build_context(&many).lines().count(), CONTEXT_LIMIT);
    }

    #[tokio::test]
    async fn test_provider_answer_wins() {
        let assistant = ChatAssistant::with_provider(Arc::new(Echo));
        let answer = assistant.ask("  status?  ", &[sso()]).await.unwrap();

        assert_eq!(answer.mode, "echo");
        assert!(answer.answer.starts_with("status? / SSO | Q2, 2026"));
    }

    #[tokio::test]
    async fn test_falls_back_to_local_when_provider_fails() {
        let assistant = ChatAssistant::with_provider(Arc::new(Down));
        let answer = assistant.ask("q2 2026", &[sso()]).await.unwrap();

        assert_eq!(answer.mode, "local");
        assert!(answer.answer.starts_with("Found 1 initiatives for Q2, 2026"));
    }

    #[tokio::test]
    async fn test_empty_question_is_rejected() {
        let result = ChatAssistant::local().ask("   ", &[]).await;
        assert!(matches!(result, Err(AIServiceError::EmptyQuestion)));
    }
}
