// ABOUTME: Backlog chat assistant
// ABOUTME: Local keyword answerer plus an optional Azure OpenAI completion provider

pub mod assistant;
pub mod local;
pub mod service;

pub use assistant::{build_context, ChatAnswer, ChatAssistant};
pub use local::local_answer;
pub use service::{
    AIServiceError, AIServiceResult, AnswerProvider, AzureOpenAiConfig, AzureOpenAiService,
};
