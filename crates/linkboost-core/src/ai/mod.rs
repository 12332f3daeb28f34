pub mod claude;
pub mod gemini;
pub mod ollama;
pub mod openai;

pub use claude::ClaudeClient;
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use openai::OpenAIClient;

use std::time::Duration;

use crate::error::AiError;
use crate::provider::Provider;

/// Upper bound on a single completion request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Model listing runs on the UI loop, so it gives up quickly.
pub const LIST_MODELS_TIMEOUT: Duration = Duration::from_secs(5);

/// One configured model backend.
#[derive(Clone)]
pub enum LlmClient {
    Ollama(OllamaClient),
    Claude(ClaudeClient),
    OpenAI(OpenAIClient),
    Gemini(GeminiClient),
}

impl LlmClient {
    pub fn provider(&self) -> Provider {
        match self {
            LlmClient::Ollama(_) => Provider::Ollama,
            LlmClient::Claude(_) => Provider::Claude,
            LlmClient::OpenAI(_) => Provider::OpenAI,
            LlmClient::Gemini(_) => Provider::Gemini,
        }
    }

    pub async fn query(&self, model: &str, prompt: &str, json: bool) -> Result<String, AiError> {
        match self {
            LlmClient::Ollama(client) => client.query(model, prompt, json).await,
            LlmClient::Claude(client) => client.query(model, prompt, json).await,
            LlmClient::OpenAI(client) => client.query(model, prompt, json).await,
            LlmClient::Gemini(client) => client.query(model, prompt, json).await,
        }
    }

    /// Ollama lists installed models; hosted providers use a fixed list.
    pub async fn list_models(&self) -> Result<Vec<String>, AiError> {
        match self {
            LlmClient::Ollama(client) => client.list_models().await,
            LlmClient::Claude(_) => Ok(ClaudeClient::list_models()),
            LlmClient::OpenAI(_) => Ok(OpenAIClient::list_models()),
            LlmClient::Gemini(_) => Ok(GeminiClient::list_models()),
        }
    }
}
