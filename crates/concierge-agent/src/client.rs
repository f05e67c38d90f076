//! Text-completion seam and its HTTP implementation.
//!
//! Agents talk to language models only through [`CompletionService`], so
//! tests can inject scripted fakes. [`ChatClient`] is the production
//! implementation for OpenAI-compatible chat completion endpoints
//! (OpenRouter, OpenAI, Anthropic).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::{ModelConfig, Provider};
use crate::error::{AgentError, Result};

/// A single system + user prompt completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub model: ModelConfig,
}

impl CompletionRequest {
    /// Create a request for the given model.
    pub fn new(
        model: &ModelConfig,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            model: model.clone(),
        }
    }
}

/// Opaque text-completion capability.
///
/// Implementations return the completion text, which may be empty when the
/// model produced no content. Transport and API failures are errors.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Run one completion.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Chat completions client for OpenAI-compatible endpoints.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl ChatClient {
    /// Create a client for the provider's default endpoint.
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: provider.endpoint().to_string(),
        }
    }

    /// Create a client reading the provider's API key from the environment.
    pub fn from_env(provider: Provider) -> Result<Self> {
        let var = provider.api_key_env();
        let api_key = std::env::var(var).map_err(|_| {
            AgentError::Configuration(format!("Missing {} environment variable", var))
        })?;
        Ok(Self::new(provider, api_key))
    }

    /// Override the endpoint URL (self-hosted gateways, proxies).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a chat completion request.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        trace!("Sending chat request: {:?}", request);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", "Concierge")
            .json(request)
            .send()
            .await
            .map_err(|e| AgentError::ModelInvocation(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AgentError::ModelInvocation(format!(
                "Chat API error {}: {}",
                status, text
            )));
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ResponseParse(format!("Failed to parse response: {}", e)))?;

        debug!(
            "Chat response received: {} tokens used",
            response.usage.as_ref().map_or(0, |u| u.total_tokens)
        );

        Ok(response)
    }
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl CompletionService for ChatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let chat = ChatRequest::from_completion(request);
        let response = self.chat(&chat).await?;
        Ok(response.content().unwrap_or_default().to_string())
    }
}

/// Chat completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,

    /// Conversation messages.
    pub messages: Vec<ChatMessage>,

    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Temperature for generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatRequest {
    /// Build the two-message chat body for a completion request.
    pub fn from_completion(request: &CompletionRequest) -> Self {
        Self {
            model: request.model.model.clone(),
            messages: vec![
                ChatMessage::system(&request.system_prompt),
                ChatMessage::user(&request.user_prompt),
            ],
            max_tokens: Some(request.model.max_tokens),
            temperature: Some(request.model.temperature),
        }
    }
}

/// A message in the chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: String,

    /// Text content of the message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
        }
    }
}

/// Chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Unique identifier for this completion.
    pub id: String,

    /// Completion choices.
    pub choices: Vec<ChatChoice>,

    /// Token usage information.
    pub usage: Option<ChatUsage>,
}

impl ChatResponse {
    /// Text of the first choice, if any.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

/// A choice in the completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    /// Index of this choice.
    pub index: u32,

    /// The message for this choice.
    pub message: ChatMessage,

    /// Finish reason (stop, length, etc.).
    pub finish_reason: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_completion() {
        let model = ModelConfig::classifier();
        let request = CompletionRequest::new(&model, "You classify.", "Find sushi");
        let chat = ChatRequest::from_completion(&request);

        assert_eq!(chat.model, "openai/gpt-4");
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].role, "system");
        assert_eq!(chat.messages[1].content.as_deref(), Some("Find sushi"));
        assert_eq!(chat.max_tokens, Some(500));

        let json = serde_json::to_string(&chat).unwrap();
        assert!(json.contains("\"temperature\":0.1"));
    }

    #[test]
    fn test_response_content() {
        let json = r#"{
            "id": "gen-123",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello! How can I help?"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;

        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.content(), Some("Hello! How can I help?"));
    }

    #[test]
    fn test_response_without_content() {
        let json = r#"{"id": "gen-1", "choices": [], "usage": null}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.content(), None);
    }

    #[test]
    fn test_client_endpoint_and_debug() {
        let client = ChatClient::new(Provider::OpenAI, "sk-secret")
            .with_endpoint("http://localhost:8080/v1/chat/completions");
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");

        let debug = format!("{:?}", client);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("sk-secret"));
    }
}
