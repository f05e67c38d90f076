//! Agent and model configuration types.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::agent::CapabilityKind;
use crate::error::Result;

/// LLM provider configuration.
///
/// Every provider is reached through its OpenAI-compatible chat
/// completions endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenRouter API (supports multiple models).
    #[default]
    OpenRouter,
    /// Anthropic API (Claude models).
    Anthropic,
    /// OpenAI API (GPT models).
    OpenAI,
}

impl Provider {
    /// Chat completions endpoint for this provider.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::OpenRouter => "https://openrouter.ai/api/v1/chat/completions",
            Self::Anthropic => "https://api.anthropic.com/v1/chat/completions",
            Self::OpenAI => "https://api.openai.com/v1/chat/completions",
        }
    }

    /// Default model id on this provider.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenRouter => "openai/gpt-4",
            Self::Anthropic => "claude-sonnet-4-20250514",
            Self::OpenAI => "gpt-4",
        }
    }

    /// Lightweight model id used for summaries on this provider.
    pub fn summary_model(&self) -> &'static str {
        match self {
            Self::OpenRouter => "openai/gpt-3.5-turbo",
            Self::Anthropic => "claude-3-5-haiku-20241022",
            Self::OpenAI => "gpt-3.5-turbo",
        }
    }

    /// Environment variable holding the API key for this provider.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenRouter => write!(f, "openrouter"),
            Self::Anthropic => write!(f, "anthropic"),
            Self::OpenAI => write!(f, "openai"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openrouter" => Ok(Self::OpenRouter),
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAI),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Model configuration for a single completion call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier (e.g., "openai/gpt-4", "anthropic/claude-sonnet-4").
    pub model: String,

    /// Maximum tokens to generate in responses.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for response generation (0.0 to 2.0).
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// LLM provider to use.
    #[serde(default)]
    pub provider: Provider,
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: Provider::default().default_model().into(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            provider: Provider::default(),
        }
    }
}

impl ModelConfig {
    /// Create a new model configuration with the given model ID.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Configuration used for intent classification.
    pub fn classifier() -> Self {
        Self::new(Provider::default().default_model())
            .with_temperature(0.1)
            .with_max_tokens(500)
    }

    /// Configuration used for conversation summaries.
    pub fn summarizer() -> Self {
        Self::new(Provider::default().summary_model())
            .with_temperature(0.3)
            .with_max_tokens(100)
    }

    /// Set the maximum tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    /// Set the provider.
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    /// Move this call site to `provider`.
    ///
    /// Model ids are provider-specific, so a provider change also replaces
    /// the model with `model`. Sampling settings are kept.
    pub fn retarget(self, provider: Provider, model: &str) -> Self {
        if self.provider == provider {
            return self;
        }
        Self {
            model: model.to_string(),
            ..self
        }
        .with_provider(provider)
    }
}

/// Static construction-time settings of an agent.
///
/// `max_concurrency`, `timeout_ms` and `retry_attempts` are enforced by the
/// orchestrator and by [`CallPolicy`](crate::policy::CallPolicy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Stable agent identifier.
    pub id: String,

    /// Human-readable name, also used as the persona name in prompts.
    pub name: String,

    /// Capability this agent serves.
    pub kind: CapabilityKind,

    /// Whether the agent starts active.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Maximum number of turns processed at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Deadline for a single completion call, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Extra attempts after a failed completion call.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Model used for this agent's own completions.
    #[serde(default)]
    pub llm: ModelConfig,

    /// Model used for intent classification.
    #[serde(default = "ModelConfig::classifier")]
    pub classifier_llm: ModelConfig,

    /// Model used for conversation summaries.
    #[serde(default = "ModelConfig::summarizer")]
    pub summarizer_llm: ModelConfig,
}

fn default_enabled() -> bool {
    true
}

fn default_max_concurrency() -> usize {
    100
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_retry_attempts() -> u32 {
    3
}

impl AgentConfig {
    /// Create a configuration with default limits and model.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: CapabilityKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            enabled: default_enabled(),
            max_concurrency: default_max_concurrency(),
            timeout_ms: default_timeout_ms(),
            retry_attempts: default_retry_attempts(),
            llm: ModelConfig::default(),
            classifier_llm: ModelConfig::classifier(),
            summarizer_llm: ModelConfig::summarizer(),
        }
    }

    /// Default configuration of the root orchestrator.
    pub fn root() -> Self {
        Self::new("concierge-root-001", "Concierge", CapabilityKind::Root)
    }

    /// Load a configuration from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    /// Per-call deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Set the concurrency ceiling (at least one).
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Set the per-call deadline.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the retry budget.
    pub fn with_retry_attempts(mut self, retry_attempts: u32) -> Self {
        self.retry_attempts = retry_attempts;
        self
    }

    /// Move every completion call site to `provider`.
    ///
    /// Call sites already on `provider` keep their model; the others switch
    /// to that provider's preset model.
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.llm = self.llm.retarget(provider, provider.default_model());
        self.classifier_llm = self.classifier_llm.retarget(provider, provider.default_model());
        self.summarizer_llm = self.summarizer_llm.retarget(provider, provider.summary_model());
        self
    }
}
