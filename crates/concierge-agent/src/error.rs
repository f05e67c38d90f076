//! Error types for the agent crate.

use thiserror::Error;

/// Errors that can occur in agent operations.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Model invocation failed.
    #[error("model invocation failed: {0}")]
    ModelInvocation(String),

    /// Model call did not finish before the configured deadline.
    #[error("model call timed out after {0} ms")]
    Timeout(u64),

    /// Response parsing failed.
    #[error("failed to parse response: {0}")]
    ResponseParse(String),

    /// Inbound message is missing a required field.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Delegated agent failed to process a message.
    #[error("agent {agent} failed: {message}")]
    Processing {
        /// Name of the agent that failed.
        agent: String,
        /// Error message.
        message: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration file could not be decoded.
    #[error("config decode error: {0}")]
    ConfigDecode(#[from] serde_yaml::Error),

    /// I/O error while reading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl AgentError {
    /// Create a processing error for the named agent.
    pub fn processing(agent: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Processing {
            agent: agent.into(),
            message: message.into(),
        }
    }

    /// Whether a retry of the same call could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ModelInvocation(_) | Self::Timeout(_))
    }
}

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;
