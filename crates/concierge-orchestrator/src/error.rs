//! Error types for the orchestrator.

use thiserror::Error;

/// Failures inside the dispatch pipeline that no fallback absorbs.
///
/// These never leave [`RootAgent::process`](crate::RootAgent); they are
/// converted into an escalate response naming [`OrchestratorError::phase`].
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Inbound message failed validation.
    #[error("{0}")]
    Validation(concierge_agent::AgentError),

    /// The agent is shut down and refuses new turns.
    #[error("Admission failed: {0}")]
    Admission(String),
}

impl OrchestratorError {
    /// Pipeline phase the error was raised in.
    pub fn phase(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validate",
            Self::Admission(_) => "admission",
        }
    }
}

/// Result type for orchestrator operations.
pub type Result<T> = std::result::Result<T, OrchestratorError>;
