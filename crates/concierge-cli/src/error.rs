//! Errors surfaced by the command-line front end.

use thiserror::Error;

/// CLI command failures.
#[derive(Debug, Error)]
pub enum CliError {
    /// Agent setup or model access failed.
    #[error(transparent)]
    Agent(#[from] concierge_agent::AgentError),

    /// Terminal or runtime I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Interactive line editor failed.
    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    /// JSON output could not be rendered.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML output could not be rendered.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;
