//! Command-line interface definition using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use concierge_agent::Provider;

/// Concierge - intent-driven assistant that routes requests to specialists
#[derive(Parser, Debug)]
#[command(name = "concierge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to a YAML agent configuration
    #[arg(short, long, env = "CONCIERGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// LLM provider (openrouter, openai, anthropic)
    #[arg(long, env = "CONCIERGE_PROVIDER")]
    pub provider: Option<Provider>,

    /// Model used for direct replies
    #[arg(short, long, env = "CONCIERGE_MODEL")]
    pub model: Option<String>,

    /// Override the chat completions endpoint URL
    #[arg(long, env = "CONCIERGE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Per-call deadline in milliseconds
    #[arg(long, env = "CONCIERGE_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Send one request and print the response
    Ask {
        /// What you need help with
        #[arg(required = true)]
        text: String,

        /// User the request is made on behalf of
        #[arg(short, long, default_value = "cli-user")]
        user: String,

        /// Session identifier (generated if omitted)
        #[arg(short, long)]
        session: Option<String>,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a request without answering it
    Classify {
        /// Text to classify
        #[arg(required = true)]
        text: String,
    },

    /// List orchestrator capabilities and registered specialists
    Capabilities,

    /// Show orchestrator status and configuration
    Status,

    /// Start an interactive chat session
    Chat {
        /// User the session is held on behalf of
        #[arg(short, long, default_value = "cli-user")]
        user: String,
    },
}

impl Commands {
    /// Whether the command needs a reachable model.
    pub fn needs_model(&self) -> bool {
        !matches!(self, Self::Capabilities | Self::Status)
    }
}

impl Cli {
    /// Command to run; no command means interactive chat.
    pub fn effective_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Chat {
            user: "cli-user".to_string(),
        })
    }

    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
