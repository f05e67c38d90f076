//! Concierge CLI entry point.

use std::sync::Arc;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use concierge_agent::ChatClient;
use concierge_orchestrator::RootAgent;

mod cli;
mod commands;
mod config;
mod error;

use cli::Cli;

fn main() {
    // Load .env.local if it exists (for OPENROUTER_API_KEY etc.)
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt().with_env_filter(filter).with_target(false).init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> error::Result<()> {
    let config = config::resolve(cli)?;
    let command = cli.effective_command();
    let provider = config.llm.provider;

    let client = match ChatClient::from_env(provider) {
        Ok(client) => client,
        Err(e) if !command.needs_model() => {
            warn!(error = %e, "No API key; model calls are unavailable");
            ChatClient::new(provider, String::new())
        }
        Err(e) => return Err(e.into()),
    };
    let client = match &cli.endpoint {
        Some(endpoint) => client.with_endpoint(endpoint.as_str()),
        None => client,
    };

    let root = RootAgent::new(config, Arc::new(client));
    commands::execute(command, &root)
}
