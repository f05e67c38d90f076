//! Resolves the root agent configuration from file and flags.

use tracing::{debug, info};

use concierge_agent::AgentConfig;

use crate::cli::Cli;
use crate::error::Result;

/// Load the configured root agent settings.
///
/// Starts from the YAML file named by `--config` (or the built-in root
/// defaults), then applies flag and environment overrides. `--provider`
/// moves every call site onto that provider; `--model` then sets the
/// reply model only.
pub fn resolve(cli: &Cli) -> Result<AgentConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            info!(path = %path.display(), "Loading agent config");
            AgentConfig::from_yaml_file(path)?
        }
        None => AgentConfig::root(),
    };

    if let Some(provider) = cli.provider {
        config = config.with_provider(provider);
    }
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms);
    }

    debug!(
        id = %config.id,
        provider = %config.llm.provider,
        model = %config.llm.model,
        classifier_model = %config.classifier_llm.model,
        summarizer_model = %config.summarizer_llm.model,
        "Resolved agent config"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use concierge_agent::{Agent, CapabilityKind, ChatClient, Provider};
    use concierge_orchestrator::RootAgent;
    use std::sync::Arc;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_without_file() {
        let cli = Cli::parse_from(["concierge", "status"]);
        let config = resolve(&cli).unwrap();
        assert_eq!(config, AgentConfig::root());
    }

    #[test]
    fn test_file_then_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "id: front-desk\nname: Front Desk\nkind: root\nmax_concurrency: 8\nllm:\n  model: openai/gpt-4o\n  temperature: 0.2"
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::parse_from([
            "concierge",
            "--config",
            path.as_str(),
            "--provider",
            "anthropic",
            "--timeout-ms",
            "1500",
            "status",
        ]);
        let config = resolve(&cli).unwrap();

        assert_eq!(config.name, "Front Desk");
        assert_eq!(config.kind, CapabilityKind::Root);
        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.timeout_ms, 1500);
        assert_eq!(config.llm.model, Provider::Anthropic.default_model());
        assert_eq!(config.llm.temperature, 0.2);
        assert_eq!(config.llm.provider, Provider::Anthropic);
        assert_eq!(config.classifier_llm.provider, Provider::Anthropic);
        assert_eq!(config.summarizer_llm.provider, Provider::Anthropic);
    }

    #[test]
    fn test_provider_flag_reaches_every_call_site() {
        let cli = Cli::parse_from([
            "concierge",
            "--provider",
            "openai",
            "--model",
            "gpt-4o",
            "status",
        ]);
        let config = resolve(&cli).unwrap();
        assert_eq!(config.llm.model, "gpt-4o");

        let root = RootAgent::new(config, Arc::new(ChatClient::new(Provider::OpenAI, "test-key")));

        assert_eq!(root.config().llm.provider, Provider::OpenAI);
        assert_eq!(root.classifier().model().provider, Provider::OpenAI);
        assert_eq!(root.classifier().model().model, "gpt-4");
        assert_eq!(root.summarizer().model().provider, Provider::OpenAI);
        assert_eq!(root.summarizer().model().model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_missing_file_is_error() {
        let cli = Cli::parse_from(["concierge", "--config", "/nonexistent/concierge.yaml", "status"]);
        assert!(resolve(&cli).is_err());
    }
}
