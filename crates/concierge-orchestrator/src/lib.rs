//! Intent routing layer for the Concierge dispatch engine.
//!
//! This crate provides the [`RootAgent`], which accepts every user turn,
//! classifies it and either forwards it to the registered specialist for the
//! detected capability or answers it directly.
//!
//! # Overview
//!
//! The orchestrator is built from:
//! - An [`IntentClassifier`] with a deterministic keyword fallback
//! - A [`ConversationSummarizer`] that condenses recent history for prompts
//! - An [`AgentRegistry`] mapping capability kinds to specialists
//!
//! # Example
//!
//! ```ignore
//! use concierge_agent::{Agent, AgentConfig, ChatClient, Context, Provider};
//! use concierge_orchestrator::RootAgent;
//!
//! # async fn example() -> concierge_agent::Result<()> {
//! let client = Arc::new(ChatClient::from_env(Provider::OpenRouter)?);
//! let mut root = RootAgent::new(AgentConfig::root(), client);
//! root.register_agent(Arc::new(DiningAgent::new()));
//!
//! let message = Message::user_request(user, root.identity().clone(), "s-1", "Book a table", Context::new("u-1"));
//! let response = root.process(&message, &message.payload.context).await?;
//! println!("{}", response.text);
//! # Ok(())
//! # }
//! ```

mod classifier;
mod error;
mod orchestrator;
mod registry;
mod summarizer;

pub use classifier::{
    build_prompt, fallback_intent, parse_classification, IntentClassifier, DEFAULT_INTENT_NAME,
    FALLBACK_CONFIDENCE, FALLBACK_INTENT_NAME,
};
pub use error::{OrchestratorError, Result};
pub use orchestrator::{
    static_fallback_text, suggest_actions, RootAgent, CLARIFICATION_THRESHOLD, DEFAULT_REPLY,
    DELEGATION_THRESHOLD, NO_INPUT_CONFIDENCE, NO_INPUT_TEXT, REDIRECT_THRESHOLD,
    STATIC_FALLBACK_CONFIDENCE,
};
pub use registry::AgentRegistry;
pub use summarizer::{
    ConversationSummarizer, EMPTY_HISTORY_SUMMARY, FALLBACK_SUMMARY, UNAVAILABLE_SUMMARY,
};

// Re-export commonly used types from concierge-agent
pub use concierge_agent::{Agent, CapabilityKind, Context, Intent, Message, Response};
