//! Conversation summarization for prompt context.
//!
//! Compresses the most recent turns of a session into a one or two sentence
//! brief. A failed summary never blocks a reply: callers use
//! [`ConversationSummarizer::summarize_with_fallback`], which always returns
//! some text.

use std::sync::Arc;

use tracing::warn;

use concierge_agent::{
    CallPolicy, CompletionRequest, CompletionService, Context, ModelConfig, Result,
};

/// History turns fed to the summarizer.
const SUMMARY_TURNS: usize = 5;

/// Summary used when there is no history yet.
pub const EMPTY_HISTORY_SUMMARY: &str = "This is the start of our conversation.";

/// Summary used when the model returned no text.
pub const UNAVAILABLE_SUMMARY: &str = "Conversation summary unavailable";

/// Summary used when the model call failed.
pub const FALLBACK_SUMMARY: &str = "Recent conversation context available";

const SYSTEM_PROMPT: &str =
    "Summarize this conversation in 1-2 sentences, focusing on what the user is looking for.";

/// LLM-backed history compressor.
pub struct ConversationSummarizer {
    completer: Arc<dyn CompletionService>,
    model: ModelConfig,
    policy: CallPolicy,
}

impl ConversationSummarizer {
    /// Create a summarizer using the default summary model.
    pub fn new(completer: Arc<dyn CompletionService>, policy: CallPolicy) -> Self {
        Self {
            completer,
            model: ModelConfig::summarizer(),
            policy,
        }
    }

    /// Override the summary model.
    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    /// Model used for summaries.
    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    /// Replace the call policy.
    pub fn set_policy(&mut self, policy: CallPolicy) {
        self.policy = policy;
    }

    /// Summarize the recent history, surfacing model failures.
    ///
    /// An empty history is answered without a model call.
    pub async fn summarize(&self, context: &Context) -> Result<String> {
        let recent = context.recent_history(SUMMARY_TURNS);
        if recent.is_empty() {
            return Ok(EMPTY_HISTORY_SUMMARY.to_string());
        }

        let transcript = recent
            .iter()
            .map(|m| format!("User: {}", m.content))
            .collect::<Vec<_>>()
            .join("\n");

        let request = CompletionRequest::new(
            &self.model,
            SYSTEM_PROMPT,
            format!("Conversation:\n{}", transcript),
        );

        let summary = self.policy.complete(self.completer.as_ref(), &request).await?;
        let summary = summary.trim();
        if summary.is_empty() {
            Ok(UNAVAILABLE_SUMMARY.to_string())
        } else {
            Ok(summary.to_string())
        }
    }

    /// Summarize the recent history, substituting a generic brief on failure.
    pub async fn summarize_with_fallback(&self, context: &Context) -> String {
        match self.summarize(context).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "Summarization failed, using generic context");
                FALLBACK_SUMMARY.to_string()
            }
        }
    }
}
