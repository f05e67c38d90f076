//! Root agent that routes each turn to a specialist or answers it itself.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use concierge_agent::{
    Action, ActivityFlag, Agent, AgentConfig, AgentIdentity, CallPolicy, CapabilityKind,
    CompletionRequest, CompletionService, Context, Intent, Message, Response,
};

use crate::classifier::IntentClassifier;
use crate::error::{OrchestratorError, Result};
use crate::registry::AgentRegistry;
use crate::summarizer::ConversationSummarizer;

/// Intents above this confidence are delegated to a specialist.
pub const DELEGATION_THRESHOLD: f64 = 0.8;

/// Direct replies above this confidence suggest a redirect.
pub const REDIRECT_THRESHOLD: f64 = 0.7;

/// Direct replies below this confidence ask clarifying questions.
pub const CLARIFICATION_THRESHOLD: f64 = 0.6;

/// Confidence of the reply to an empty utterance.
pub const NO_INPUT_CONFIDENCE: f64 = 0.5;

/// Confidence of the canned reply used when the model is unreachable.
pub const STATIC_FALLBACK_CONFIDENCE: f64 = 0.8;

/// Reply to an empty utterance.
pub const NO_INPUT_TEXT: &str = "I didn't receive any input. How can I help you today?";

/// Reply used when the model returns no text.
pub const DEFAULT_REPLY: &str =
    "I'm here to help you find the right service agents. What do you need assistance with?";

const FALLBACK_PREFIX: &str = "I'm here to help you find the right service agents. ";

const CLARIFYING_QUESTIONS: [&str; 3] = [
    "Could you provide more details about what you're looking for?",
    "What's your timeline for this request?",
    "Do you have any specific preferences or requirements?",
];

const CAPABILITIES: [&str; 6] = [
    "intent_classification",
    "agent_orchestration",
    "context_management",
    "conversation_routing",
    "fallback_handling",
    "multi_agent_coordination",
];

/// Root orchestrator: the routing state machine of the dispatch engine.
///
/// Each turn is validated, classified, then either delegated to the
/// registered specialist for the intent's capability or answered directly
/// with a model call. Every failure degrades to a lower-confidence reply;
/// [`Agent::process`] on a `RootAgent` always returns `Ok`.
pub struct RootAgent {
    identity: AgentIdentity,
    config: AgentConfig,
    activity: ActivityFlag,
    classifier: IntentClassifier,
    summarizer: ConversationSummarizer,
    registry: AgentRegistry,
    completer: Arc<dyn CompletionService>,
    policy: CallPolicy,
    /// Admission gate; closed while the agent is shut down.
    permits: Mutex<Arc<Semaphore>>,
}

impl RootAgent {
    /// Create a root agent with an empty registry.
    ///
    /// The same completion service backs classification, summarization and
    /// direct replies; all three share the call policy derived from
    /// `config`, and each uses its own model from `config`.
    pub fn new(config: AgentConfig, completer: Arc<dyn CompletionService>) -> Self {
        let policy = CallPolicy::from_config(&config);
        let permits = permit_count(&config);

        info!(
            agent = %config.name,
            provider = %config.llm.provider,
            model = %config.llm.model,
            classifier_model = %config.classifier_llm.model,
            summarizer_model = %config.summarizer_llm.model,
            max_concurrency = permits,
            timeout_ms = config.timeout_ms,
            retry_attempts = config.retry_attempts,
            "Initializing RootAgent"
        );

        Self {
            identity: AgentIdentity::from_config(&config),
            activity: ActivityFlag::new(config.enabled),
            classifier: IntentClassifier::new(Arc::clone(&completer), policy.clone())
                .with_model(config.classifier_llm.clone()),
            summarizer: ConversationSummarizer::new(Arc::clone(&completer), policy.clone())
                .with_model(config.summarizer_llm.clone()),
            registry: AgentRegistry::new(),
            completer,
            policy,
            permits: Mutex::new(Arc::new(Semaphore::new(permits))),
            config,
        }
    }

    /// Use a pre-built registry.
    pub fn with_registry(mut self, registry: AgentRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the classifier.
    pub fn with_classifier(mut self, classifier: IntentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace the summarizer.
    pub fn with_summarizer(mut self, summarizer: ConversationSummarizer) -> Self {
        self.summarizer = summarizer;
        self
    }

    /// Apply one call policy to every completion call site.
    pub fn with_call_policy(mut self, policy: CallPolicy) -> Self {
        self.classifier.set_policy(policy.clone());
        self.summarizer.set_policy(policy.clone());
        self.policy = policy;
        self
    }

    /// Register a specialist under its capability kind.
    pub fn register_agent(&mut self, agent: Arc<dyn Agent>) {
        info!(
            agent = %agent.identity().name,
            capability = %agent.kind(),
            "Registered specialized agent"
        );
        if let Some(previous) = self.registry.register(agent) {
            warn!(agent = %previous.identity().name, "Replaced previously registered agent");
        }
    }

    /// Registered specialists.
    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// The classifier used for routing.
    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    /// The summarizer used for direct replies.
    pub fn summarizer(&self) -> &ConversationSummarizer {
        &self.summarizer
    }

    fn gate(&self) -> Arc<Semaphore> {
        Arc::clone(&self.permits.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Whether an intent qualifies for delegation.
    pub fn should_delegate(&self, intent: &Intent) -> bool {
        intent.confidence > DELEGATION_THRESHOLD && intent.primary_capability != self.kind()
    }

    async fn dispatch(&self, message: &Message, context: &Context) -> Result<Response> {
        message.validate().map_err(OrchestratorError::Validation)?;

        let _permit = self
            .gate()
            .acquire_owned()
            .await
            .map_err(|e| OrchestratorError::Admission(e.to_string()))?;

        info!(
            message_id = %message.id,
            session_id = %message.session_id,
            "Processing user request"
        );

        let Some(text) = message.text() else {
            debug!(message_id = %message.id, "Empty user input");
            return Ok(Response::new(&self.identity, NO_INPUT_TEXT, NO_INPUT_CONFIDENCE));
        };

        let intent = self.classifier.classify(text, context).await;
        info!(
            intent = %intent.name,
            confidence = intent.confidence,
            primary = %intent.primary_capability,
            urgency = %intent.urgency,
            "Intent classified"
        );

        if self.should_delegate(&intent) {
            if let Some(response) = self.delegate(&intent, message, context).await {
                return Ok(response);
            }
        }

        Ok(self.handle_directly(&intent, text, context).await)
    }

    /// Forward the turn to the registered specialist.
    ///
    /// Returns `None` when the turn should be handled directly instead.
    async fn delegate(
        &self,
        intent: &Intent,
        message: &Message,
        context: &Context,
    ) -> Option<Response> {
        let Some(target) = self.registry.get(intent.primary_capability) else {
            warn!(
                capability = %intent.primary_capability,
                "No specialized agent found, handling directly"
            );
            return None;
        };

        if !target.is_active() {
            warn!(
                agent = %target.identity().name,
                "Specialized agent is inactive, handling directly"
            );
            return None;
        }

        let delegated = message.delegate(&self.identity, target.identity(), intent);
        let outcome = AssertUnwindSafe(target.process(&delegated, context))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(response)) => {
                info!(
                    agent = %target.identity().name,
                    confidence = response.confidence,
                    "Delegated to specialized agent"
                );
                Some(response)
            }
            Ok(Err(e)) => {
                error!(
                    capability = %intent.primary_capability,
                    error = %e,
                    "Delegation failed, handling directly"
                );
                None
            }
            Err(panic) => {
                error!(
                    capability = %intent.primary_capability,
                    panic = %panic_message(panic.as_ref()),
                    "Delegated agent panicked, handling directly"
                );
                None
            }
        }
    }

    /// Answer the turn with the root agent's own model call.
    async fn handle_directly(&self, intent: &Intent, text: &str, context: &Context) -> Response {
        let summary = self.summarizer.summarize_with_fallback(context).await;
        let request = CompletionRequest::new(
            &self.config.llm,
            self.persona_prompt(&summary, intent, context),
            text,
        );

        match self.policy.complete(self.completer.as_ref(), &request).await {
            Ok(reply) => {
                let reply = if reply.trim().is_empty() {
                    DEFAULT_REPLY.to_string()
                } else {
                    reply
                };
                Response::new(&self.identity, reply, intent.confidence)
                    .with_actions(suggest_actions(intent, self.kind()))
            }
            Err(e) => {
                error!(error = %e, "LLM response generation failed, using static reply");
                Response::new(
                    &self.identity,
                    static_fallback_text(intent.primary_capability),
                    STATIC_FALLBACK_CONFIDENCE,
                )
            }
        }
    }

    fn persona_prompt(&self, summary: &str, intent: &Intent, context: &Context) -> String {
        format!(
            "You are {name}, a helpful and professional personal assistant.
You help users find and connect with service agents like plumbers, tutors, consultants, etc.

Key guidelines:
- Be warm, professional, and helpful
- Ask clarifying questions when needed
- Suggest specific next steps
- If you can't help directly, recommend the right type of specialist
- Keep responses concise but informative

Current conversation context: {summary}

Detected intent: {intent} (confidence: {confidence})
User preferences: {style} communication style",
            name = self.identity.name,
            summary = summary,
            intent = intent.name,
            confidence = intent.confidence,
            style = context.user_preferences.communication_style,
        )
    }
}

#[async_trait]
impl Agent for RootAgent {
    fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn activity(&self) -> &ActivityFlag {
        &self.activity
    }

    /// The root agent is the universal fallback.
    fn can_handle(&self, _intent: &Intent) -> bool {
        true
    }

    async fn process(
        &self,
        message: &Message,
        context: &Context,
    ) -> concierge_agent::Result<Response> {
        let outcome = AssertUnwindSafe(self.dispatch(message, context))
            .catch_unwind()
            .await;

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!(phase = e.phase(), error = %e, "Error processing message");
                Response::escalation(&self.identity, e.to_string(), e.phase())
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!(panic = %reason, "Panic while processing message");
                Response::escalation(&self.identity, reason, "process")
            }
        };

        Ok(response)
    }

    fn capabilities(&self) -> Vec<String> {
        CAPABILITIES.iter().map(|c| c.to_string()).collect()
    }

    /// Mark the agent active and reopen admission if it was shut down.
    async fn initialize(&self) -> concierge_agent::Result<()> {
        {
            let mut permits = self.permits.lock().unwrap_or_else(PoisonError::into_inner);
            if permits.is_closed() {
                *permits = Arc::new(Semaphore::new(permit_count(&self.config)));
            }
        }
        info!(agent = %self.identity.name, "Initializing agent");
        self.activity.set(true);
        Ok(())
    }

    /// Mark the agent inactive and refuse new turns.
    ///
    /// Turns already holding a permit run to completion.
    async fn shutdown(&self) -> concierge_agent::Result<()> {
        self.gate().close();
        info!(agent = %self.identity.name, "Shutting down agent");
        self.activity.set(false);
        Ok(())
    }
}

fn permit_count(config: &AgentConfig) -> usize {
    config.max_concurrency.clamp(1, Semaphore::MAX_PERMITS)
}

/// Follow-up actions for a direct reply.
///
/// Both rules may fire for the same intent.
pub fn suggest_actions(intent: &Intent, own_kind: CapabilityKind) -> Vec<Action> {
    let mut actions = Vec::new();

    if intent.primary_capability != own_kind && intent.confidence > REDIRECT_THRESHOLD {
        actions.push(Action::Redirect {
            capability_kind: intent.primary_capability,
            reason: format!(
                "Based on your request, I think our {} specialist can help you better.",
                intent.primary_capability
            ),
        });
    }

    if intent.confidence < CLARIFICATION_THRESHOLD {
        actions.push(Action::Workflow {
            workflow_type: "clarification".to_string(),
            suggested_questions: CLARIFYING_QUESTIONS.iter().map(|q| q.to_string()).collect(),
        });
    }

    actions
}

/// Canned reply used when the model call for a direct reply fails.
pub fn static_fallback_text(kind: CapabilityKind) -> String {
    let question = match kind {
        CapabilityKind::Restaurant => {
            "Are you looking for dining recommendations or restaurant reservations?"
        }
        CapabilityKind::Bank => "Do you need help with banking or financial services?",
        CapabilityKind::Travel => "Are you planning a trip or looking for travel assistance?",
        CapabilityKind::Healthcare => {
            "Do you need help finding healthcare services or booking appointments?"
        }
        CapabilityKind::Entertainment => {
            "Are you looking for entertainment options or event tickets?"
        }
        CapabilityKind::Root | CapabilityKind::General => {
            "Could you tell me more about what kind of help you need?"
        }
    };
    format!("{}{}", FALLBACK_PREFIX, question)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
