//! Intent classification.
//!
//! The classifier asks a language model for a fixed-shape JSON judgment and
//! decodes it with a strict schema. Whenever the call fails, returns nothing
//! or returns something that does not decode, it falls back to a
//! deterministic keyword matcher, so [`IntentClassifier::classify`] always
//! yields a well-formed [`Intent`].

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use concierge_agent::{
    AgentError, CallPolicy, CapabilityKind, CompletionRequest, CompletionService, Context,
    Intent, ModelConfig, Result, Urgency,
};

/// Confidence reported by the keyword fallback.
pub const FALLBACK_CONFIDENCE: f64 = 0.6;

/// Intent name reported by the keyword fallback.
pub const FALLBACK_INTENT_NAME: &str = "fallback_classification";

/// Intent name used when the model omits one.
pub const DEFAULT_INTENT_NAME: &str = "general_inquiry";

/// Confidence used when the model omits one.
const DEFAULT_CONFIDENCE: f64 = 0.5;

/// History turns included in the classification prompt.
const HISTORY_TURNS: usize = 3;

/// Capability keywords, checked in order; the first hit wins.
///
/// Deliberately sparse: trades such as "plumber" have no entry and land on
/// `General`.
const CAPABILITY_KEYWORDS: &[(CapabilityKind, &[&str])] = &[
    (CapabilityKind::Restaurant, &["restaurant", "food", "meal"]),
    (CapabilityKind::Bank, &["bank", "payment", "money"]),
    (CapabilityKind::Travel, &["travel", "flight", "hotel"]),
    (CapabilityKind::Healthcare, &["doctor", "health", "medical"]),
    (CapabilityKind::Entertainment, &["movie", "show", "event"]),
];

/// Urgency keywords, checked in order; the first hit wins.
const URGENCY_KEYWORDS: &[(Urgency, &[&str])] = &[
    (Urgency::Urgent, &["urgent", "emergency", "asap"]),
    (Urgency::High, &["important", "soon"]),
];

const SYSTEM_PROMPT: &str = r#"You are an expert intent classifier for a personal concierge.
Analyze user inputs and classify them into the capability that should handle them.

Available capabilities:
- RESTAURANT: dining, reservations, food orders
- BANK: finance, payments, account management
- TRAVEL: flights, hotels, trips, bookings
- HEALTHCARE: appointments, medical, wellness
- ENTERTAINMENT: events, movies, shows, tickets
- GENERAL: everything else

Response format (JSON only):
{
  "name": "intent_name",
  "confidence": 0.95,
  "primaryCapability": "RESTAURANT",
  "secondaryCapabilities": ["BANK"],
  "requiresMultiple": false,
  "parameters": {"location": "NYC", "time": "tonight"},
  "urgency": "medium"
}"#;

/// Wire shape of the model's judgment.
///
/// Every field is typed; a value of the wrong type fails the decode and
/// triggers the keyword fallback. Only `primaryCapability` is required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClassification {
    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    confidence: Option<f64>,

    #[serde(alias = "primaryAgent")]
    primary_capability: String,

    #[serde(default, alias = "secondaryAgents")]
    secondary_capabilities: Option<Vec<String>>,

    #[serde(default, alias = "requiresMultipleAgents")]
    requires_multiple: Option<bool>,

    #[serde(default)]
    parameters: Option<Map<String, Value>>,

    #[serde(default)]
    urgency: Option<String>,
}

impl RawClassification {
    fn normalize(self) -> Intent {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_INTENT_NAME.to_string());

        Intent::new(
            name,
            self.confidence.unwrap_or(DEFAULT_CONFIDENCE),
            CapabilityKind::normalize(&self.primary_capability),
        )
        .with_secondary(
            self.secondary_capabilities
                .unwrap_or_default()
                .iter()
                .map(|label| CapabilityKind::normalize(label)),
        )
        .with_requires_multiple(self.requires_multiple.unwrap_or(false))
        .with_parameters(self.parameters.unwrap_or_default())
        .with_urgency(
            self.urgency
                .as_deref()
                .map(Urgency::normalize)
                .unwrap_or_default(),
        )
    }
}

/// Maps an utterance plus recent context to an [`Intent`].
pub struct IntentClassifier {
    completer: Arc<dyn CompletionService>,
    model: ModelConfig,
    policy: CallPolicy,
}

impl IntentClassifier {
    /// Create a classifier using the default classification model.
    pub fn new(completer: Arc<dyn CompletionService>, policy: CallPolicy) -> Self {
        Self {
            completer,
            model: ModelConfig::classifier(),
            policy,
        }
    }

    /// Override the classification model.
    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    /// Replace the call policy.
    pub fn set_policy(&mut self, policy: CallPolicy) {
        self.policy = policy;
    }

    /// Classification model in use.
    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    /// Classify a non-empty utterance. Never fails.
    pub async fn classify(&self, text: &str, context: &Context) -> Intent {
        let request = CompletionRequest::new(&self.model, SYSTEM_PROMPT, build_prompt(text, context));

        let outcome = self
            .policy
            .complete(self.completer.as_ref(), &request)
            .await
            .and_then(|raw| parse_classification(&raw));

        match outcome {
            Ok(intent) => {
                debug!(
                    intent = %intent.name,
                    confidence = intent.confidence,
                    "Model classification decoded"
                );
                intent
            }
            Err(e) => {
                warn!(error = %e, "Intent classification failed, using keyword fallback");
                fallback_intent(text)
            }
        }
    }
}

/// Assemble the classification prompt.
pub fn build_prompt(text: &str, context: &Context) -> String {
    let mut prompt = format!("Classify this user input: \"{}\"", text);

    let recent = context.recent_history(HISTORY_TURNS);
    if !recent.is_empty() {
        prompt.push_str("\n\nRecent conversation context:\n");
        for (i, message) in recent.iter().enumerate() {
            prompt.push_str(&format!("{}. \"{}\"\n", i + 1, message.content));
        }
    }

    let preferred = &context.user_preferences.preferred_agents;
    if !preferred.is_empty() {
        prompt.push_str(&format!("\nUser's preferred agents: {}", preferred.join(", ")));
    }

    prompt
}

/// Decode and normalize the model's reply.
pub fn parse_classification(raw: &str) -> Result<Intent> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(AgentError::ResponseParse("No classification result".into()));
    }

    let classification: RawClassification = serde_json::from_str(body)?;
    Ok(classification.normalize())
}

/// Deterministic keyword classification. Performs no I/O.
pub fn fallback_intent(text: &str) -> Intent {
    let input = text.to_lowercase();

    let primary = first_match(&input, CAPABILITY_KEYWORDS).unwrap_or(CapabilityKind::General);
    let urgency = first_match(&input, URGENCY_KEYWORDS).unwrap_or_default();

    Intent::new(FALLBACK_INTENT_NAME, FALLBACK_CONFIDENCE, primary).with_urgency(urgency)
}

fn first_match<T: Copy>(input: &str, table: &[(T, &[&str])]) -> Option<T> {
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| input.contains(k)))
        .map(|(value, _)| *value)
}

/// Models often wrap JSON in a Markdown fence.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
