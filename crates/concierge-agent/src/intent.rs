//! Classifier output types.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::agent::CapabilityKind;

/// How soon the user needs help.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Urgency {
    /// Map an arbitrary label onto the enumeration, defaulting to `Medium`.
    pub fn normalize(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            "urgent" => Self::Urgent,
            _ => Self::Medium,
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Urgent => write!(f, "urgent"),
        }
    }
}

/// Structured judgment of what the user wants and who should handle it.
///
/// Built fresh for every turn and consumed immediately by the routing
/// policy. `confidence` is kept within `[0, 1]` by every constructor and
/// on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    /// Short intent label, e.g. `book_table`.
    pub name: String,

    /// Classifier confidence in `[0, 1]`.
    #[serde(deserialize_with = "deserialize_confidence")]
    pub confidence: f64,

    /// Capability that should handle the turn.
    pub primary_capability: CapabilityKind,

    /// Other capabilities that may be involved.
    #[serde(default)]
    pub secondary_capabilities: BTreeSet<CapabilityKind>,

    /// Whether more than one capability is needed.
    #[serde(default)]
    pub requires_multiple: bool,

    /// Free-form parameters extracted from the utterance.
    #[serde(default)]
    pub parameters: Map<String, Value>,

    /// Urgency of the request.
    #[serde(default)]
    pub urgency: Urgency,
}

impl Intent {
    /// Create an intent with clamped confidence and empty optional fields.
    pub fn new(name: impl Into<String>, confidence: f64, primary: CapabilityKind) -> Self {
        Self {
            name: name.into(),
            confidence: clamp_confidence(confidence),
            primary_capability: primary,
            secondary_capabilities: BTreeSet::new(),
            requires_multiple: false,
            parameters: Map::new(),
            urgency: Urgency::default(),
        }
    }

    /// Set the urgency.
    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    /// Set the extracted parameters.
    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set the secondary capabilities.
    pub fn with_secondary(mut self, secondary: impl IntoIterator<Item = CapabilityKind>) -> Self {
        self.secondary_capabilities = secondary.into_iter().collect();
        self
    }

    /// Set whether several capabilities are required.
    pub fn with_requires_multiple(mut self, requires_multiple: bool) -> Self {
        self.requires_multiple = requires_multiple;
        self
    }
}

/// Clamp a confidence score into `[0, 1]`; NaN becomes 0.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn deserialize_confidence<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(clamp_confidence)
}
