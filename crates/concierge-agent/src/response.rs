//! Agent response types.
//!
//! This module defines the response structure returned by agents after
//! processing a message, and the follow-up actions attached to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::{AgentIdentity, CapabilityKind};

/// Text returned when an unexpected failure is converted into a response.
pub const ERROR_RESPONSE_TEXT: &str =
    "I'm sorry, I encountered an issue processing your request. Please try again.";

/// Follow-up action suggested alongside a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Action {
    /// Hand the conversation to a specialist.
    #[serde(rename_all = "camelCase")]
    Redirect {
        capability_kind: CapabilityKind,
        reason: String,
    },

    /// Start a guided workflow such as clarification.
    #[serde(rename_all = "camelCase")]
    Workflow {
        workflow_type: String,
        suggested_questions: Vec<String>,
    },

    /// Call an external API on the user's behalf.
    #[serde(rename_all = "camelCase")]
    ApiCall {
        endpoint: String,
        method: String,
        #[serde(default)]
        body: serde_json::Value,
    },

    /// Report an unrecovered internal failure to operators.
    Escalate { error: String, context: String },
}

impl Action {
    /// Whether this is an escalate action.
    pub fn is_escalate(&self) -> bool {
        matches!(self, Self::Escalate { .. })
    }
}

/// Response from an agent after processing a message.
///
/// Built once per turn; never modified after it leaves the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: String,

    /// Id of the agent that produced the response.
    pub agent_id: String,

    /// Text shown to the user.
    #[serde(rename = "response")]
    pub text: String,

    /// How much the agent trusts its own answer, in `[0, 1]`.
    pub confidence: f64,

    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_suggested_agents: Option<Vec<AgentIdentity>>,
}

impl Response {
    /// Create a response from the given agent.
    pub fn new(agent: &AgentIdentity, text: impl Into<String>, confidence: f64) -> Self {
        Self {
            id: response_id(agent.capability_kind),
            agent_id: agent.id.clone(),
            text: text.into(),
            confidence,
            timestamp: Utc::now(),
            actions: Vec::new(),
            next_suggested_agents: Some(Vec::new()),
        }
    }

    /// Zero-confidence response carrying an escalate action.
    ///
    /// `phase` names where the failure happened.
    pub fn escalation(agent: &AgentIdentity, error: impl Into<String>, phase: impl Into<String>) -> Self {
        Self {
            next_suggested_agents: None,
            ..Self::new(agent, ERROR_RESPONSE_TEXT, 0.0)
        }
        .with_actions(vec![Action::Escalate {
            error: error.into(),
            context: phase.into(),
        }])
    }

    /// Set the actions.
    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    /// Whether the response carries an escalate action.
    pub fn is_escalation(&self) -> bool {
        self.actions.iter().any(Action::is_escalate)
    }

    /// Check if the response has any actions.
    pub fn has_actions(&self) -> bool {
        !self.actions.is_empty()
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)?;
        if !self.actions.is_empty() {
            write!(f, " [+{} actions]", self.actions.len())?;
        }
        Ok(())
    }
}

/// `<kind>_<unix millis>_<9 random chars>`.
fn response_id(kind: CapabilityKind) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", kind, Utc::now().timestamp_millis(), &random[..9])
}
