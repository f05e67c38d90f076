//! Messages exchanged between the transport layer and agents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::agent::AgentIdentity;
use crate::context::Context;
use crate::error::{AgentError, Result};
use crate::intent::{Intent, Urgency};

/// Kind of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    UserRequest,
    AgentResponse,
    AgentDelegation,
    ContextUpdate,
    Error,
    System,
}

/// Optional routing hints attached by the transport layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub priority: Urgency,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Expected handling time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_auth: Option<bool>,
}

/// Body of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// Intent label; empty until the turn has been classified.
    #[serde(default)]
    pub intent: String,

    pub context: Context,

    /// Free-form data; user text lives under `text` or `query`.
    #[serde(default)]
    pub data: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// A single hop of a conversation turn.
///
/// Messages are immutable once built; forwarding produces a derived copy
/// via [`Message::delegate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub from: AgentIdentity,
    pub to: AgentIdentity,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub payload: Payload,
    pub session_id: String,
    pub correlation_id: String,
}

impl Message {
    /// Build a user request carrying `text` in its data.
    ///
    /// The correlation id is freshly generated.
    pub fn user_request(
        from: AgentIdentity,
        to: AgentIdentity,
        session_id: impl Into<String>,
        text: impl Into<String>,
        context: Context,
    ) -> Self {
        let mut data = Map::new();
        data.insert("text".to_string(), Value::String(text.into()));

        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            from,
            to,
            kind: MessageKind::UserRequest,
            payload: Payload {
                intent: String::new(),
                context,
                data,
                metadata: None,
            },
            session_id: session_id.into(),
            correlation_id: Uuid::new_v4().to_string(),
        }
    }

    /// Attach metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.payload.metadata = Some(metadata);
        self
    }

    /// The user's utterance, read from `data.text` then `data.query`.
    ///
    /// The text is returned as sent. Returns `None` when neither field
    /// holds a non-blank string.
    pub fn text(&self) -> Option<&str> {
        ["text", "query"]
            .iter()
            .filter_map(|key| self.payload.data.get(*key))
            .filter_map(Value::as_str)
            .find(|s| !s.trim().is_empty())
    }

    /// Check that the routing fields are populated.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(AgentError::InvalidMessage("missing message id".into()));
        }
        if self.session_id.is_empty() {
            return Err(AgentError::InvalidMessage("missing session id".into()));
        }
        if self.from.id.is_empty() || self.to.id.is_empty() {
            return Err(AgentError::InvalidMessage("missing sender or recipient".into()));
        }
        Ok(())
    }

    /// Derive the message forwarded to a specialist.
    ///
    /// The copy gets a new id, `from`/`to` rewritten, the intent label set and
    /// the intent parameters merged over the original data. Session and
    /// correlation ids are preserved.
    pub fn delegate(&self, from: &AgentIdentity, to: &AgentIdentity, intent: &Intent) -> Self {
        let mut data = self.payload.data.clone();
        for (key, value) in &intent.parameters {
            data.insert(key.clone(), value.clone());
        }

        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            from: from.clone(),
            to: to.clone(),
            kind: MessageKind::AgentDelegation,
            payload: Payload {
                intent: intent.name.clone(),
                context: self.payload.context.clone(),
                data,
                metadata: self.payload.metadata.clone(),
            },
            session_id: self.session_id.clone(),
            correlation_id: self.correlation_id.clone(),
        }
    }
}
