//! Per-session conversational state.
//!
//! The context is owned by the session layer. Agents read history and
//! preferences from it but never persist changes; any collaborator that
//! mutates `shared_state` concurrently for one session must bring its own
//! synchronization.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::AgentIdentity;

/// Coarse sentiment tag attached to a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// A single user turn from the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMessage {
    /// Unique message identifier.
    pub id: String,

    /// Text the user typed.
    pub content: String,

    /// When the message was received.
    pub timestamp: DateTime<Utc>,

    /// Author of the message.
    pub user_id: String,

    /// Intent label recorded for this turn, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,

    /// Sentiment recorded for this turn, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

impl UserMessage {
    /// Create a message with a fresh id and the current timestamp.
    pub fn new(user_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            timestamp: Utc::now(),
            user_id: user_id.into(),
            intent: None,
            sentiment: None,
        }
    }
}

/// Tone the user wants replies in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationStyle {
    Formal,
    Casual,
    #[default]
    Professional,
}

impl std::fmt::Display for CommunicationStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Formal => write!(f, "formal"),
            Self::Casual => write!(f, "casual"),
            Self::Professional => write!(f, "professional"),
        }
    }
}

/// Notification channels the user opted into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub email: bool,
    pub sms: bool,
    pub push: bool,
}

/// Stored user preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    /// Capability labels the user prefers, most preferred first.
    #[serde(default)]
    pub preferred_agents: Vec<String>,

    #[serde(default)]
    pub communication_style: CommunicationStyle,

    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub notification_settings: NotificationSettings,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            preferred_agents: Vec::new(),
            communication_style: CommunicationStyle::default(),
            timezone: default_timezone(),
            language: default_language(),
            notification_settings: NotificationSettings::default(),
        }
    }
}

/// Conversational state of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    /// Owner of the session.
    pub user_id: String,

    /// Prior user turns, oldest first.
    #[serde(default)]
    pub conversation_history: Vec<UserMessage>,

    #[serde(default)]
    pub user_preferences: UserPreferences,

    /// Agents currently engaged in the session.
    #[serde(default)]
    pub active_agents: Vec<AgentIdentity>,

    /// Free-form state shared between collaborators.
    #[serde(default)]
    pub shared_state: HashMap<String, serde_json::Value>,

    pub session_start_time: DateTime<Utc>,

    pub last_activity: DateTime<Utc>,
}

impl Context {
    /// Create an empty context for the user, starting now.
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            conversation_history: Vec::new(),
            user_preferences: UserPreferences::default(),
            active_agents: Vec::new(),
            shared_state: HashMap::new(),
            session_start_time: now,
            last_activity: now,
        }
    }

    /// Anonymous context used when the caller is not authenticated.
    pub fn anonymous() -> Self {
        Self::new("anonymous")
    }

    /// Set the user preferences.
    pub fn with_preferences(mut self, preferences: UserPreferences) -> Self {
        self.user_preferences = preferences;
        self
    }

    /// Append a user turn and bump `last_activity`.
    ///
    /// Intended for the session layer; the dispatch core never calls it.
    pub fn push_user_message(&mut self, content: impl Into<String>) {
        let message = UserMessage::new(self.user_id.clone(), content);
        self.last_activity = message.timestamp;
        self.conversation_history.push(message);
    }

    /// The last `count` turns, oldest first.
    pub fn recent_history(&self, count: usize) -> &[UserMessage] {
        let start = self.conversation_history.len().saturating_sub(count);
        &self.conversation_history[start..]
    }
}
