//! Core Agent trait definition.
//!
//! This module defines the capability contract that the root orchestrator and
//! every specialist implement, along with the identity types used to address
//! them.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::AgentConfig;
use crate::context::Context;
use crate::error::Result;
use crate::intent::Intent;
use crate::message::Message;
use crate::response::Response;

/// Version stamped on every identity built by this crate.
pub const AGENT_VERSION: &str = "1.0.0";

/// Category of work an agent serves.
///
/// The set is closed: labels that do not match a variant are normalized to
/// [`CapabilityKind::General`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    /// The root orchestrator.
    Root,
    /// Dining, reservations, food orders.
    Restaurant,
    /// Finance, payments, account management.
    Bank,
    /// Flights, hotels, trips.
    Travel,
    /// Appointments, medical, wellness.
    Healthcare,
    /// Events, movies, shows, tickets.
    Entertainment,
    /// Everything else.
    General,
}

impl CapabilityKind {
    /// All capability kinds, in declaration order.
    pub const ALL: [CapabilityKind; 7] = [
        Self::Root,
        Self::Restaurant,
        Self::Bank,
        Self::Travel,
        Self::Healthcare,
        Self::Entertainment,
        Self::General,
    ];

    /// Upper-case label used in classifier prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Root => "ROOT",
            Self::Restaurant => "RESTAURANT",
            Self::Bank => "BANK",
            Self::Travel => "TRAVEL",
            Self::Healthcare => "HEALTHCARE",
            Self::Entertainment => "ENTERTAINMENT",
            Self::General => "GENERAL",
        }
    }

    /// Map an arbitrary label onto the enumeration, defaulting to `General`.
    pub fn normalize(label: &str) -> Self {
        label.parse().unwrap_or(Self::General)
    }
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label().to_lowercase())
    }
}

impl std::str::FromStr for CapabilityKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == upper)
            .ok_or_else(|| format!("unknown capability: {}", s))
    }
}

/// Identity of a live capability endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentIdentity {
    /// Unique identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Capability served.
    pub capability_kind: CapabilityKind,
    /// Contract version.
    pub version: String,
}

impl AgentIdentity {
    /// Create an identity at the current contract version.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: CapabilityKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capability_kind: kind,
            version: AGENT_VERSION.to_string(),
        }
    }

    /// Build the identity described by an agent configuration.
    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(&config.id, &config.name, config.kind)
    }
}

/// Snapshot returned by [`Agent::status`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    /// Whether the agent is accepting work.
    pub active: bool,
    /// The agent's construction-time configuration.
    pub config: AgentConfig,
}

/// Advisory on/off switch shared by every agent implementation.
#[derive(Debug)]
pub struct ActivityFlag(AtomicBool);

impl ActivityFlag {
    /// Create a flag in the given state.
    pub fn new(active: bool) -> Self {
        Self(AtomicBool::new(active))
    }

    /// Current state.
    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Update the state.
    pub fn set(&self, active: bool) {
        self.0.store(active, Ordering::Release);
    }
}

impl Default for ActivityFlag {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Capability contract implemented by every dispatch target.
///
/// # Object Safety
///
/// This trait is object-safe; the registry stores agents as
/// `Arc<dyn Agent>`.
///
/// # Failure modes
///
/// `process` should report expected failures as a [`Response`] with zero
/// confidence and an escalate action. An `Err` is treated by the caller as
/// an unexpected failure of the agent.
///
/// # Example
///
/// ```ignore
/// use concierge_agent::{Agent, AgentConfig, CapabilityKind, Context, Message, Response};
///
/// struct DiningAgent { /* ... */ }
///
/// #[async_trait]
/// impl Agent for DiningAgent {
///     fn identity(&self) -> &AgentIdentity { &self.identity }
///     async fn process(&self, message: &Message, context: &Context) -> Result<Response> {
///         // ...
///     }
///     // ... implement other methods
/// }
/// ```
#[async_trait]
pub trait Agent: Send + Sync {
    /// Identity of this agent.
    fn identity(&self) -> &AgentIdentity;

    /// Construction-time configuration.
    fn config(&self) -> &AgentConfig;

    /// Lifecycle flag backing `is_active`, `initialize` and `shutdown`.
    fn activity(&self) -> &ActivityFlag;

    /// Whether this agent is statically eligible for the intent.
    fn can_handle(&self, intent: &Intent) -> bool;

    /// Process a message and return a response.
    ///
    /// # Arguments
    /// * `message` - The inbound (or delegated) message
    /// * `context` - Per-session conversational state
    async fn process(&self, message: &Message, context: &Context) -> Result<Response>;

    /// Static self-description used for listings.
    fn capabilities(&self) -> Vec<String>;

    /// Get the unique identifier for this agent.
    fn id(&self) -> &str {
        &self.identity().id
    }

    /// Capability served by this agent.
    fn kind(&self) -> CapabilityKind {
        self.identity().capability_kind
    }

    /// Whether the agent is accepting work.
    fn is_active(&self) -> bool {
        self.activity().get()
    }

    /// Mark the agent active.
    async fn initialize(&self) -> Result<()> {
        info!(agent = %self.identity().name, "Initializing agent");
        self.activity().set(true);
        Ok(())
    }

    /// Mark the agent inactive.
    async fn shutdown(&self) -> Result<()> {
        info!(agent = %self.identity().name, "Shutting down agent");
        self.activity().set(false);
        Ok(())
    }

    /// Activity flag and configuration, for health endpoints.
    fn status(&self) -> AgentStatus {
        AgentStatus {
            active: self.is_active(),
            config: self.config().clone(),
        }
    }
}
