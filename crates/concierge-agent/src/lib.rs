//! Capability contract and data model for the Concierge dispatch engine.
//!
//! This crate defines the `Agent` trait that the root orchestrator and every
//! specialist implement, the messages and responses they exchange, and the
//! completion-service seam through which agents reach a language model.
//!
//! # Core Types
//!
//! - [`Agent`]: The capability contract
//! - [`AgentIdentity`] / [`CapabilityKind`]: Who an agent is and what it serves
//! - [`AgentConfig`] / [`ModelConfig`]: Construction-time settings
//! - [`Message`] / [`Context`]: What an agent is asked to process
//! - [`Intent`]: Classifier output used for routing
//! - [`Response`] / [`Action`]: What an agent answers
//! - [`CompletionService`]: Text-completion seam, implemented by [`ChatClient`]
//! - [`CallPolicy`]: Deadline and retry budget around completion calls
//!
//! # Example
//!
//! ```ignore
//! use concierge_agent::{Agent, AgentIdentity, Context, Message, Response, Result};
//! use async_trait::async_trait;
//!
//! struct DiningAgent {
//!     identity: AgentIdentity,
//!     // ... other fields
//! }
//!
//! #[async_trait]
//! impl Agent for DiningAgent {
//!     fn identity(&self) -> &AgentIdentity {
//!         &self.identity
//!     }
//!
//!     async fn process(&self, message: &Message, _context: &Context) -> Result<Response> {
//!         Ok(Response::new(&self.identity, "Table booked.", 0.9))
//!     }
//!
//!     // ... implement other methods
//! }
//! ```

pub mod agent;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod intent;
pub mod message;
pub mod policy;
pub mod response;

// Re-export commonly used items
pub use agent::{ActivityFlag, Agent, AgentIdentity, AgentStatus, CapabilityKind};
pub use client::{ChatClient, CompletionRequest, CompletionService};
pub use config::{AgentConfig, ModelConfig, Provider};
pub use context::{CommunicationStyle, Context, UserMessage, UserPreferences};
pub use error::{AgentError, Result};
pub use intent::{Intent, Urgency};
pub use message::{Message, MessageKind, Metadata, Payload};
pub use policy::CallPolicy;
pub use response::{Action, Response};
