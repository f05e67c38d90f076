//! Registry of specialist agents keyed by capability.

use std::collections::HashMap;
use std::sync::Arc;

use concierge_agent::{Agent, AgentIdentity, CapabilityKind};

/// Capability kind to the single live agent serving it.
///
/// Built at bootstrap and read-only afterwards, so lookups need no locking.
/// Agents are stored as `Arc<dyn Agent>` to allow sharing across tasks.
///
/// # Example
///
/// ```ignore
/// use concierge_orchestrator::AgentRegistry;
///
/// let mut registry = AgentRegistry::new();
/// registry.register(Arc::new(DiningAgent::new()));
///
/// if let Some(agent) = registry.get(CapabilityKind::Restaurant) {
///     println!("Using: {}", agent.identity().name);
/// }
/// ```
#[derive(Default)]
pub struct AgentRegistry {
    agents: HashMap<CapabilityKind, Arc<dyn Agent>>,
}

impl AgentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an agent under its capability kind.
    ///
    /// Returns the agent previously registered for that kind, if any.
    pub fn register(&mut self, agent: Arc<dyn Agent>) -> Option<Arc<dyn Agent>> {
        self.agents.insert(agent.kind(), agent)
    }

    /// Gets the agent serving a capability.
    pub fn get(&self, kind: CapabilityKind) -> Option<Arc<dyn Agent>> {
        self.agents.get(&kind).cloned()
    }

    /// Whether a capability has an agent.
    pub fn contains(&self, kind: CapabilityKind) -> bool {
        self.agents.contains_key(&kind)
    }

    /// Registered capability kinds, sorted.
    pub fn kinds(&self) -> Vec<CapabilityKind> {
        let mut kinds: Vec<_> = self.agents.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Identities of all registered agents, sorted by capability.
    pub fn identities(&self) -> Vec<AgentIdentity> {
        self.kinds()
            .into_iter()
            .filter_map(|kind| self.agents.get(&kind))
            .map(|agent| agent.identity().clone())
            .collect()
    }

    /// Returns the number of registered agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Returns true if no agents are registered.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
