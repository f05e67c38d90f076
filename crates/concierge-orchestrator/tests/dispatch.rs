//! End-to-end routing tests for the root agent.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use concierge_agent::{
    Action, ActivityFlag, Agent, AgentConfig, AgentError, AgentIdentity, CallPolicy,
    CapabilityKind, CompletionRequest, CompletionService, Context, Intent, Message, MessageKind,
    Response, Urgency,
};
use concierge_orchestrator::{
    fallback_intent, static_fallback_text, AgentRegistry, RootAgent, FALLBACK_CONFIDENCE,
    NO_INPUT_CONFIDENCE, NO_INPUT_TEXT, STATIC_FALLBACK_CONFIDENCE,
};

/// Completion service answering by call site.
///
/// `None` makes that call site fail.
struct Llm {
    classification: Option<String>,
    summary: Option<String>,
    reply: Option<String>,
    calls: AtomicUsize,
    user_prompts: Mutex<Vec<String>>,
}

impl Llm {
    fn new(classification: Option<&str>, reply: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            classification: classification.map(String::from),
            summary: Some("User wants dinner.".to_string()),
            reply: reply.map(String::from),
            calls: AtomicUsize::new(0),
            user_prompts: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionService for Llm {
    async fn complete(&self, request: &CompletionRequest) -> concierge_agent::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.user_prompts
            .lock()
            .unwrap()
            .push(request.user_prompt.clone());

        let answer = if request.user_prompt.starts_with("Classify this user input") {
            &self.classification
        } else if request.user_prompt.starts_with("Conversation:") {
            &self.summary
        } else {
            &self.reply
        };

        answer
            .clone()
            .ok_or_else(|| AgentError::ModelInvocation("provider unavailable".into()))
    }
}

enum Behavior {
    Answer(&'static str),
    Fail,
    Panic,
}

/// Specialist with a fixed behavior that records what it was sent.
struct Specialist {
    identity: AgentIdentity,
    config: AgentConfig,
    activity: ActivityFlag,
    behavior: Behavior,
    received: Mutex<Vec<Message>>,
}

impl Specialist {
    fn new(kind: CapabilityKind, behavior: Behavior) -> Arc<Self> {
        let config = AgentConfig::new(format!("{}-agent", kind), format!("{} agent", kind.label()), kind);
        Arc::new(Self {
            identity: AgentIdentity::from_config(&config),
            config,
            activity: ActivityFlag::default(),
            behavior,
            received: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Agent for Specialist {
    fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn activity(&self) -> &ActivityFlag {
        &self.activity
    }

    fn can_handle(&self, intent: &Intent) -> bool {
        intent.primary_capability == self.kind()
    }

    async fn process(&self, message: &Message, _context: &Context) -> concierge_agent::Result<Response> {
        self.received.lock().unwrap().push(message.clone());
        match self.behavior {
            Behavior::Answer(text) => Ok(Response::new(&self.identity, text, 0.92)
                .with_actions(vec![Action::ApiCall {
                    endpoint: "/reservations".into(),
                    method: "POST".into(),
                    body: serde_json::Value::Null,
                }])),
            Behavior::Fail => Err(AgentError::processing(&self.identity.id, "booking backend down")),
            Behavior::Panic => panic!("specialist crashed"),
        }
    }

    fn capabilities(&self) -> Vec<String> {
        vec!["reservations".to_string()]
    }
}

const RESTAURANT_CLASSIFICATION: &str = r#"```json
{
  "name": "book_table",
  "confidence": 0.95,
  "primaryCapability": "RESTAURANT",
  "secondaryCapabilities": [],
  "requiresMultiple": false,
  "parameters": {"partySize": 4},
  "urgency": "medium"
}
```"#;

fn root_with(llm: Arc<Llm>, specialists: Vec<Arc<dyn Agent>>) -> RootAgent {
    let mut registry = AgentRegistry::new();
    for agent in specialists {
        registry.register(agent);
    }
    RootAgent::new(AgentConfig::root().with_retry_attempts(0), llm)
        .with_call_policy(CallPolicy::no_retry(Duration::from_secs(5)))
        .with_registry(registry)
}

fn request(root: &RootAgent, text: &str, context: Context) -> Message {
    let user = AgentIdentity::new("user-42", "User", CapabilityKind::General);
    Message::user_request(user, root.identity().clone(), "session-7", text, context)
}

/// Fields of a response that do not depend on when it was built.
fn observable(response: &Response) -> (String, String, f64, Vec<Action>) {
    (
        response.agent_id.clone(),
        response.text.clone(),
        response.confidence,
        response.actions.clone(),
    )
}

#[tokio::test]
async fn test_empty_input_makes_no_model_calls() {
    let llm = Llm::new(Some(RESTAURANT_CLASSIFICATION), Some("unused"));
    let root = root_with(llm.clone(), vec![]);

    for text in ["", "   \n"] {
        let message = request(&root, text, Context::new("user-42"));
        let response = root.process(&message, &message.payload.context).await.unwrap();

        assert_eq!(response.confidence, NO_INPUT_CONFIDENCE);
        assert_eq!(response.text, NO_INPUT_TEXT);
        assert!(response.actions.is_empty());
    }
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_query_field_is_read_when_text_absent() {
    let llm = Llm::new(None, Some("Sure."));
    let root = root_with(llm.clone(), vec![]);
    let mut message = request(&root, "", Context::new("user-42"));
    message.payload.data.remove("text");
    message
        .payload
        .data
        .insert("query".into(), serde_json::Value::String("any good food nearby?".into()));

    let response = root.process(&message, &message.payload.context).await.unwrap();

    assert_eq!(response.text, "Sure.");
    assert_eq!(llm.user_prompts.lock().unwrap().last().unwrap(), "any good food nearby?");
}

#[tokio::test]
async fn test_plumber_request_is_not_covered_by_keywords() {
    let text = "I need a plumber right now, my pipe burst";

    let intent = fallback_intent(text);
    assert_eq!(intent.primary_capability, CapabilityKind::General);
    assert_eq!(intent.urgency, Urgency::Medium);
    assert_eq!(intent.confidence, FALLBACK_CONFIDENCE);

    let llm = Llm::new(None, Some("Let me find you a plumber."));
    let root = root_with(llm, vec![]);
    let message = request(&root, text, Context::new("user-42"));
    let response = root.process(&message, &message.payload.context).await.unwrap();

    assert_eq!(response.text, "Let me find you a plumber.");
    assert_eq!(response.confidence, FALLBACK_CONFIDENCE);
    assert!(response.actions.is_empty());
}

#[tokio::test]
async fn test_delegation_returns_specialist_response_unmodified() {
    let llm = Llm::new(Some(RESTAURANT_CLASSIFICATION), Some("unused"));
    let dining = Specialist::new(CapabilityKind::Restaurant, Behavior::Answer("Table for four at 7pm."));
    let root = root_with(llm.clone(), vec![dining.clone()]);
    let message = request(&root, "Book a table for four tonight", Context::new("user-42"));

    let response = root.process(&message, &message.payload.context).await.unwrap();

    assert_eq!(response.agent_id, "restaurant-agent");
    assert_eq!(response.text, "Table for four at 7pm.");
    assert_eq!(response.confidence, 0.92);
    assert!(matches!(response.actions[0], Action::ApiCall { .. }));
    assert_eq!(llm.calls(), 1);

    let received = dining.received.lock().unwrap();
    let delegated = &received[0];
    assert_eq!(delegated.kind, MessageKind::AgentDelegation);
    assert_eq!(delegated.session_id, message.session_id);
    assert_eq!(delegated.correlation_id, message.correlation_id);
    assert_ne!(delegated.id, message.id);
    assert_eq!(delegated.from.id, "concierge-root-001");
    assert_eq!(delegated.to.id, "restaurant-agent");
    assert_eq!(delegated.payload.intent, "book_table");
    assert_eq!(delegated.payload.data["partySize"], 4);
    assert_eq!(delegated.text(), Some("Book a table for four tonight"));
}

#[tokio::test]
async fn test_failed_delegation_matches_direct_handling() {
    let text = "Book a table for four tonight";

    let baseline = {
        let root = root_with(Llm::new(Some(RESTAURANT_CLASSIFICATION), Some("Happy to help with dinner.")), vec![]);
        let message = request(&root, text, Context::new("user-42"));
        root.process(&message, &message.payload.context).await.unwrap()
    };

    for behavior in [Behavior::Fail, Behavior::Panic] {
        let dining = Specialist::new(CapabilityKind::Restaurant, behavior);
        let root = root_with(
            Llm::new(Some(RESTAURANT_CLASSIFICATION), Some("Happy to help with dinner.")),
            vec![dining.clone()],
        );
        let message = request(&root, text, Context::new("user-42"));

        let response = root.process(&message, &message.payload.context).await.unwrap();

        assert_eq!(dining.received.lock().unwrap().len(), 1);
        assert_eq!(observable(&response), observable(&baseline));
        assert!(!response.is_escalation());
    }

    assert_eq!(baseline.agent_id, "concierge-root-001");
    assert_eq!(baseline.confidence, 0.95);
    assert!(matches!(
        baseline.actions.as_slice(),
        [Action::Redirect { capability_kind: CapabilityKind::Restaurant, .. }]
    ));
}

#[tokio::test]
async fn test_inactive_specialist_is_skipped() {
    let dining = Specialist::new(CapabilityKind::Restaurant, Behavior::Answer("unreachable"));
    dining.shutdown().await.unwrap();
    let root = root_with(
        Llm::new(Some(RESTAURANT_CLASSIFICATION), Some("I'll help directly.")),
        vec![dining.clone()],
    );
    let message = request(&root, "Book a table", Context::new("user-42"));

    let response = root.process(&message, &message.payload.context).await.unwrap();

    assert_eq!(response.text, "I'll help directly.");
    assert!(dining.received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_total_model_outage_uses_static_reply() {
    let llm = Llm::new(None, None);
    let root = root_with(llm.clone(), vec![]);
    let message = request(&root, "Any good restaurant nearby?", Context::new("user-42"));

    let response = root.process(&message, &message.payload.context).await.unwrap();

    assert_eq!(response.text, static_fallback_text(CapabilityKind::Restaurant));
    assert_eq!(response.confidence, STATIC_FALLBACK_CONFIDENCE);
    assert!(response.actions.is_empty());
    assert!(!response.is_escalation());
    assert_eq!(llm.calls(), 2);
}

/// Completion service that never answers.
#[derive(Default)]
struct Hanging {
    calls: AtomicUsize,
}

#[async_trait]
impl CompletionService for Hanging {
    async fn complete(&self, _request: &CompletionRequest) -> concierge_agent::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn test_hung_model_times_out_to_static_reply() {
    let llm = Arc::new(Hanging::default());
    let root = RootAgent::new(AgentConfig::root(), llm.clone())
        .with_call_policy(CallPolicy::no_retry(Duration::from_secs(5)));
    let message = request(&root, "Any good restaurant nearby?", Context::new("user-42"));

    let started = tokio::time::Instant::now();
    let response = root.process(&message, &message.payload.context).await.unwrap();

    assert_eq!(response.text, static_fallback_text(CapabilityKind::Restaurant));
    assert_eq!(response.confidence, STATIC_FALLBACK_CONFIDENCE);
    assert!(!response.is_escalation());
    assert_eq!(llm.calls.load(Ordering::SeqCst), 2);
    assert!(started.elapsed() >= Duration::from_secs(10));
}

#[tokio::test]
async fn test_history_is_summarized_for_direct_reply() {
    let llm = Llm::new(None, Some("Noted."));
    let root = root_with(llm.clone(), vec![]);
    let mut context = Context::new("user-42");
    context.push_user_message("I'd like Italian");
    context.push_user_message("Somewhere downtown");

    let message = request(&root, "hello again", context);
    let response = root.process(&message, &message.payload.context).await.unwrap();

    assert_eq!(response.text, "Noted.");
    assert_eq!(llm.calls(), 3);

    let prompts = llm.user_prompts.lock().unwrap();
    assert!(prompts[0].contains("Recent conversation context:\n1. \"I'd like Italian\""));
    assert!(prompts[1].starts_with("Conversation:\nUser: I'd like Italian"));
    assert_eq!(prompts[2], "hello again");
}

#[tokio::test]
async fn test_invalid_message_is_escalated() {
    let llm = Llm::new(Some(RESTAURANT_CLASSIFICATION), Some("unused"));
    let root = root_with(llm.clone(), vec![]);
    let mut message = request(&root, "hi", Context::new("user-42"));
    message.from.id.clear();

    let response = root.process(&message, &message.payload.context).await.unwrap();

    assert!(response.is_escalation());
    assert_eq!(response.confidence, 0.0);
    assert_eq!(
        response.actions,
        vec![Action::Escalate {
            error: "invalid message: missing sender or recipient".into(),
            context: "validate".into(),
        }]
    );
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_root_status_is_idempotent() {
    let root = root_with(Llm::new(None, None), vec![]);

    assert_eq!(root.capabilities(), root.capabilities());
    assert!(root.capabilities().contains(&"multi_agent_coordination".to_string()));
    assert_eq!(root.status(), root.status());
    assert_eq!(root.kind(), CapabilityKind::Root);
}
