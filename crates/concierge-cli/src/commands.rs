//! Command handlers.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;
use uuid::Uuid;

use concierge_agent::{Action, Agent, AgentIdentity, CapabilityKind, Context, Message, Response};
use concierge_orchestrator::RootAgent;

use crate::cli::Commands;
use crate::error::Result;

/// Execute a command against a configured root agent.
pub fn execute(command: Commands, root: &RootAgent) -> Result<()> {
    // Create tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    match command {
        Commands::Ask {
            text,
            user,
            session,
            json,
        } => rt.block_on(handle_ask(root, &text, &user, session, json)),
        Commands::Classify { text } => rt.block_on(handle_classify(root, &text)),
        Commands::Capabilities => handle_capabilities(root),
        Commands::Status => handle_status(root),
        Commands::Chat { user } => handle_chat(root, &rt, &user),
    }
}

fn user_identity(user: &str) -> AgentIdentity {
    AgentIdentity::new(user, user, CapabilityKind::General)
}

async fn handle_ask(
    root: &RootAgent,
    text: &str,
    user: &str,
    session: Option<String>,
    json: bool,
) -> Result<()> {
    let session = session.unwrap_or_else(|| Uuid::new_v4().to_string());
    let context = Context::new(user);
    let message = Message::user_request(
        user_identity(user),
        root.identity().clone(),
        session,
        text,
        context.clone(),
    );

    let response = root.process(&message, &context).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }
    Ok(())
}

async fn handle_classify(root: &RootAgent, text: &str) -> Result<()> {
    let intent = root.classifier().classify(text, &Context::anonymous()).await;
    println!("{}", serde_json::to_string_pretty(&intent)?);
    Ok(())
}

fn handle_capabilities(root: &RootAgent) -> Result<()> {
    println!("{} ({})", root.identity().name, root.kind().label());
    println!("=========================\n");

    for capability in root.capabilities() {
        println!("  - {}", capability);
    }

    println!("\nSpecialists:");
    if root.registry().is_empty() {
        println!("  (none registered, all requests are handled directly)");
    }
    for identity in root.registry().identities() {
        println!(
            "  {:<14} {} ({})",
            identity.capability_kind.label(),
            identity.name,
            identity.id
        );
    }
    Ok(())
}

fn handle_status(root: &RootAgent) -> Result<()> {
    print!("{}", serde_yaml::to_string(&root.status())?);
    Ok(())
}

fn handle_chat(root: &RootAgent, rt: &tokio::runtime::Runtime, user: &str) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    let session = Uuid::new_v4().to_string();
    let mut context = Context::new(user);

    println!("Chatting with {}. Type 'quit' or 'exit' to leave.\n", root.identity().name);

    loop {
        let line = match editor.readline("You: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "exit" {
            break;
        }
        let _ = editor.add_history_entry(input);

        let message = Message::user_request(
            user_identity(user),
            root.identity().clone(),
            session.as_str(),
            input,
            context.clone(),
        );
        let response = rt.block_on(root.process(&message, &context))?;
        debug!(response_id = %response.id, confidence = response.confidence, "Turn complete");

        println!();
        print_response(&response);
        println!();

        context.push_user_message(input);
    }

    println!("Goodbye!");
    Ok(())
}

fn print_response(response: &Response) {
    println!("{}", response.text);

    for action in &response.actions {
        match action {
            Action::Redirect { capability_kind, .. } => {
                println!("  -> suggested specialist: {}", capability_kind.label());
            }
            Action::Workflow {
                suggested_questions,
                ..
            } => {
                for question in suggested_questions {
                    println!("  ? {}", question);
                }
            }
            Action::ApiCall { method, endpoint, .. } => {
                println!("  -> {} {}", method, endpoint);
            }
            Action::Escalate { error, context } => {
                eprintln!("  ! {} failed: {}", context, error);
            }
        }
    }
}
