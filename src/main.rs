//! Interactive SAMS assistant.
//!
//! Launches the tool server, connects to the model endpoint, and runs a
//! read-eval-print loop: one line of user input becomes one full turn,
//! nested tool calls included.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use sams_assistant::model::declare_tools;
use sams_assistant::{AssistantConfig, GeminiClient, McpSession, Orchestrator};

/// Logs go to stderr: our stdout is the user's terminal, and the child's
/// stdio carries the protocol.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sams_assistant=info,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "assistant.yaml".to_string());
    let config = AssistantConfig::load(Path::new(&config_path))
        .with_context(|| format!("loading '{config_path}'"))?;
    let api_key = config.resolve_api_key()?;

    let model = GeminiClient::new(&config.model.base_url, &config.model.model_name, &api_key)?;

    tracing::info!(
        command = %config.server.command,
        "starting tool server"
    );
    let session = McpSession::start("sams-tools", &config.server, config.timeouts.into())
        .await
        .context("tool server session failed to start")?;

    let declarations = declare_tools(session.catalog().tools());

    println!("--- SAMS AI Assistant ---");
    println!(
        "Connected with {} tool(s). Ask me about your assets! (type 'exit' to quit)",
        session.catalog().len()
    );

    let mut orchestrator = Orchestrator::new(model, session, declarations);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break; // stdin closed
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") {
            break;
        }

        match orchestrator.run_turn(input).await {
            Ok(answer) => println!("Assistant: {answer}"),
            Err(e) if e.session_is_dead() => {
                tracing::error!(error = %e, "tool server session is gone, exiting");
                eprintln!("The tool server is no longer available: {e}");
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "turn failed");
                eprintln!("That didn't work: {e}");
            }
        }
    }

    orchestrator.shutdown().await;
    Ok(())
}
