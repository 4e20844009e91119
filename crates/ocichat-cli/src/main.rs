//! ocichat CLI — a line-oriented chat client that bridges an OCI Generative
//! AI model with an MCP tool server.

use anyhow::Result;
use clap::Parser;
use ocichat_config::{CliOverrides, OcichatConfig};
use ocichat_core::{ChatSession, SessionControl};
use ocichat_genai::{GenAiClient, endpoint_for_region};
use ocichat_mcp::ServerLocator;
use std::io::{self, BufRead, Write};

#[derive(Parser)]
#[command(
    name = "ocichat",
    version,
    about = "Chat with an OCI Generative AI model that can call MCP tools"
)]
struct Cli {
    /// Tool server locator: an http(s) URL or a path to a .py/.js script
    server: Option<String>,

    /// Model OCID to use
    #[arg(long)]
    model: Option<String>,

    /// OCI region of the inference endpoint
    #[arg(long)]
    region: Option<String>,

    /// Compartment OCID sent with every chat request
    #[arg(long)]
    compartment_id: Option<String>,

    /// Maximum tokens in the response
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Enable verbose/debug logging
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let Some(server) = cli.server.clone() else {
        eprintln!("Usage: ocichat <server-locator>");
        eprintln!("  <server-locator>  an http(s) URL, or a path to a .py/.js tool-server script");
        return Ok(());
    };

    // Fatal errors are reported with their diagnostic detail; the process
    // still exits 0 after cleanup.
    if let Err(e) = run(cli, &server).await {
        eprintln!("Error: {e}");
        eprintln!("{e:?}");
    }
    Ok(())
}

async fn run(cli: Cli, server: &str) -> Result<()> {
    let config = OcichatConfig::load(CliOverrides {
        region: cli.region,
        compartment_id: cli.compartment_id,
        model: cli.model,
        max_tokens: cli.max_tokens,
    })
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    let endpoint = config
        .endpoint
        .clone()
        .unwrap_or_else(|| endpoint_for_region(&config.region));
    tracing::debug!(endpoint = %endpoint, model = %config.model_id, "resolved inference endpoint");
    let llm = GenAiClient::new(endpoint, config.auth_token.clone())
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    // Locator validation happens before anything is spawned or dialed.
    let locator = ServerLocator::parse(server)?;

    let mut session = ChatSession::connect(
        &locator,
        config.mcp_timeout_ms,
        Box::new(llm),
        config.chat_settings(),
    )
    .await?;

    let tool_names: Vec<&str> = session.catalog().iter().map(|t| t.name.as_str()).collect();
    println!("Connected to server with tools: {tool_names:?}");
    println!("\nMCP Client Started!");
    println!("Type your queries or 'quit' to exit.");

    let result = chat_loop(&mut session).await;
    session.shutdown().await;
    result
}

async fn chat_loop(session: &mut ChatSession) -> Result<()> {
    let stdin = io::stdin();

    loop {
        print!("\nQuery: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF ends the session like the exit sentinel.
            println!();
            return Ok(());
        }

        match session.handle_line(&line).await {
            SessionControl::Quit => return Ok(()),
            SessionControl::Reply(transcript) => println!("\n{transcript}"),
            SessionControl::TurnFailed(e) => {
                eprintln!("\nError: {e}");
                eprintln!("{e:?}");
            }
        }
    }
}
