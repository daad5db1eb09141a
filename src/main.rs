//! termchat: minimal chat client for OpenAI-compatible completion endpoints.

mod config;
mod llm;
mod session;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::ProviderConfig;
use crate::llm::ChatClient;
use crate::session::ChatSession;

#[derive(Parser)]
#[command(name = "termchat", version, about = "Chat with a hosted LLM from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Send one hard-coded prompt and print the reply
    Demo,
    /// Interactive multi-turn chat (default)
    Chat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to warn so log lines don't interleave with the prompt.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = ProviderConfig::from_env()?;
    let client = ChatClient::new(config.base_url.clone(), config.api_key.clone());

    match cli.command.unwrap_or(Command::Chat) {
        Command::Demo => {
            let reply = session::run_demo(&client, &config.model).await?;
            println!("Response from {}: \n", config.host);
            println!("{reply}");
        }
        Command::Chat => {
            let mut session = ChatSession::new(
                Arc::new(client),
                config.model.clone(),
                session::DEFAULT_SYSTEM_PROMPT,
            );
            session::run_chat(&mut session).await?;
        }
    }

    Ok(())
}
