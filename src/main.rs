//! RAG Chat
//!
//! Entry point: `serve` runs the chat service, `chat` opens the terminal
//! client.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use rag_chat::client::Client;
use rag_chat::config::{AppConfig, Cli, Command, load_llm_settings};
use rag_chat::controller::ChatController;
use rag_chat::llm::ChatCompletionsAnswerer;
use rag_chat::server;
use rag_chat::terminal::Terminal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    // Initialize tracing (M-LOG-STRUCTURED); stderr keeps the chat view on stdout clean.
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Arc::new(AppConfig::from_cli(&cli)?);

    match cli.command {
        Command::Serve => {
            let settings = match load_llm_settings() {
                Ok(s) => s,
                Err(msg) => {
                    eprintln!("Configuration error: {msg}");
                    std::process::exit(1);
                }
            };

            info!(
                name: "llm.config.loaded",
                base_url = %settings.base_url,
                model = %settings.model,
                "LLM configuration loaded"
            );

            let answerer = Arc::new(ChatCompletionsAnswerer::new(settings));
            server::start_server(config, answerer).await
        }
        Command::Chat { .. } => {
            let client = Client::new(&config.client.base_url)?;
            info!(base_url = %client.base_url(), "Connecting to chat service");

            let mut controller = ChatController::new(client);
            let stdin = std::io::stdin();
            let mut terminal = Terminal::new(stdin.lock(), std::io::stdout());
            terminal.run(&mut controller).await
        }
    }
}
