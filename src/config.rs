use crate::llm::LlmSettings;
use clap::{Parser, Subcommand};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;

/// Config file picked up from the working directory when none is given.
const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    pub config: Option<String>,

    /// Port the service listens on
    #[arg(long, env = "PORT", global = true)]
    pub port: Option<u16>,

    /// Enable rate limiting of the send route
    #[arg(long, env = "RATE_LIMIT_ENABLED", global = true)]
    pub rate_limit_enabled: Option<bool>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the chat service
    Serve,
    /// Open the interactive chat client
    Chat {
        /// Base URL of the chat service
        #[arg(long)]
        base_url: Option<String>,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub resilience: ResilienceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResilienceConfig {
    pub rate_limit_enabled: bool,
    pub send_requests_per_minute: u32,
}

impl AppConfig {
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    /// Layer defaults, config file, `RAG_*` environment and CLI flags.
    ///
    /// Priority: CLI flag > CLI env var > `RAG_*` env > config file > defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.port", 8000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("client.base_url", "http://127.0.0.1:8000")?
            .set_default("resilience.rate_limit_enabled", true)?
            .set_default("resilience.send_requests_per_minute", 8)?;

        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                builder.add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml))
            }
            None => builder,
        };

        // E.g. RAG_SERVER__PORT=9000
        builder = builder.add_source(
            Environment::with_prefix("RAG")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(rl) = cli.rate_limit_enabled {
            builder = builder.set_override("resilience.rate_limit_enabled", rl)?;
        }
        if let Command::Chat {
            base_url: Some(url),
        } = &cli.command
        {
            builder = builder.set_override("client.base_url", url.as_str())?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}

/// Read the answer model's settings from `LLM_*` environment variables.
pub fn load_llm_settings() -> Result<LlmSettings, String> {
    let base_url = std::env::var("LLM_BASE_URL")
        .map_err(|_| "Missing required env var: LLM_BASE_URL".to_string())?;
    if base_url.trim().is_empty() {
        return Err("LLM_BASE_URL cannot be empty".to_string());
    }

    let model = std::env::var("LLM_MODEL")
        .map_err(|_| "Missing required env var: LLM_MODEL".to_string())?;
    if model.trim().is_empty() {
        return Err("LLM_MODEL cannot be empty".to_string());
    }

    let api_key = std::env::var("LLM_API_KEY")
        .ok()
        .filter(|s| !s.trim().is_empty());

    let temperature = match std::env::var("LLM_TEMPERATURE") {
        Ok(raw) => raw
            .trim()
            .parse::<f32>()
            .map_err(|e| format!("Invalid LLM_TEMPERATURE '{raw}': {e}"))?,
        Err(_) => 0.0,
    };

    Ok(LlmSettings {
        base_url,
        api_key,
        model,
        temperature,
    })
}
