//! JAAQ CLI - Command-line client for the JAAQ API
//!
//! Features:
//! - Video and collection lookup
//! - Caption inspection with time queries
//! - Stream source classification and HLS playlist summaries

use anyhow::Context;
use clap::{Parser, Subcommand};
use jaaq_core::SdkConfig;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use output::OutputFormat;

/// JAAQ CLI - API client and caption toolkit
#[derive(Parser)]
#[command(name = "jaaq")]
#[command(author = "JAAQ")]
#[command(version)]
#[command(about = "Query the JAAQ API and inspect answer videos", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    /// API key issued for your client
    #[arg(long, env = "JAAQ_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Client identifier
    #[arg(long, env = "JAAQ_CLIENT_ID", global = true)]
    client_id: Option<String>,

    /// API base URL
    #[arg(long, env = "JAAQ_API_URL", global = true)]
    base_url: Option<String>,

    /// Header carrying the API key
    #[arg(long, env = "JAAQ_API_KEY_HEADER", global = true)]
    api_key_header: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "JAAQ_TIMEOUT_MS", global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a video record
    Video {
        /// Video id
        id: String,
    },

    /// List collections
    Collections,

    /// Show a collection and its videos
    Collection {
        /// Collection id
        id: String,
    },

    /// Print the caption cues of a video
    Captions {
        /// Video id
        id: String,

        /// Only show the cue active at this time (seconds)
        #[arg(long)]
        at: Option<f64>,
    },

    /// Classify a video's media source and summarize its HLS playlist
    Inspect {
        /// Video id
        id: String,
    },
}

impl Cli {
    fn sdk_config(&self) -> anyhow::Result<SdkConfig> {
        let api_key = self
            .api_key
            .clone()
            .context("missing API key: pass --api-key or set JAAQ_API_KEY")?;
        let client_id = self
            .client_id
            .clone()
            .context("missing client id: pass --client-id or set JAAQ_CLIENT_ID")?;

        let mut config = SdkConfig::new(api_key, client_id);
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.as_str());
        }
        if let Some(header) = &self.api_key_header {
            config = config.with_api_key_header(header.as_str());
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config = config.with_timeout_ms(timeout_ms);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over --verbose
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = jaaq_core::create_client(cli.sdk_config()?)?;
    let format = cli.format;

    match cli.command {
        Commands::Video { id } => {
            commands::video(&client, &id, format).await?;
        }
        Commands::Collections => {
            commands::collections(&client, format).await?;
        }
        Commands::Collection { id } => {
            commands::collection(&client, &id, format).await?;
        }
        Commands::Captions { id, at } => {
            commands::captions(&client, &id, at, format).await?;
        }
        Commands::Inspect { id } => {
            commands::inspect(&client, &id, format).await?;
        }
    }

    Ok(())
}
