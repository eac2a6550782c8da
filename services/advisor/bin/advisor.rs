//! Main Entrypoint for the Donation Advisor
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment and command line.
//! 2. Initializing logging on stderr.
//! 3. Building the text-generation client.
//! 4. Serving one terminal session on stdin/stdout.
//!
//! Missing configuration or an empty reference list stops the process before
//! the login page is shown.

use advisor_service::{
    app,
    build_client,
    config::Config,
    terminal::{LineInput, TerminalSurface},
};
use anyhow::Context;
use clap::Parser;
use std::{path::PathBuf, time::Duration};
use tokio::io::BufReader;
use tracing::info;

/// Ask whether a cross-border donation earns a tax break.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Chat model to use. Overrides CHAT_MODEL.
    #[arg(long)]
    model: Option<String>,

    /// Delay between revealed words, in milliseconds. Overrides TYPING_DELAY_MS.
    #[arg(long)]
    typing_delay_ms: Option<u64>,

    /// Newline-separated list of selectable names. Overrides REFERENCE_LIST_PATH.
    #[arg(long)]
    reference_list: Option<PathBuf>,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(model) = self.model {
            config.chat_model = model;
        }
        if let Some(ms) = self.typing_delay_ms {
            config.typing_delay = Duration::from_millis(ms);
        }
        if let Some(path) = self.reference_list {
            config.reference_list_path = Some(path);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // --- 1. Load Configuration ---
    let mut config = Config::from_env().context("Failed to load configuration")?;
    cli.apply(&mut config);

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();
    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        timeout_secs = config.request_timeout.as_secs(),
        "Configuration loaded."
    );

    // --- 3. Initialize the LLM client ---
    let client = build_client(&config).context("Failed to build LLM client")?;

    // --- 4. Serve the session ---
    let mut input = LineInput::new(BufReader::new(tokio::io::stdin()));
    let mut surface = TerminalSurface::new(std::io::stdout());
    app::start(&config, client, &mut input, &mut surface).await?;

    info!("Session has ended.");
    Ok(())
}
