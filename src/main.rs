mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::Commands;
use liftlog_lib::config::{get_config_path, load_or_create_config};
use liftlog_lib::{ApiClient, ClientError, Navigator, SessionEventBus, SessionRedirector, UserStore};

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(about = "Command-line client for the liftlog training tracker")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short = 'c', long, global = true, env = "LIFTLOG_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Reports redirects to the login route on the terminal
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, path: &str) {
        warn!(path, "Session ended, sign in again with `liftlog login`");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    let env_file_path = dotenvy::dotenv().ok();

    // Initialize the tracing subscriber for structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                "liftlog_lib=debug,liftlog=debug,warn".into()
            } else {
                "liftlog_lib=info,liftlog=info,warn".into()
            }
        }))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    match env_file_path {
        Some(path) => debug!("Loaded environment variables from {}", path.display()),
        None => debug!("No .env file found. Using existing environment variables."),
    };

    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(get_config_path);
    let mut config = load_or_create_config(&config_path)
        .await
        .with_context(|| format!("failed to load configuration from {}", config_path.display()))?;
    if let Some(api_url) = cli.api_url {
        config.api_base_url = api_url;
    }
    info!(api = %config.base_url(), "liftlog client starting");

    let events = SessionEventBus::default();
    let redirector = SessionRedirector::spawn(&events, Arc::new(TerminalNavigator), config.login_path.clone());

    let client = ApiClient::connect(&config, events).await?;
    let users = UserStore::new(client.clone());

    let result = cli.command.execute(client, &users).await;
    redirector.abort();

    if let Err(e) = &result {
        if let Some(ClientError::SessionExpired { .. }) = e.downcast_ref::<ClientError>() {
            eprintln!("Your session has expired. Run `liftlog login` to sign in again.");
        }
    }
    result
}
