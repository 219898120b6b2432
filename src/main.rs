//! ILR Reverse Proxy
//!
//! Sends each request to one of two Drupal origins based on its path.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                REVERSE PROXY                 │
//!                     │                                              │
//!   Client Request    │  ┌────────┐    ┌─────────┐    ┌──────────┐   │
//!   ──────────────────┼─▶│  http  │───▶│ routing │───▶│ upstream │───┼──▶ Drupal Latest
//!                     │  │ server │    │ (path,  │    │  client  │   │
//!                     │  └────────┘    │ referer)│    └──────────┘───┼──▶ Drupal Legacy
//!   Client Response   │       ▲        └─────────┘          │        │
//!   ◀─────────────────┼───────┴── response (X-ILR-Proxy-Source) ◀───┘ │
//!                     │                                              │
//!                     │  config (env, .env, profile, rules file)     │
//!                     │  lifecycle (startup, signals, shutdown)      │
//!                     │  observability (tracing)                     │
//!                     └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use ilr_reverse_proxy::config::loader::{load_dotenv, observability_from};
use ilr_reverse_proxy::config::{load_from_env, LoadOptions};
use ilr_reverse_proxy::lifecycle::{signals, startup, Shutdown};
use ilr_reverse_proxy::observability::logging;
use ilr_reverse_proxy::routing::Profile;

#[derive(Parser)]
#[command(name = "ilr-reverse-proxy")]
#[command(about = "Path-routing reverse proxy for the ILR Drupal sites", long_about = None)]
#[command(version)]
struct Cli {
    /// Built-in routing profile
    #[arg(long, env = "PROXY_PROFILE", value_enum, default_value_t = Profile::default())]
    profile: Profile,

    /// TOML rules file replacing the profile's route table
    #[arg(long, env = "PROXY_RULES")]
    rules: Option<PathBuf>,

    /// Load and validate configuration, then exit without serving
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env may carry PROXY_PROFILE and LOG_FORMAT, so it goes first.
    let dotenv = load_dotenv();
    let cli = Cli::parse();

    let observability = observability_from(|key| std::env::var(key).ok());
    if let Err(e) = logging::init(&observability) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match dotenv {
        Ok(Some(path)) => tracing::debug!(path = %path.display(), "Loaded .env"),
        Ok(None) => {}
        Err(e) => {
            tracing::error!(error = %e, "Configuration error");
            return ExitCode::FAILURE;
        }
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ilr-reverse-proxy starting");

    let options = LoadOptions {
        profile: cli.profile,
        rules: cli.rules,
    };

    let config = match load_from_env(&options) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Configuration error");
            return ExitCode::FAILURE;
        }
    };

    if cli.check {
        startup::log_config(&config);
        tracing::info!("Configuration OK");
        return ExitCode::SUCCESS;
    }

    let shutdown = Shutdown::new();
    let _signals = signals::spawn_signal_listener(shutdown.clone());

    if let Err(e) = startup::run(config, shutdown).await {
        tracing::error!(error = %e, "Proxy failed");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
