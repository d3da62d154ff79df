//! # Print Estimator CLI
//!
//! Submit print orders and look at the order dashboard from the terminal.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use estimator_core::ClientConfig;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod attachment;
mod commands;

#[derive(Parser, Debug)]
#[command(name = "print-estimator", version, about = "AI print estimator client")]
struct Cli {
    /// Backend base address (overrides ESTIMATOR_API_BASE)
    #[arg(long, global = true, value_name = "URL")]
    api_base: Option<String>,

    /// Per-request timeout in seconds (overrides ESTIMATOR_TIMEOUT_SECS)
    #[arg(long, global = true, value_name = "SECS")]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit an order description and/or file and show the estimate
    Submit(commands::SubmitArgs),
    /// Show summary, status stats and recent orders
    Dashboard,
    /// Show the current status of one order
    Order {
        /// Order identifier as returned by intake
        id: String,
    },
    /// Check that the backend is reachable
    Health,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(base) = &self.api_base {
            config = config.with_base_url(base.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();
    let config = cli.client_config();
    info!(base_url = %config.base_url, "Using estimator backend");

    match cli.command {
        Commands::Submit(args) => commands::submit(config, args).await,
        Commands::Dashboard => commands::dashboard(config).await,
        Commands::Order { id } => commands::order(config, &id).await,
        Commands::Health => commands::health(config).await,
    }
}
