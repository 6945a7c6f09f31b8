//! switchyard gateway binary

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use switchyard::config::{Config, ConfigOverrides};
use switchyard::core::Gateway;
use switchyard::server;
use switchyard::utils::logging::{LogFormat, init_logging};
use tracing::{error, info};

/// LLM request-routing gateway
#[derive(Debug, Parser)]
#[command(name = "gateway", version, about)]
struct Cli {
    /// YAML configuration file (defaults to config/gateway.yaml when present)
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long)]
    host: Option<String>,

    /// Bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// Log output format: pretty or json
    #[arg(long)]
    log_format: Option<LogFormat>,

    /// Clear the response cache and exit
    #[arg(long)]
    clear_cache: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: failed to read .env: {}", e);
        }
    }

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            // Print error using Display (not Debug) to preserve newlines
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let overrides = ConfigOverrides {
        host: cli.host,
        port: cli.port,
        log_format: cli.log_format,
    };

    let config = Config::load(cli.config.as_deref(), &overrides)
        .await
        .context("failed to load configuration")?;

    init_logging(config.logging().format, &config.logging().level);

    if cli.clear_cache {
        let gateway = Gateway::new(config).await.context("failed to initialise gateway")?;
        let cleared = gateway.clear_cache().await.context("failed to clear cache")?;
        info!(cleared, "Cache cleared");
        println!("Cleared {} cached response(s)", cleared);
        return Ok(());
    }

    server::run_server(config).await.context("gateway stopped")?;
    Ok(())
}
