mod api;
mod chat_cmd;
mod config_cmd;
mod preview_cmd;
mod status_cmd;
mod terminal_output;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use afyabot_channels::{ChannelAdapter, WhatsAppAdapter};
use afyabot_config::{validate, BotConfig, ValidationReport};
use afyabot_logging::init_logger;

use api::AppState;

#[derive(Parser)]
#[command(name = "afyabot")]
#[command(about = "Afyabot: WhatsApp Cloud webhook for the Afyaplus health flow")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Query the health endpoint of a running server
    Status,
    /// Talk to the conversation flow in the terminal (no messages are sent)
    Chat,
    /// Print the Cloud API payload the bot would send for a message
    Preview {
        /// Message text, or a button/list reply id with --reply-id
        text: String,
        /// Treat TEXT as a reply id (kept verbatim instead of lower-cased)
        #[arg(long)]
        reply_id: bool,
        /// Recipient number placed in the payload
        #[arg(long, default_value = "255700000000")]
        to: String,
    },
    /// Show the redacted configuration and validation report
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = BotConfig::from_env();

    init_logger(
        config.server.log_dir.as_deref().map(Path::new),
        &config.server.log_level,
    );

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
            }
            run_server(config).await?;
        }
        Commands::Status => status_cmd::run(config.server.port).await?,
        Commands::Chat => chat_cmd::run()?,
        Commands::Preview { text, reply_id, to } => preview_cmd::run(&text, reply_id, &to)?,
        Commands::CheckConfig => config_cmd::run(&config)?,
    }

    Ok(())
}

async fn run_server(config: BotConfig) -> Result<()> {
    info!(
        port = config.server.port,
        bind = %config.server.bind_address,
        webhook_path = %config.server.webhook_path,
        configured = config.is_configured(),
        "Starting Afyabot webhook"
    );

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    ensure_startable(&report)?;

    let whatsapp = WhatsAppAdapter::from_config(&config.whatsapp, config.server.webhook_path.clone());
    whatsapp.start().await?;
    info!(channel = whatsapp.name(), "Registered channel adapter");

    let app_state = Arc::new(AppState {
        configured: whatsapp.is_configured(),
    });
    let app = api::build_router(app_state, whatsapp.build_router());

    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    info!(addr = %addr, "HTTP server listening");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Afyabot stopped");
    Ok(())
}

/// Refuse to serve with a config the router or the Graph client cannot run on.
fn ensure_startable(report: &ValidationReport) -> Result<()> {
    let blocking = report.startup_errors();
    if !blocking.is_empty() {
        let details: Vec<String> = blocking.iter().map(|e| e.to_string()).collect();
        bail!("refusing to start: {}", details.join("; "));
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
