use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use whatsapp_mcp::tools::whatsapp;
use whatsapp_mcp::{serve_stdio, Config, WhatsAppClient};

#[derive(Parser)]
#[command(name = "whatsapp-mcp", about = "MCP server for the Netcore WhatsApp Business API")]
struct Cli {
    /// Log a verbose startup line
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // stdout is the protocol channel; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    if cli.debug {
        info!(base_url = %config.base_url, "debug mode enabled");
    }

    let client = Arc::new(WhatsAppClient::new(config));
    let registry = whatsapp::registry(client);

    info!(tools = registry.len(), "MCP server initialized");
    if let Err(e) = serve_stdio(registry).await {
        error!(error = %e, "fatal error in MCP server");
        std::process::exit(1);
    }
}
