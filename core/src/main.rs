/// tidemark client - main entry point
use std::env;
use std::sync::Arc;
use tidemark_core::cli_app::{self, TerminalView};
use tidemark_core::transport::HttpTransport;
use tidemark_core::{ChatClient, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse configuration
    let args: Vec<String> = env::args().collect();
    let config = Config::from_args(&args)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    let transport = HttpTransport::new(&config)
        .map_err(|e| anyhow::anyhow!("Transport error: {}", e))?;
    let client = Arc::new(ChatClient::new(
        config.clone(),
        Arc::new(transport),
        Arc::new(TerminalView),
    ));

    info!("Connecting to {}", config.base_url);
    cli_app::run(client, &config).await
}
