use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use warden_daemon::{Settings, server};

/// Warden - multi-tenant object permission service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long = "config")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warden=debug,tower_http=debug")),
        )
        .init();

    let settings = Settings::load(cli.config.as_deref())?;
    server::run(settings).await
}
