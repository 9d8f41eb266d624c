use anyhow::Context;
use clap::Parser;
use myflix_client::cli::{self, Cli};
use myflix_client::{ApiClient, Config, SessionStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (from repo root)
    dotenvy::from_filename("../../.env").ok();
    dotenvy::dotenv().ok();

    // Initialize tracing; stdout belongs to the views
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("myflix_client=info,myflix=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let session = SessionStore::open(&config.session_path).with_context(|| {
        format!("failed to open session file {}", config.session_path.display())
    })?;
    tracing::debug!("Using API at {}", config.api_url);

    let client = ApiClient::new(&config, session)?;
    cli::run(cli.command, &client).await
}
