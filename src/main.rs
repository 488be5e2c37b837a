use std::sync::Arc;

use anyhow::Result;
use sessions_api::config::ServerConfig;
use sessions_api::server;
use sessions_api::storage::InMemorySessionRepository;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    // One store instance for the process lifetime; state is gone on restart
    let repository = Arc::new(InMemorySessionRepository::new());

    server::serve(repository, &config.addr()).await
}
