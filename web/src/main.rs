mod aggregator;
mod config;
mod domains;
mod error;
mod handler;
mod http;
mod render;
mod repositories;
mod server;

use std::{process, sync::Arc};

use aggregator::Aggregator;
use crate::config::{Config, ConfigStore};
use error::StartupError;
use repositories::{memory::MemoryGameRepository, sql::SqlGameRepository, GameRepository};
use server::Server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        tracing::error!(%err, "server failed");
        process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = Config::load()?;

    let repository: Arc<dyn GameRepository + Send + Sync> = match config.store {
        ConfigStore::Postgres => Arc::new(SqlGameRepository::connect(&config.database)?),
        ConfigStore::Memory => Arc::new(MemoryGameRepository::default()),
    };
    tracing::info!(store = ?config.store, "game store ready");

    let state = AppState {
        aggregator: Aggregator::new(repository),
    };

    let server = Server::new(state, handler::route_request, config.idle_timeout());
    server.bind(config.bind.as_str()).await?;

    Ok(())
}

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Aggregator,
}
