use std::sync::Arc;

use anyhow::Context;
use clap::{Args, ValueEnum};

use crate::auth::InMemoryUsers;
use crate::config::{self, AppConfig};
use crate::database::fixtures::sample_cash_cards;
use crate::database::{DatabaseManager, MemoryStore, PgStore, RecordStore};
use crate::server;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Memory,
    Postgres,
}

impl StoreKind {
    /// Postgres when a database URL is configured, memory otherwise
    pub fn default_for(config: &AppConfig) -> Self {
        if config.database.url.is_some() {
            StoreKind::Postgres
        } else {
            StoreKind::Memory
        }
    }
}

#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    #[arg(long, value_enum, help = "Record store backend")]
    pub store: Option<StoreKind>,

    #[arg(long, help = "Port to listen on (overrides CASHCARD_PORT)")]
    pub port: Option<u16>,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let config = config::config();
    tracing::info!("Starting Cash Card API in {:?} mode", config.environment);

    let store = build_store(args.store.unwrap_or_else(|| StoreKind::default_for(config)), config).await?;

    let specs = config.security.users.clone();
    let cost = config.security.bcrypt_cost;
    let users = tokio::task::spawn_blocking(move || InMemoryUsers::from_specs(&specs, cost))
        .await
        .context("user setup task failed")??;
    if users.is_empty() {
        tracing::warn!("No users configured; every /cashcards request will be rejected");
    }

    let state = AppState::new(store, Arc::new(users), config);
    let app = server::app(state, config);

    let bind_addr = format!("{}:{}", config.server.host, args.port.unwrap_or(config.server.port));
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Cash Card API listening on http://{}", bind_addr);
    server::serve(listener, app).await?;
    Ok(())
}

async fn build_store(kind: StoreKind, config: &AppConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    match kind {
        StoreKind::Memory => {
            let store = if crate::is_development!() {
                tracing::info!("Using in-memory store with sample cards");
                MemoryStore::with_cards(sample_cash_cards())
            } else {
                tracing::info!("Using empty in-memory store");
                MemoryStore::new()
            };
            Ok(Arc::new(store))
        }
        StoreKind::Postgres => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to DATABASE_URL")?;
            DatabaseManager::ensure_schema(&pool).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}
