use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leave_ledger_backend::{
    config::{Config, StorageBackend},
    db::connection::{create_pool, run_migrations, DbPool},
    handlers,
    repositories::{InMemoryLedgerStore, LedgerStore, PgLedgerStore},
    state::AppState,
};

fn mask_database_url(url: &str) -> String {
    match url.split_once('@') {
        Some((_, host)) => format!("***@{}", host),
        None => "<unparsed>".into(),
    }
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn LedgerStore>> {
    match (config.storage_backend, config.database_url.as_deref()) {
        (StorageBackend::Postgres, Some(url)) => {
            let pool: DbPool = create_pool(url, config.database_max_connections).await?;
            run_migrations(&pool).await?;
            Ok(Arc::new(PgLedgerStore::new(pool)))
        }
        (StorageBackend::Postgres, None) => {
            anyhow::bail!("DATABASE_URL is required when STORAGE_BACKEND=postgres")
        }
        (StorageBackend::Memory, _) => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(InMemoryLedgerStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leave_ledger_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        storage_backend = ?config.storage_backend,
        database_url = %config
            .database_url
            .as_deref()
            .map(mask_database_url)
            .unwrap_or_else(|| "<unset>".into()),
        time_zone = %config.time_zone,
        day_count_policy = %config.day_count_policy,
        max_bulk_items = config.max_bulk_items,
        "Loaded configuration from environment/.env"
    );

    let store = build_store(&config).await?;
    let addr = config.server_addr;
    let app = handlers::router(AppState::from_store(store, config));

    tracing::info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
