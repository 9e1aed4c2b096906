//! Entry point: load config, wire dependencies, and run the server.

use devlink_auth::auth::TokenIssuer;
use devlink_auth::config::Config;
use devlink_auth::db::{self, AccountStore, MemoryAccountStore, PgAccountStore};
use devlink_auth::{create_app, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let accounts: Arc<dyn AccountStore> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            Arc::new(PgAccountStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; accounts are kept in memory");
            Arc::new(MemoryAccountStore::new())
        }
    };
    let tokens = TokenIssuer::new(&config.jwt_secret, config.token_ttl)
        .map_err(|e| anyhow::anyhow!("token issuer: {}", e))?;

    let app = create_app(AppState::new(accounts, tokens));

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
