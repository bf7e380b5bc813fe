use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coachdiary::config::Config;
use coachdiary::repositories::{TokenRepository, UserRepository};
use coachdiary::services::IdentityProvider;
use coachdiary::{db, migrations, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coachdiary=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing::info!("Connecting to database: {}", config.database_url);
    let pool = db::create_pool(&config.database_url)?;

    migrations::run_migrations(&pool)?;

    let identity = IdentityProvider::new(
        UserRepository::new(pool.clone()),
        TokenRepository::new(pool.clone(), config.token_lifetime_days),
    );
    let purged = identity.purge_expired().await?;
    if purged > 0 {
        tracing::info!("Removed {} expired tokens", purged);
    }

    let app = routes::create_app(pool, config.token_lifetime_days);

    let addr = config.server_addr();
    tracing::info!("Starting server at http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
