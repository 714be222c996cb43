use std::{net::SocketAddr, sync::Arc};

use batepapo::{
    config::Config,
    router,
    store::{SharedStore, SqliteStore, UnavailableStore},
    sweeper::Sweeper,
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "batepapo=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // the server still comes up without a store; every request then answers 500
    let store: SharedStore = match SqliteStore::connect(&config.database_url).await {
        Ok(store) => Arc::new(store),
        Err(err) => {
            tracing::error!(error = %err, url = %config.database_url, "could not open store");
            Arc::new(UnavailableStore::new(err.to_string()))
        }
    };

    let sweeper = Sweeper::new(store.clone(), config.sweep_interval, config.stale_after).spawn();

    let app = router(AppState { store });
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Running server on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "could not listen for ctrl-c");
    }
}
