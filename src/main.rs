// src/main.rs
use std::sync::Arc;
use std::time::Duration;

use axum_server::Handle;
use poll_backend::config::{Config, StoreBackend};
use poll_backend::store::{MemoryStore, PgStore, PollStore};
use poll_backend::{create_routes, db, PollService};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Resolves on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutting down");
    handle.graceful_shutdown(Some(Duration::from_secs(10)));
}

async fn connect_store(config: &Config) -> Result<Arc<dyn PollStore>, Box<dyn std::error::Error>> {
    match (config.backend, &config.database) {
        (StoreBackend::Postgres, Some(database)) => {
            let pool = db::create_pool(database).await?;
            info!("Connected to the database");
            db::migrate(&pool).await?;
            info!("Migrations applied");
            Ok(Arc::new(PgStore::new(pool)))
        }
        (StoreBackend::Postgres, None) => Err("postgres backend needs DATABASE_URL".into()),
        (StoreBackend::Memory, _) => {
            warn!("Using the in-memory store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok(); // Load environment variables from .env file

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "poll_backend=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env().inspect_err(|e| error!(error = %e, "invalid configuration"))?;

    let store = connect_store(&config)
        .await
        .inspect_err(|e| error!(error = %e, "failed to open the store"))?;
    let routes = create_routes(PollService::new(store));

    let addr = config.addr();
    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    info!(%addr, "Server running");
    axum_server::bind(addr)
        .handle(handle)
        .serve(routes.into_make_service())
        .await?;

    Ok(())
}
