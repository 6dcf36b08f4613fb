use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use todo_app::config::{DatabaseConfig, ImageCacheConfig, LISTEN_ADDR};
use todo_app::engine::scheduler::join_scheduler;
use todo_app::engine::service::ImageService;
use todo_app::logging::init_tracing;
use todo_app::server::handler::{app, AppState};
use todo_app::todo::store::PgTodoStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine; the variables may come from the environment.
    let _ = dotenvy::dotenv();
    init_tracing();

    let db_config = DatabaseConfig::from_env();
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_with(db_config.connect_options())
        .await
        .with_context(|| format!("failed to connect to postgres at {:?}", db_config.host))?;
    let store = Arc::new(PgTodoStore::new(pool));
    store
        .init_schema()
        .await
        .context("failed to create todo table")?;

    let images = Arc::new(
        ImageService::http(ImageCacheConfig::default()).context("failed to build image client")?,
    );
    if let Err(e) = images.ensure_fresh().await {
        warn!("Initial cache setup failed: {}", e);
    }

    let shutdown_token = CancellationToken::new();
    let scheduler = images.spawn_scheduler(shutdown_token.clone());

    let listener = TcpListener::bind(LISTEN_ADDR)
        .await
        .with_context(|| format!("failed to bind {}", LISTEN_ADDR))?;
    info!("Server started on {}", listener.local_addr()?);

    let state = AppState::new(images, store.clone());
    let token = shutdown_token.clone();
    axum::serve(listener, app(state))
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            token.cancel();
        })
        .await
        .context("server error")?;

    shutdown_token.cancel();
    join_scheduler(scheduler).await;
    store.close().await;
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
