use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};

use inventory_tracker as app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = app::config::load_config().context("failed to load configuration")?;
    app::config::init_tracing(cfg.log_level(), cfg.log_json);

    let db_pool = app::db::connect(&app::db::DbConfig::from(&cfg))
        .await
        .context("failed to connect to the database")?;
    let state = app::AppState::new(Arc::new(db_pool), cfg.clone());

    // Schema first, then the starter catalog when the store is empty
    if cfg.seed_on_startup {
        let seeded = state.products.initialize().await.map_err(|e| {
            error!("Failed initializing product store: {}", e);
            e
        })?;
        if seeded > 0 {
            info!("Seeded {} products into an empty store", seeded);
        }
    } else {
        app::db::run_migrations(&state.db).await.map_err(|e| {
            error!("Failed running migrations: {}", e);
            e
        })?;
        warn!("Seeding disabled; starting with the existing catalog");
    }

    if cfg.is_production() && cfg.cors_origins().is_empty() {
        warn!("No CORS origins configured; any origin may call the API");
    }
    let router = app::build_router(state.clone());

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", cfg.host, cfg.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Inventory tracker running on http://{}", addr);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    app::db::close_pool(state.db.as_ref().clone()).await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
    info!("Shutdown signal received");
}
