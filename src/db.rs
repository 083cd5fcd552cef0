pub mod seed;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use metrics::{counter, gauge};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Pool sizing and timeouts for the SQLite store
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl DbConfig {
    /// Default pool settings for the given database URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self::from(&AppConfig {
            database_url: url.into(),
            ..AppConfig::default()
        })
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.db_idle_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
        }
    }
}

/// Opens the connection pool. The database file is created when the URL asks for `mode=rwc`.
pub async fn connect(config: &DbConfig) -> Result<DatabaseConnection, ServiceError> {
    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(false);

    gauge!("inventory_db.max_connections", config.max_connections as f64);

    let conn = Database::connect(opt).await.map_err(|e| {
        error!("Could not open product store at {}: {}", config.url, e);
        ServiceError::DatabaseError(e)
    })?;
    info!(
        max_connections = config.max_connections,
        "Product store connected"
    );
    Ok(conn)
}

/// Applies pending schema migrations.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<(), ServiceError> {
    let start = Instant::now();
    crate::migrator::Migrator::up(conn, None)
        .await
        .map_err(|e| {
            error!("Schema migration failed: {}", e);
            ServiceError::MigrationError(e.to_string())
        })?;
    info!("Schema up to date after {:?}", start.elapsed());
    Ok(())
}

/// Round-trips a ping to the store, recording its latency.
pub async fn check_connection(conn: &DatabaseConnection) -> Result<(), ServiceError> {
    let start = Instant::now();
    match conn.ping().await {
        Ok(()) => {
            let elapsed = start.elapsed();
            debug!("Store ping took {:?}", elapsed);
            gauge!("inventory_db.connection_latency", elapsed.as_millis() as f64);
            Ok(())
        }
        Err(e) => {
            counter!("inventory_db.connection_failures", 1);
            error!("Store ping failed: {}", e);
            Err(ServiceError::DatabaseError(e))
        }
    }
}

pub async fn close_pool(conn: DatabaseConnection) -> Result<(), ServiceError> {
    info!("Closing product store");
    conn.close().await.map_err(ServiceError::DatabaseError)
}
