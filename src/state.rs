use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;
use crate::services::UserService;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// SeaORM database connection (primary for queries)
    pub db: DatabaseConnection,
    /// SQLx pool for migrations and aggregate reporting queries
    pub pg_pool: PgPool,
    pub config: Config,
}

impl AppState {
    /// Connect to PostgreSQL, run migrations and seed the bootstrap admin
    pub async fn new(config: Config) -> Result<Self, AppStateError> {
        let pg_pool = pg_pool_options(&config)
            .connect(&config.database_url)
            .await
            .map_err(|e| AppStateError::Postgres(e.to_string()))?;

        sqlx::migrate!("./migrations")
            .run(&pg_pool)
            .await
            .map_err(|e| AppStateError::Migration(e.to_string()))?;

        let mut opt = ConnectOptions::new(&config.database_url);
        opt.max_connections(config.db_max_connections)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(true);

        let db = Database::connect(opt)
            .await
            .map_err(|e| AppStateError::Postgres(e.to_string()))?;

        if let Some(admin) = &config.bootstrap_admin {
            UserService::ensure_bootstrap_admin(&db, admin)
                .await
                .map_err(|e| AppStateError::Bootstrap(e.to_string()))?;
        }

        Ok(Self {
            db,
            pg_pool,
            config,
        })
    }
}

/// The reporting pool shares the SeaORM connection limit
fn pg_pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(10))
}

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("PostgreSQL connection error: {0}")]
    Postgres(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Bootstrap admin error: {0}")]
    Bootstrap(String),
}
