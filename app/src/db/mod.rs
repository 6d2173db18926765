// app/src/db/mod.rs

//! PostgreSQL-backed implementations of the catalog's store and identity seams.

pub mod identity;
pub mod products;

pub use identity::PgIdentityProvider;
pub use products::PgProductStore;

use crate::config::AppConfig;
use crate::errors::{AppError, Result as AppResult};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use stockroom::CatalogError;

/// Opens the pool and, when configured, applies the embedded migrations.
pub async fn connect(config: &AppConfig) -> AppResult<PgPool> {
  let pool = PgPoolOptions::new()
    .max_connections(config.db_max_connections)
    .connect(&config.database_url)
    .await?;
  tracing::info!("Successfully connected to the database.");

  if config.run_migrations {
    sqlx::migrate!("./migrations")
      .run(&pool)
      .await
      .map_err(|e| AppError::Internal(format!("Database migration failed: {}", e)))?;
    tracing::info!("Database migrations applied.");
  }
  Ok(pool)
}

/// Wraps a driver failure as an opaque store error, logging it once here.
pub(crate) fn store_error(context: &'static str, err: sqlx::Error) -> CatalogError {
  tracing::error!(error = %err, "Database error while {}.", context);
  CatalogError::from(anyhow::Error::new(err).context(context))
}
