// app/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use std::sync::Arc;
use stockroom_app::db::{self, PgIdentityProvider, PgProductStore};
use stockroom_app::services::LocalImageStore;
use stockroom_app::{configure_app_routes, AppConfig, AppState};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
  tracing::error!(error = %err, "{}", context);
  std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting stockroom server...");

  let app_config =
    Arc::new(AppConfig::from_env().map_err(|e| startup_error("Failed to load application configuration", e))?);

  let pool = db::connect(&app_config)
    .await
    .map_err(|e| startup_error("Failed to prepare the database", e))?;

  tokio::fs::create_dir_all(&app_config.media_root)
    .await
    .map_err(|e| startup_error("Failed to create the media root", e))?;

  let app_state = AppState::assemble(
    app_config.clone(),
    Arc::new(PgProductStore::new(pool.clone())),
    Arc::new(LocalImageStore::new(app_config.media_root.clone())),
    Arc::new(PgIdentityProvider::new(pool, app_config.session_ttl)),
  );

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
