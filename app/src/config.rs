// app/src/config.rs

use crate::errors::{AppError, Result}; // Use AppError specific Result
use chrono::{TimeDelta, Utc};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)] // Clone is useful if parts of config are passed around
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub db_max_connections: u32,

  /// Root directory for uploaded product images.
  pub media_root: PathBuf,
  /// Lifetime of a login session (`SESSION_TTL_HOURS`).
  pub session_ttl: TimeDelta,
  /// Cap on the bytes accepted from a single multipart request.
  pub max_upload_bytes: usize,

  pub run_migrations: bool,
}

fn parse_var<T>(name: &str, raw: String) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  raw
    .trim()
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e)))
}

/// Positive, and small enough that `now + ttl` is still a representable timestamp.
fn session_ttl(hours: i64) -> Result<TimeDelta> {
  let invalid = || AppError::Config(format!("Invalid SESSION_TTL_HOURS: {} is out of range", hours));
  if hours <= 0 {
    return Err(invalid());
  }
  let ttl = TimeDelta::try_hours(hours).ok_or_else(invalid)?;
  Utc::now().checked_add_signed(ttl).ok_or_else(invalid)?;
  Ok(ttl)
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };
    let get_or = |var_name: &str, default: &str| get_env(var_name).unwrap_or_else(|_| default.to_string());

    let server_host = get_or("SERVER_HOST", "127.0.0.1");
    let server_port = parse_var("SERVER_PORT", get_or("SERVER_PORT", "8080"))?;
    let database_url = get_env("DATABASE_URL")?;
    let db_max_connections = parse_var("DB_MAX_CONNECTIONS", get_or("DB_MAX_CONNECTIONS", "5"))?;

    let media_root = PathBuf::from(get_or("MEDIA_ROOT", "./media"));
    let session_ttl = session_ttl(parse_var("SESSION_TTL_HOURS", get_or("SESSION_TTL_HOURS", "336"))?)?;
    let max_upload_bytes = parse_var("MAX_UPLOAD_BYTES", get_or("MAX_UPLOAD_BYTES", "5242880"))?;
    let run_migrations = parse_var("RUN_MIGRATIONS", get_or("RUN_MIGRATIONS", "true"))?;

    tracing::info!("Application configuration loaded successfully.");
    tracing::debug!(
      server_host = %server_host,
      server_port,
      media_root = %media_root.display(),
      session_ttl_hours = session_ttl.num_hours(),
      max_upload_bytes,
      "Loaded config details (database URL redacted)"
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      db_max_connections,
      media_root,
      session_ttl,
      max_upload_bytes,
      run_migrations,
    })
  }

  /// Settings for running without a database, e.g. in tests.
  pub fn for_tests(media_root: PathBuf) -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 0,
      database_url: String::new(),
      db_max_connections: 1,
      media_root,
      session_ttl: TimeDelta::hours(1),
      max_upload_bytes: 1024 * 1024,
      run_migrations: false,
    }
  }
}
