// app/src/lib.rs

//! HTTP front end for the stockroom catalog: PostgreSQL stores, local image
//! storage and the actix-web JSON API.

pub mod config;
pub mod db;
pub mod errors;
pub mod services;
pub mod state;
pub mod web;

pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use state::AppState;
pub use web::configure_app_routes;
