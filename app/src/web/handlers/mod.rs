// app/src/web/handlers/mod.rs

pub mod auth_handlers;
pub mod csv_handlers;
pub mod product_handlers;
