// app/src/services/mod.rs

pub mod auth_service;
pub mod image_storage;

pub use image_storage::LocalImageStore;
