// core/src/error.rs
use anyhow::Error as AnyhowError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A single failed field constraint, e.g. `price: price must be ≥ 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field: String,
  pub message: String,
}

/// Structured list of field errors produced by the pure validation functions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
  pub fn new() -> Self {
    Self(Vec::new())
  }

  pub fn single(field: &str, message: impl Into<String>) -> Self {
    let mut errors = Self::new();
    errors.add(field, message);
    errors
  }

  pub fn add(&mut self, field: &str, message: impl Into<String>) {
    self.0.push(FieldError {
      field: field.to_string(),
      message: message.into(),
    });
  }

  pub fn extend(&mut self, other: ValidationErrors) {
    self.0.extend(other.0);
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
    self.0.iter()
  }

  /// Messages recorded against `field`, in insertion order.
  pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    self.0.iter().filter(move |e| e.field == field).map(|e| e.message.as_str())
  }

  /// `Ok(value)` when no error was recorded.
  pub fn into_result<T>(self, value: T) -> Result<T, Self> {
    if self.is_empty() {
      Ok(value)
    } else {
      Err(self)
    }
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let joined: Vec<String> = self.0.iter().map(|e| format!("{}: {}", e.field, e.message)).collect();
    f.write_str(&joined.join("; "))
  }
}

#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("Authentication required")]
  Unauthenticated,

  #[error("Invalid username or password")]
  InvalidCredentials,

  #[error("Product {id} not found")]
  NotFound { id: i64 },

  #[error("Validation failed: {0}")]
  Validation(ValidationErrors),

  #[error("Missing required columns: {}", columns.join(", "))]
  MissingColumns { columns: Vec<String> },

  #[error("Unreadable upload: {0}")]
  UnreadableUpload(String),

  #[error("{message}")]
  ImportAborted { error_count: usize, message: String },

  #[error("Record store failure. Source: {source}")]
  Store {
    #[source]
    source: AnyhowError,
  },
}

impl From<ValidationErrors> for CatalogError {
  fn from(errors: ValidationErrors) -> Self {
    CatalogError::Validation(errors)
  }
}

// Backend implementations (sqlx, filesystem, ...) hand their failures over as anyhow errors.
impl From<AnyhowError> for CatalogError {
  fn from(err: AnyhowError) -> Self {
    CatalogError::Store { source: err }
  }
}

pub type CatalogResult<T, E = CatalogError> = std::result::Result<T, E>;
