// app/src/errors.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use stockroom::CatalogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error(transparent)]
  Catalog(#[from] CatalogError),

  #[error("Bad Request: {0}")]
  BadRequest(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

// Allow anyhow::Error to be converted into AppError::Internal for convenience in handlers
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    AppError::Internal(err.to_string())
  }
}

impl From<actix_multipart::MultipartError> for AppError {
  fn from(err: actix_multipart::MultipartError) -> Self {
    AppError::BadRequest(format!("Malformed multipart body: {}", err))
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Catalog(err) => match err {
        CatalogError::Unauthenticated | CatalogError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        // Never 403: a foreign product is indistinguishable from a missing one.
        CatalogError::NotFound { .. } => StatusCode::NOT_FOUND,
        CatalogError::Validation(_)
        | CatalogError::MissingColumns { .. }
        | CatalogError::UnreadableUpload(_)
        | CatalogError::ImportAborted { .. } => StatusCode::BAD_REQUEST,
        CatalogError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
      },
      AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      // Log the full error when it's turned into a response; the client gets a generic body.
      tracing::error!(application_error = %self, "Responding with server error");
      return HttpResponse::build(status).json(json!({"error": "An internal error occurred"}));
    }
    tracing::debug!(application_error = %self, status = status.as_u16(), "Responding with client error");

    let body = match self {
      AppError::Catalog(CatalogError::Validation(errors)) => {
        json!({"error": "Validation failed", "details": errors})
      }
      AppError::Catalog(CatalogError::MissingColumns { columns }) => {
        json!({"error": self.to_string(), "details": {"missing_columns": columns}})
      }
      AppError::Catalog(CatalogError::ImportAborted { error_count, message }) => {
        json!({"error": message, "details": {"error_count": error_count}})
      }
      other => json!({"error": other.to_string()}),
    };
    HttpResponse::build(status).json(body)
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn foreign_products_map_to_404() {
    let err = AppError::from(CatalogError::NotFound { id: 4 });
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
  }

  #[test]
  fn store_failures_are_opaque_500s() {
    let err = AppError::from(CatalogError::from(anyhow::anyhow!("connection reset")));
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.error_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
