// app/src/web/handlers/csv_handlers.rs

use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use stockroom::{CatalogError, CsvDocument, ImportMode, CSV_CONTENT_TYPE};
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::CurrentIdentity;
use crate::web::multipart;

const UPLOAD_FIELD: &str = "file";

fn csv_attachment(doc: CsvDocument) -> HttpResponse {
  HttpResponse::Ok()
    .content_type(CSV_CONTENT_TYPE)
    .insert_header((
      header::CONTENT_DISPOSITION,
      format!("attachment; filename=\"{}\"", doc.filename),
    ))
    .body(doc.bytes)
}

#[instrument(name = "handler::export_products", skip(app_state, identity))]
pub async fn export_handler(
  app_state: web::Data<AppState>,
  identity: CurrentIdentity,
) -> Result<HttpResponse, AppError> {
  let doc = app_state.exchange.export(&identity.0).await?;
  Ok(csv_attachment(doc))
}

#[derive(Deserialize, Debug, Default)]
pub struct TemplateQuery {
  pub sample: Option<String>,
}

#[instrument(name = "handler::csv_template", skip(app_state, identity))]
pub async fn template_handler(
  app_state: web::Data<AppState>,
  identity: CurrentIdentity,
  query: web::Query<TemplateQuery>,
) -> Result<HttpResponse, AppError> {
  let include_sample = matches!(query.sample.as_deref().map(str::trim), Some("1" | "true"));
  let doc = app_state.exchange.template(&identity.0, include_sample).await?;
  Ok(csv_attachment(doc))
}

#[instrument(name = "handler::import_products", skip(app_state, identity, payload))]
pub async fn import_handler(
  app_state: web::Data<AppState>,
  identity: CurrentIdentity,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  identity.0.require_user()?;
  let form = multipart::collect(payload, app_state.config.max_upload_bytes).await?;
  let mode = ImportMode::from_flag(form.flag("strict"));
  let file = form
    .file(UPLOAD_FIELD)
    .ok_or_else(|| CatalogError::UnreadableUpload("no CSV file was submitted".to_string()))?;

  let summary = app_state.exchange.import(&identity.0, &file.bytes, mode).await?;
  Ok(HttpResponse::Ok().json(json!({
    "message": summary.message(),
    "strict": mode.is_strict(),
    "created": summary.created,
    "updated": summary.updated,
    "skipped": summary.skipped,
  })))
}
