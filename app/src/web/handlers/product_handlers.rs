// app/src/web/handlers/product_handlers.rs

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use stockroom::{ListQuery, ProductId};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::CurrentIdentity;
use crate::web::multipart;

/// Raw listing parameters; malformed values fall back to defaults instead of failing.
#[derive(Deserialize, Debug, Default)]
pub struct ListProductsQuery {
  pub q: Option<String>,
  pub sort: Option<String>,
  pub page: Option<String>,
  pub per_page: Option<String>,
}

impl ListProductsQuery {
  fn to_list_query(&self) -> ListQuery {
    ListQuery::from_params(
      self.q.as_deref(),
      self.sort.as_deref(),
      self.page.as_deref(),
      self.per_page.as_deref(),
    )
  }
}

#[instrument(name = "handler::list_products", skip(app_state, identity, params))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  identity: CurrentIdentity,
  params: web::Query<ListProductsQuery>,
) -> Result<HttpResponse, AppError> {
  let page = app_state.catalog.list(&identity.0, &params.to_list_query()).await?;
  Ok(HttpResponse::Ok().json(page))
}

#[instrument(name = "handler::get_product", skip(app_state, identity, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  identity: CurrentIdentity,
  path: web::Path<ProductId>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.catalog.get(&identity.0, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "product": product })))
}

#[instrument(name = "handler::create_product", skip(app_state, identity, payload))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  identity: CurrentIdentity,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  // Reject anonymous callers before buffering the body.
  identity.0.require_user()?;
  let form = multipart::collect(payload, app_state.config.max_upload_bytes).await?;
  let image = form.image();

  let product = app_state
    .catalog
    .create(&identity.0, &form.product_input(), image.as_ref())
    .await?;
  info!(product_id = product.id, "Product created via API.");
  Ok(HttpResponse::Created().json(json!({
    "message": format!("\"{}\" created.", product.name),
    "product": product,
  })))
}

#[instrument(name = "handler::update_product", skip(app_state, identity, path, payload), fields(product_id = %path.as_ref()))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  identity: CurrentIdentity,
  path: web::Path<ProductId>,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  identity.0.require_user()?;
  let form = multipart::collect(payload, app_state.config.max_upload_bytes).await?;
  let image = form.image();

  let product = app_state
    .catalog
    .update(&identity.0, path.into_inner(), &form.product_input(), image.as_ref())
    .await?;
  Ok(HttpResponse::Ok().json(json!({
    "message": format!("\"{}\" updated.", product.name),
    "product": product,
  })))
}

#[instrument(name = "handler::delete_product", skip(app_state, identity, path), fields(product_id = %path.as_ref()))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  identity: CurrentIdentity,
  path: web::Path<ProductId>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.catalog.delete(&identity.0, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
    "message": format!("\"{}\" deleted.", product.name),
    "product": product,
  })))
}
