// app/src/web/routes.rs

use crate::web::handlers::{auth_handlers, csv_handlers, product_handlers};
use actix_web::web;

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .route("/", web::get().to(auth_handlers::landing_handler))
      .service(
        web::scope("/auth")
          .route("/signup", web::post().to(auth_handlers::signup_handler))
          .route("/login", web::post().to(auth_handlers::login_handler))
          .route("/logout", web::post().to(auth_handlers::logout_handler)),
      )
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("", web::post().to(product_handlers::create_product_handler))
          // Fixed segments must be registered before `/{product_id}`.
          .route("/export", web::get().to(csv_handlers::export_handler))
          .route("/csv-template", web::get().to(csv_handlers::template_handler))
          .route("/import", web::post().to(csv_handlers::import_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler))
          .route("/{product_id}", web::post().to(product_handlers::update_product_handler))
          .route("/{product_id}", web::delete().to(product_handlers::delete_product_handler)),
      ),
  );
}
