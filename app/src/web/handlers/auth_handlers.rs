// app/src/web/handlers/auth_handlers.rs

use actix_web::cookie::Cookie;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use stockroom::{Credentials, Identity, Session, SignupForm};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::{session_token, CurrentIdentity, SESSION_COOKIE};

fn session_cookie(session: &Session) -> Cookie<'static> {
  Cookie::build(SESSION_COOKIE, session.token.as_str().to_string())
    .path("/")
    .http_only(true)
    .finish()
}

fn session_body(message: &str, session: &Session) -> serde_json::Value {
  json!({
    "message": message,
    "token": session.token.as_str(),
    "user": session.account,
    "expires_at": session.expires_at,
  })
}

/// Landing data: whether the caller is logged in, and as whom.
pub async fn landing_handler(identity: CurrentIdentity) -> HttpResponse {
  let body = match &identity.0 {
    Identity::User(account) => json!({"authenticated": true, "user": account}),
    Identity::Anonymous => json!({"authenticated": false}),
  };
  HttpResponse::Ok().json(body)
}

#[instrument(name = "handler::signup", skip(app_state, form), fields(username = %form.username))]
pub async fn signup_handler(
  app_state: web::Data<AppState>,
  form: web::Json<SignupForm>,
) -> Result<HttpResponse, AppError> {
  let session = app_state.identity.create_user(&form).await?;
  info!(user_id = %session.account.id, "Signup completed; user logged in.");
  Ok(
    HttpResponse::Created()
      .cookie(session_cookie(&session))
      .json(session_body("Account created.", &session)),
  )
}

#[instrument(name = "handler::login", skip(app_state, credentials), fields(username = %credentials.username))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  credentials: web::Json<Credentials>,
) -> Result<HttpResponse, AppError> {
  let session = app_state.identity.login(&credentials).await?;
  Ok(
    HttpResponse::Ok()
      .cookie(session_cookie(&session))
      .json(session_body("Logged in.", &session)),
  )
}

#[instrument(name = "handler::logout", skip(app_state, req))]
pub async fn logout_handler(app_state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
  if let Some(token) = session_token(&req) {
    app_state.identity.logout(&token).await?;
  }
  let mut removal = Cookie::build(SESSION_COOKIE, "").path("/").finish();
  removal.make_removal();
  Ok(HttpResponse::Ok().cookie(removal).json(json!({"message": "Logged out."})))
}
