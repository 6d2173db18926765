// app/src/web/extractors.rs

use crate::errors::AppError;
use crate::state::AppState;
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use stockroom::{Identity, SessionToken};

pub const SESSION_COOKIE: &str = "session";

/// The presented session token: `Authorization: Bearer <token>` first, then the session cookie.
pub fn session_token(req: &HttpRequest) -> Option<SessionToken> {
  let bearer = req
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|value| value.to_str().ok())
    .and_then(|value| value.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|token| !token.is_empty())
    .map(str::to_string);

  bearer
    .or_else(|| req.cookie(SESSION_COOKIE).map(|c| c.value().to_string()))
    .filter(|token| !token.is_empty())
    .map(SessionToken)
}

/// The caller's resolved identity; anonymous when no valid session was presented.
///
/// Handlers gate on `Identity::require_user` themselves through the catalog
/// operations, so extraction never fails for a missing login.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

impl FromRequest for CurrentIdentity {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = req.app_data::<web::Data<AppState>>().cloned();
    let token = session_token(req);
    Box::pin(async move {
      let state = state.ok_or_else(|| AppError::Internal("application state is not configured".to_string()))?;
      let identity = state.identity.current_user_or_anonymous(token.as_ref()).await?;
      Ok(CurrentIdentity(identity))
    })
  }
}
