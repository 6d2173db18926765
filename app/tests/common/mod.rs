// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use async_trait::async_trait;
use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use stockroom::{
  validate_signup, CatalogError, CatalogResult, Credentials, Identity, IdentityProvider, MemoryImageStore,
  MemoryProductStore, Session, SessionToken, SignupForm, UserAccount, UserId, ValidationErrors,
};
use stockroom_app::{AppConfig, AppState};
use tracing::Level;

// --- In-memory identity provider with plain-text passwords ---
#[derive(Default)]
struct Accounts {
  users: Vec<(UserAccount, String)>,
  sessions: HashMap<String, UserAccount>,
  issued: u64,
}

#[derive(Default)]
pub struct MemoryIdentityProvider {
  inner: Mutex<Accounts>,
}

impl MemoryIdentityProvider {
  fn open_session(accounts: &mut Accounts, account: UserAccount) -> Session {
    accounts.issued += 1;
    let token = format!("test-token-{}", accounts.issued);
    accounts.sessions.insert(token.clone(), account.clone());
    Session {
      token: SessionToken(token),
      account,
      expires_at: Utc::now() + Duration::hours(1),
    }
  }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
  async fn current_user_or_anonymous(&self, token: Option<&SessionToken>) -> CatalogResult<Identity> {
    let accounts = self.inner.lock();
    Ok(
      token
        .and_then(|t| accounts.sessions.get(t.as_str()))
        .map(|account| Identity::User(account.clone()))
        .unwrap_or(Identity::Anonymous),
    )
  }

  async fn login(&self, credentials: &Credentials) -> CatalogResult<Session> {
    let mut accounts = self.inner.lock();
    let account = accounts
      .users
      .iter()
      .find(|(account, password)| account.username == credentials.username && *password == credentials.password)
      .map(|(account, _)| account.clone())
      .ok_or(CatalogError::InvalidCredentials)?;
    Ok(Self::open_session(&mut accounts, account))
  }

  async fn logout(&self, token: &SessionToken) -> CatalogResult<()> {
    self.inner.lock().sessions.remove(token.as_str());
    Ok(())
  }

  async fn create_user(&self, form: &SignupForm) -> CatalogResult<Session> {
    validate_signup(form)?;
    let mut accounts = self.inner.lock();
    if accounts.users.iter().any(|(account, _)| account.username == form.username) {
      return Err(ValidationErrors::single("username", "a user with that username already exists").into());
    }
    let account = UserAccount {
      id: UserId(accounts.users.len() as i64 + 1),
      username: form.username.clone(),
    };
    accounts.users.push((account.clone(), form.password1.clone()));
    Ok(Self::open_session(&mut accounts, account))
  }
}

// --- Application state over in-memory stores ---
pub struct TestContext {
  pub state: AppState,
  pub images: Arc<MemoryImageStore>,
}

pub fn test_context() -> TestContext {
  let images = Arc::new(MemoryImageStore::new());
  let config = AppConfig::for_tests(std::env::temp_dir().join("stockroom-app-tests"));
  let state = AppState::assemble(
    Arc::new(config),
    Arc::new(MemoryProductStore::new()),
    images.clone(),
    Arc::new(MemoryIdentityProvider::default()),
  );
  TestContext { state, images }
}

/// Initializes the routed service for a `TestContext`.
macro_rules! init_app {
  ($ctx:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new($ctx.state.clone()))
        .configure(stockroom_app::configure_app_routes),
    )
    .await
  };
}

/// Signs a user up through the API and returns the session token.
macro_rules! signup {
  ($app:expr, $username:expr) => {{
    let req = actix_web::test::TestRequest::post()
      .uri("/api/v1/auth/signup")
      .set_json(serde_json::json!({
        "username": $username,
        "password1": "correct horse",
        "password2": "correct horse",
      }))
      .to_request();
    let resp = actix_web::test::call_service(&$app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let body: serde_json::Value = actix_web::test::read_body_json(resp).await;
    body["token"].as_str().expect("token in signup response").to_string()
  }};
}

pub fn bearer(token: &str) -> (&'static str, String) {
  ("Authorization", format!("Bearer {}", token))
}

// --- Multipart bodies ---
pub const BOUNDARY: &str = "stockroom-test-boundary";

pub struct FilePart<'a> {
  pub field: &'a str,
  pub filename: &'a str,
  pub content_type: &'a str,
  pub bytes: &'a [u8],
}

/// Returns the `Content-Type` header value and the encoded body.
pub fn multipart_body(fields: &[(&str, &str)], files: &[FilePart<'_>]) -> (String, Vec<u8>) {
  let mut body = Vec::new();
  for (name, value) in fields {
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes());
    body.extend_from_slice(value.as_bytes());
    body.extend_from_slice(b"\r\n");
  }
  for file in files {
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
      format!(
        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
        file.field, file.filename, file.content_type
      )
      .as_bytes(),
    );
    body.extend_from_slice(file.bytes);
    body.extend_from_slice(b"\r\n");
  }
  body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
  (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

// --- Helper for Tracing Setup (call once per test run if needed) ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
