// core/src/identity.rs

//! The identity contract every catalog operation is scoped by.
//!
//! Authentication itself lives behind [`IdentityProvider`]; the catalog and
//! CSV exchange only ever see the resolved [`Identity`] value passed in by the
//! caller.

use crate::error::{CatalogError, CatalogResult, ValidationErrors};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const USERNAME_MAX_CHARS: usize = 150;
pub const PASSWORD_MIN_CHARS: usize = 8;

/// Store-assigned identifier of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAccount {
  pub id: UserId,
  pub username: String,
}

/// The resolved caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
  Anonymous,
  User(UserAccount),
}

impl Identity {
  pub fn user(id: UserId, username: impl Into<String>) -> Self {
    Identity::User(UserAccount {
      id,
      username: username.into(),
    })
  }

  pub fn is_authenticated(&self) -> bool {
    matches!(self, Identity::User(_))
  }

  /// Login-required gate: the owner id for an authenticated caller, `Unauthenticated` otherwise.
  pub fn require_user(&self) -> CatalogResult<UserId> {
    match self {
      Identity::User(account) => Ok(account.id),
      Identity::Anonymous => Err(CatalogError::Unauthenticated),
    }
  }
}

/// Opaque session token issued on login/signup.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(pub String);

// Tokens are credentials; keep them out of Debug output and logs.
impl fmt::Debug for SessionToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("SessionToken(***)")
  }
}

impl SessionToken {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

#[derive(Debug, Clone)]
pub struct Session {
  pub token: SessionToken,
  pub account: UserAccount,
  pub expires_at: DateTime<Utc>,
}

#[derive(Clone, Deserialize)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}

/// Signup input: a username plus the password entered twice.
#[derive(Clone, Deserialize)]
pub struct SignupForm {
  pub username: String,
  pub password1: String,
  pub password2: String,
}

/// Checks a signup submission before any account is created.
///
/// Uniqueness of the username is not checked here; providers report a taken
/// name as a validation error on `username` themselves.
pub fn validate_signup(form: &SignupForm) -> Result<(), ValidationErrors> {
  let mut errors = ValidationErrors::new();
  let username = form.username.trim();

  if username.is_empty() {
    errors.add("username", "username is required");
  } else {
    if username.chars().count() > USERNAME_MAX_CHARS {
      errors.add(
        "username",
        format!("username must be at most {} characters", USERNAME_MAX_CHARS),
      );
    }
    if !username
      .chars()
      .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
      errors.add(
        "username",
        "username may contain only letters, digits and @/./+/-/_",
      );
    }
  }

  if form.password1 != form.password2 {
    errors.add("password2", "the two password fields didn't match");
  }
  let password = &form.password1;
  if password.chars().count() < PASSWORD_MIN_CHARS {
    errors.add(
      "password1",
      format!("password must contain at least {} characters", PASSWORD_MIN_CHARS),
    );
  }
  if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
    errors.add("password1", "password can't be entirely numeric");
  }
  if !username.is_empty() && password.eq_ignore_ascii_case(username) {
    errors.add("password1", "password is too similar to the username");
  }

  errors.into_result(())
}

/// Authentication and session issuance, consumed as a black box.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
  /// Resolves a presented session token; missing, unknown or expired tokens yield `Anonymous`.
  async fn current_user_or_anonymous(&self, token: Option<&SessionToken>) -> CatalogResult<Identity>;

  /// Fails with `InvalidCredentials` without saying which part was wrong.
  async fn login(&self, credentials: &Credentials) -> CatalogResult<Session>;

  /// Ending an unknown session is not an error.
  async fn logout(&self, token: &SessionToken) -> CatalogResult<()>;

  /// Creates the account and returns a logged-in session for it.
  async fn create_user(&self, form: &SignupForm) -> CatalogResult<Session>;
}

#[cfg(test)]
mod tests {
  use super::*;

  fn form(username: &str, p1: &str, p2: &str) -> SignupForm {
    SignupForm {
      username: username.to_string(),
      password1: p1.to_string(),
      password2: p2.to_string(),
    }
  }

  #[test]
  fn accepts_reasonable_signup() {
    assert!(validate_signup(&form("sara.b", "correct horse", "correct horse")).is_ok());
  }

  #[test]
  fn reports_every_signup_problem_at_once() {
    let errors = validate_signup(&form("bad name!", "1234", "12345")).unwrap_err();
    assert_eq!(errors.for_field("username").count(), 1);
    assert_eq!(errors.for_field("password2").count(), 1);
    // too short and entirely numeric
    assert_eq!(errors.for_field("password1").count(), 2);
  }

  #[test]
  fn anonymous_is_rejected_by_login_gate() {
    assert!(matches!(
      Identity::Anonymous.require_user(),
      Err(CatalogError::Unauthenticated)
    ));
    assert_eq!(Identity::user(UserId(7), "ana").require_user().unwrap(), UserId(7));
  }

  #[test]
  fn session_token_debug_is_redacted() {
    let token = SessionToken("secret-value".to_string());
    assert!(!format!("{:?}", token).contains("secret"));
  }
}
