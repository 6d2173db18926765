// app/src/db/identity.rs

use super::store_error;
use crate::services::auth_service::{hash_password, verify_password};
use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use sqlx::{FromRow, PgPool};
use stockroom::{
  validate_signup, CatalogError, CatalogResult, Credentials, Identity, IdentityProvider, Session, SessionToken,
  SignupForm, UserAccount, UserId, ValidationErrors,
};
use tracing::{event, info, instrument, warn, Level};
use uuid::Uuid;

const USERNAME_TAKEN: &str = "a user with that username already exists";

#[derive(Debug, FromRow)]
struct UserRow {
  id: i64,
  username: String,
  password_hash: String,
}

/// Accounts in `users`, sessions as random UUID tokens in `sessions`.
#[derive(Clone)]
pub struct PgIdentityProvider {
  pool: PgPool,
  session_ttl: TimeDelta,
}

impl PgIdentityProvider {
  pub fn new(pool: PgPool, session_ttl: TimeDelta) -> Self {
    Self { pool, session_ttl }
  }

  async fn open_session(&self, account: UserAccount) -> CatalogResult<Session> {
    let token = Uuid::new_v4();
    let expires_at = Utc::now()
      .checked_add_signed(self.session_ttl)
      .ok_or_else(|| CatalogError::from(anyhow::anyhow!("session expiry is out of range")))?;
    sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
      .bind(token)
      .bind(account.id.0)
      .bind(expires_at)
      .execute(&self.pool)
      .await
      .map_err(|e| store_error("opening a session", e))?;
    event!(Level::DEBUG, user_id = %account.id, "Session opened.");
    Ok(Session {
      token: SessionToken(token.to_string()),
      account,
      expires_at,
    })
  }
}

#[async_trait]
impl IdentityProvider for PgIdentityProvider {
  async fn current_user_or_anonymous(&self, token: Option<&SessionToken>) -> CatalogResult<Identity> {
    let Some(token) = token else {
      return Ok(Identity::Anonymous);
    };
    // Anything that is not one of our UUIDs cannot name a session.
    let Ok(token) = Uuid::parse_str(token.as_str()) else {
      return Ok(Identity::Anonymous);
    };

    let row: Option<(i64, String)> = sqlx::query_as(
      "SELECT u.id, u.username FROM sessions s JOIN users u ON u.id = s.user_id \
       WHERE s.token = $1 AND s.expires_at > NOW()",
    )
    .bind(token)
    .fetch_optional(&self.pool)
    .await
    .map_err(|e| store_error("resolving a session", e))?;

    Ok(match row {
      Some((id, username)) => Identity::user(UserId(id), username),
      None => Identity::Anonymous,
    })
  }

  #[instrument(name = "pg_identity::login", skip(self, credentials), fields(username = %credentials.username), err(Display))]
  async fn login(&self, credentials: &Credentials) -> CatalogResult<Session> {
    let user: Option<UserRow> = sqlx::query_as("SELECT id, username, password_hash FROM users WHERE username = $1")
      .bind(credentials.username.trim())
      .fetch_optional(&self.pool)
      .await
      .map_err(|e| store_error("looking up a user", e))?;

    let Some(user) = user else {
      warn!("Login for unknown username.");
      return Err(CatalogError::InvalidCredentials);
    };
    if !verify_password(&user.password_hash, &credentials.password)? {
      warn!(user_id = user.id, "Login with wrong password.");
      return Err(CatalogError::InvalidCredentials);
    }

    info!(user_id = user.id, "User logged in.");
    self
      .open_session(UserAccount {
        id: UserId(user.id),
        username: user.username,
      })
      .await
  }

  async fn logout(&self, token: &SessionToken) -> CatalogResult<()> {
    let Ok(token) = Uuid::parse_str(token.as_str()) else {
      return Ok(());
    };
    let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
      .bind(token)
      .execute(&self.pool)
      .await
      .map_err(|e| store_error("ending a session", e))?;
    event!(Level::DEBUG, removed = result.rows_affected(), "Logout processed.");
    Ok(())
  }

  #[instrument(name = "pg_identity::create_user", skip(self, form), fields(username = %form.username), err(Display))]
  async fn create_user(&self, form: &SignupForm) -> CatalogResult<Session> {
    validate_signup(form)?;
    let username = form.username.trim();

    let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
      .bind(username)
      .fetch_one(&self.pool)
      .await
      .map_err(|e| store_error("checking username availability", e))?;
    if taken {
      return Err(ValidationErrors::single("username", USERNAME_TAKEN).into());
    }

    let password_hash = hash_password(&form.password1)?;
    let inserted: Result<i64, sqlx::Error> =
      sqlx::query_scalar("INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING id")
        .bind(username)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await;

    let id = match inserted {
      Ok(id) => id,
      // Lost a race with a concurrent signup for the same name.
      Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
        return Err(ValidationErrors::single("username", USERNAME_TAKEN).into());
      }
      Err(e) => return Err(store_error("creating a user", e)),
    };

    info!(user_id = id, "User account created.");
    self
      .open_session(UserAccount {
        id: UserId(id),
        username: username.to_string(),
      })
      .await
  }
}
