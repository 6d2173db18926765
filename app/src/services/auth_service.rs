// app/src/services/auth_service.rs

//! Password hashing and verification for stored accounts.

use anyhow::anyhow;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use stockroom::{CatalogError, CatalogResult};
use tracing::{debug, error, instrument};

/// Hashes a plain-text password into an Argon2 PHC string.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> CatalogResult<String> {
  let salt = SaltString::generate(&mut OsRng);
  match Argon2::default().hash_password(password.as_bytes(), &salt) {
    Ok(hash) => {
      debug!("Password hashed successfully.");
      Ok(hash.to_string())
    }
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(CatalogError::from(anyhow!("password hashing failed: {}", argon_err)))
    }
  }
}

/// `Ok(false)` on a mismatch; a malformed stored hash is an internal error.
#[instrument(
  name = "auth_service::verify_password",
  skip(stored_hash, provided_password),
  fields(hash_len = stored_hash.len()),
  err(Display)
)]
pub fn verify_password(stored_hash: &str, provided_password: &str) -> CatalogResult<bool> {
  let parsed_hash = PasswordHash::new(stored_hash).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    CatalogError::from(anyhow!("invalid stored password hash: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: passwords do not match.");
      Ok(false)
    }
    Err(other) => {
      error!(error = %other, "Argon2 password verification encountered an error.");
      Err(CatalogError::from(anyhow!("password verification failed: {}", other)))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hashed_password_verifies_only_itself() {
    let hash = hash_password("correct horse").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password(&hash, "correct horse").unwrap());
    assert!(!verify_password(&hash, "battery staple").unwrap());
  }

  #[test]
  fn garbage_hash_is_an_error() {
    assert!(verify_password("not-a-phc-string", "whatever").is_err());
  }
}
