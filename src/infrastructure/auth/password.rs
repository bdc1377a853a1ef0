use argon2::{
    password_hash::{Error as Argon2Error, PasswordHash, PasswordVerifier},
    Argon2,
};
use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::{
    errors::{AppError, PasswordError},
    repositories::authenticator::AdminAuthenticator,
};

pub fn verify_password(password: &str, hashed: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hashed)
        .map_err(|e| PasswordError::InvalidHashFormat(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(Argon2Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerificationError(e.to_string())),
    }
}

/// Checks that a PHC string is an argon2 hash we can verify against.
pub fn validate_password_hash(hashed: &str) -> Result<(), PasswordError> {
    let parsed = PasswordHash::new(hashed)
        .map_err(|e| PasswordError::InvalidHashFormat(e.to_string()))?;
    if parsed.algorithm.as_str().starts_with("argon2") {
        Ok(())
    } else {
        Err(PasswordError::InvalidHashFormat(format!(
            "unsupported algorithm {}",
            parsed.algorithm
        )))
    }
}

/// Single admin account configured by username and argon2 hash.
#[derive(Clone)]
pub struct PasswordAuthenticator {
    username: String,
    password_hash: String,
}

impl PasswordAuthenticator {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        PasswordAuthenticator {
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }
}

#[async_trait]
impl AdminAuthenticator for PasswordAuthenticator {
    async fn authenticate(&self, username: &str, password: &str) -> Result<bool, AppError> {
        if self.password_hash.is_empty() {
            tracing::warn!("Admin login attempted but no admin account is configured");
            return Ok(false);
        }

        // Verify even on a username mismatch so both paths cost the same.
        // Argon2 is CPU bound; keep it off the async workers.
        let password = Zeroizing::new(password.to_owned());
        let password_hash = self.password_hash.clone();
        let password_ok = tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .map_err(|e| AppError::Internal(format!("password verification task failed: {}", e)))??;

        Ok(password_ok && username == self.username)
    }
}
