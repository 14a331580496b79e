//! Domain service for signup and login.
//!
//! Hashing and verification are delegated to the Argon2id capability in the
//! user repository; login yields a bare success outcome that the client
//! holds on to. There is no session or token protocol.

use thiserror::Error;

use crate::config::SecurityConfig;
use crate::db::Store;

/// Errors specific to credential operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username already exists")]
    DuplicateUser,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Store unavailable: {0}")]
    Store(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Store(err.to_string())
    }
}

pub struct AuthService {
    store: Store,
    security: SecurityConfig,
}

impl AuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateUser`] when the username is taken.
    pub async fn signup(&self, username: &str, password: &str) -> Result<(), AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::Validation("Username is required".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }

        let hash = self
            .store
            .hash_password_blocking(password, &self.security)
            .await?;

        match self.store.create_user(username, &hash).await? {
            Some(user) => {
                tracing::info!("User created: {}", user.username);
                Ok(())
            }
            None => Err(AuthError::DuplicateUser),
        }
    }

    /// Verify credentials and return the username on success.
    ///
    /// Missing user and wrong password produce the same
    /// [`AuthError::InvalidCredentials`] so callers cannot enumerate
    /// accounts.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let is_valid = self.store.verify_user_password(username, password).await?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(username.to_string())
    }
}
