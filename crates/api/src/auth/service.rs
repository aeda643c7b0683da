//! Register/login use case.
//!
//! [`AuthService`] owns no mutable state: a shared handle to the credential
//! store plus the token configuration it was built with. Every storage
//! condition is translated here into one of the three [`CoreError`] kinds;
//! nothing storage-specific leaks to callers.

use std::sync::Arc;

use warden_core::error::CoreError;
use warden_core::types::UserId;
use warden_db::store::{CredentialStore, StoreError};

use crate::auth::jwt::{issue_token, JwtConfig};
use crate::auth::password::{hash_password, verify_password};

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, jwt: JwtConfig) -> Self {
        Self { store, jwt }
    }

    /// Register a new user and return the id the store assigned.
    ///
    /// Fails with [`CoreError::UserExists`] if the email is taken. Input
    /// syntax (non-empty, valid email) is the caller's responsibility.
    pub async fn register(&self, email: &str, password: &str) -> Result<UserId, CoreError> {
        const OP: &str = "auth.register";
        tracing::info!(op = OP, "Registering user");

        let password = password.to_owned();
        let password_hash = run_blocking(OP, move || hash_password(&password))
            .await
            .inspect_err(|e| tracing::error!(op = OP, error = %e, "Failed to hash password"))?;

        match self.store.save_user(email, &password_hash).await {
            Ok(user_id) => {
                tracing::info!(op = OP, %user_id, "User registered");
                Ok(user_id)
            }
            Err(StoreError::UserExists) => {
                tracing::warn!(op = OP, "User already exists");
                Err(CoreError::UserExists)
            }
            Err(e) => {
                tracing::error!(op = OP, error = %e, "Failed to save user");
                Err(CoreError::internal(OP, e))
            }
        }
    }

    /// Check credentials and return a signed session token.
    ///
    /// An unknown email and a wrong password both yield
    /// [`CoreError::InvalidCredentials`] so callers cannot probe for accounts.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, CoreError> {
        const OP: &str = "auth.login";
        tracing::info!(op = OP, "Attempting to log in user");

        let user = match self.store.user_by_email(email).await {
            Ok(user) => user,
            Err(StoreError::UserNotFound) => {
                tracing::warn!(op = OP, "User not found");
                return Err(CoreError::InvalidCredentials);
            }
            Err(e) => {
                tracing::error!(op = OP, error = %e, "Failed to get user");
                return Err(CoreError::internal(OP, e));
            }
        };

        let password = password.to_owned();
        let password_hash = user.password_hash.clone();
        let matches = run_blocking(OP, move || verify_password(&password, &password_hash))
            .await
            .inspect_err(|e| tracing::error!(op = OP, error = %e, "Failed to verify password"))?;

        if !matches {
            tracing::warn!(op = OP, user_id = %user.id, "Invalid credentials");
            return Err(CoreError::InvalidCredentials);
        }

        let token = issue_token(user.id, &user.email, self.jwt.token_ttl, &self.jwt.secret)
            .map_err(|e| {
                tracing::error!(op = OP, error = %e, "Failed to generate token");
                CoreError::internal(OP, e)
            })?;

        tracing::info!(op = OP, user_id = %user.id, "User logged in");
        Ok(token)
    }
}

/// Run CPU-bound password work off the async executor.
async fn run_blocking<T, E, F>(op: &str, f: F) -> Result<T, CoreError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(CoreError::internal(op, e)),
        Err(join_err) => Err(CoreError::internal(op, join_err)),
    }
}
