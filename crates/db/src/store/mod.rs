//! The credential store capability consumed by the authentication service.
//!
//! Implementations must make [`CredentialStore::save_user`] atomic with
//! respect to email uniqueness: under concurrent registrations of the same
//! email exactly one call succeeds and every other call observes
//! [`StoreError::UserExists`].

use async_trait::async_trait;
use warden_core::types::UserId;

use crate::models::user::User;

pub mod memory;
pub mod pg;

pub use memory::MemoryCredentialStore;
pub use pg::PgCredentialStore;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Storage-level outcome, translated by the service into domain errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("user already exists")]
    UserExists,

    #[error("user not found")]
    UserNotFound,

    /// Anything else (query, decoding, connectivity), tagged with the
    /// operation that failed.
    #[error("{op}: {source}")]
    Internal {
        op: &'static str,
        #[source]
        source: BoxError,
    },
}

impl StoreError {
    pub fn internal(op: &'static str, source: impl Into<BoxError>) -> Self {
        StoreError::Internal {
            op,
            source: source.into(),
        }
    }
}

/// Durable mapping from email to [`User`].
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Create a user and return the identifier the store assigned to it.
    async fn save_user(&self, email: &str, password_hash: &str) -> Result<UserId, StoreError>;

    /// Load a user by exact email. Returns [`StoreError::UserNotFound`] on no match.
    async fn user_by_email(&self, email: &str) -> Result<User, StoreError>;
}
