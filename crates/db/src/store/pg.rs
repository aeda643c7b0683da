//! PostgreSQL-backed [`CredentialStore`].

use async_trait::async_trait;
use warden_core::types::UserId;

use super::{CredentialStore, StoreError};
use crate::bootstrap::ConnectedPool;
use crate::models::user::{CreateUser, User};
use crate::repositories::UserRepo;
use crate::DbPool;

/// Credential store over the `users` table.
///
/// Can only be built from a [`ConnectedPool`], i.e. after the bootstrapper
/// has seen the database answer.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: DbPool,
}

impl PgCredentialStore {
    pub fn new(pool: ConnectedPool) -> Self {
        Self {
            pool: pool.into_inner(),
        }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn save_user(&self, email: &str, password_hash: &str) -> Result<UserId, StoreError> {
        const OP: &str = "store.pg.save_user";

        let input = CreateUser {
            email,
            password_hash,
        };
        match UserRepo::create_if_absent(&self.pool, &input).await {
            Ok(Some(user)) => Ok(user.id),
            Ok(None) => Err(StoreError::UserExists),
            // 23505 on `uq_users_email` means the same thing as an empty RETURNING.
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::UserExists)
            }
            Err(e) => Err(StoreError::internal(OP, e)),
        }
    }

    async fn user_by_email(&self, email: &str) -> Result<User, StoreError> {
        const OP: &str = "store.pg.user_by_email";

        UserRepo::find_by_email(&self.pool, email)
            .await
            .map_err(|e| StoreError::internal(OP, e))?
            .ok_or(StoreError::UserNotFound)
    }
}
