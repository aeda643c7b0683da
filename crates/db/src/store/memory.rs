//! In-memory [`CredentialStore`] for tests and local experiments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;
use warden_core::types::UserId;

use super::{CredentialStore, StoreError};
use crate::models::user::User;

/// Users keyed by email behind a single lock.
///
/// The duplicate check and the insert happen under one write guard, which
/// gives the same all-or-nothing behaviour as the unique constraint in
/// PostgreSQL. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn save_user(&self, email: &str, password_hash: &str) -> Result<UserId, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(StoreError::UserExists);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        let id = user.id;
        users.insert(user.email.clone(), user);
        Ok(id)
    }

    async fn user_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.users
            .read()
            .await
            .get(email)
            .cloned()
            .ok_or(StoreError::UserNotFound)
    }
}
