//! User entity model and DTOs.

use sqlx::FromRow;
use warden_core::types::{Timestamp, UserId};

/// Full user row from the `users` table.
///
/// Contains the password hash -- never hand this to a transport layer.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// PHC-formatted password hash.
    pub password_hash: String,
    pub created_at: Timestamp,
    /// Reserved; nothing in Warden writes it after creation.
    pub updated_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug)]
pub struct CreateUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
}
