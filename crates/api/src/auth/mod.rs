//! Credential issuance.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- session token issuance and validation.
//! - [`service`] -- the register/login use case built on the two above and a
//!   [`CredentialStore`](warden_db::store::CredentialStore).

pub mod jwt;
pub mod password;
pub mod service;

pub use service::AuthService;
