//! Warden API server library.
//!
//! Exposes the authentication service and the HTTP surface built on it so
//! integration tests and the binary entrypoint share one implementation.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
