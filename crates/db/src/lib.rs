//! PostgreSQL access for Warden.
//!
//! - [`bootstrap`] -- bounded, cancellable connection establishment.
//! - [`models`] -- row types.
//! - [`repositories`] -- SQL for each table.
//! - [`store`] -- the [`CredentialStore`](store::CredentialStore) capability
//!   and its PostgreSQL and in-memory implementations.

use sqlx::postgres::PgPoolOptions;

pub mod bootstrap;
pub mod models;
pub mod repositories;
pub mod store;

pub use bootstrap::{
    connect, BootstrapConfig, BootstrapError, BootstrapState, Bootstrapper, ConnectedPool,
};

pub type DbPool = sqlx::PgPool;

/// Build a connection pool without opening any connection yet.
///
/// Only the URL is parsed here. Connectivity is established by
/// [`bootstrap::connect`], which probes the pool with bounded retries.
pub fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_lazy(database_url)
}

/// Lightweight liveness check (`SELECT 1`).
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations from `db/migrations`.
pub async fn run_migrations(pool: &ConnectedPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool.pool()).await
}
