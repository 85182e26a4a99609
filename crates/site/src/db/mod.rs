//! Database operations for the site `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `profiles` - One portfolio profile per user, addressed by its claimed domain
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p folio-cli -- migrate
//! ```

pub mod profiles;

use std::future::Future;
use std::time::Duration;

use folio_core::Domain;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::models::Profile;

pub use profiles::ProfileRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., a domain claimed twice).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Read access to profiles by claimed domain.
///
/// Implementations return every profile whose stored domain equals `domain`
/// exactly, in a stable order. More than one result is a data-integrity
/// violation that callers report.
pub trait ProfileStore: Send + Sync {
    /// Find profiles claiming `domain`.
    fn find_by_domain(
        &self,
        domain: &Domain,
    ) -> impl Future<Output = Result<Vec<Profile>, RepositoryError>> + Send;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
