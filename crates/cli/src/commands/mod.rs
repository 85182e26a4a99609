//! CLI command implementations.

pub mod domain;
pub mod media;
pub mod migrate;
pub mod profile;
pub mod storage;

use folio_core::StorageError;
use folio_site::config::ConfigError;
use folio_site::db::{self, RepositoryError};
use folio_site::media::MediaError;
use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Storage URL could not be derived.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Image processing failed.
    #[error(transparent)]
    Media(#[from] MediaError),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The host has no effective domain.
    #[error("'{0}' has no effective domain")]
    InvalidDomain(String),
}

/// Connect to the site database.
///
/// Reads `SITE_DATABASE_URL`, falling back to `DATABASE_URL`.
async fn connect() -> Result<PgPool, CliError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("SITE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CliError::MissingEnvVar("SITE_DATABASE_URL"))?;

    tracing::info!("Connecting to site database...");
    Ok(db::create_pool(&SecretString::from(database_url)).await?)
}
