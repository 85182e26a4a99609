//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `SITE_FALLBACK_DOMAIN` - Tenant domain served for `localhost` and bare hosts
//! - `STORAGE_PUBLIC_URL` - Public base URL of the object store
//! - `STORAGE_ENDPOINT` - Object store endpoint, used when no public URL is set
//! - `STORAGE_BUCKET` - Global bucket name (default: portfolio)
//! - `AVATAR_SIZE` - Edge length of composited avatars (default: 512)
//! - `AVATAR_FETCH_TIMEOUT_SECS` - Timeout for fetching avatar sources (default: 10)
//! - `AVATAR_CACHE_CAPACITY` - Number of composited avatars kept in memory (default: 256)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `LOG_FORMAT` - `json` for structured logs (read by the binary, not stored here)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use folio_core::{Domain, StorageLayout};
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Domain resolved when the request host has no effective domain
    pub fallback_domain: Option<Domain>,
    /// Object storage configuration
    pub storage: StorageConfig,
    /// Avatar compositing configuration
    pub avatar: AvatarConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Object storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Public base URL for stored objects
    pub public_url: Option<String>,
    /// Object store endpoint
    pub endpoint: Option<String>,
    /// Global bucket name
    pub bucket: String,
}

/// Avatar compositing configuration.
#[derive(Debug, Clone)]
pub struct AvatarConfig {
    /// Edge length of the square output
    pub size: u32,
    /// Timeout for fetching the source image
    pub fetch_timeout: Duration,
    /// Number of composited avatars kept in memory
    pub cache_capacity: u64,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            size: 512,
            fetch_timeout: Duration::from_secs(10),
            cache_capacity: 256,
        }
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SITE_DATABASE_URL")?;
        let host = parse_env_or_default("SITE_HOST", "127.0.0.1")?;
        let port = parse_env_or_default("SITE_PORT", "3000")?;
        let fallback_domain = fallback_domain_from_env()?;

        let storage = StorageConfig::from_env()?;
        let avatar = AvatarConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            fallback_domain,
            storage,
            avatar,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Read `SITE_FALLBACK_DOMAIN`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if the value has no effective domain.
pub fn fallback_domain_from_env() -> Result<Option<Domain>, ConfigError> {
    parse_fallback_domain(get_optional_env("SITE_FALLBACK_DOMAIN"))
}

fn parse_fallback_domain(raw: Option<String>) -> Result<Option<Domain>, ConfigError> {
    raw.map(|raw| {
        Domain::from_host(&raw).ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "SITE_FALLBACK_DOMAIN".to_string(),
                format!("'{raw}' has no effective domain"),
            )
        })
    })
    .transpose()
}

impl StorageConfig {
    /// Load storage configuration from environment variables.
    ///
    /// Missing URLs are not an error here; deriving a public URL fails at the
    /// call site instead.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a configured URL does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            public_url: get_optional_url("STORAGE_PUBLIC_URL")?,
            endpoint: get_optional_url("STORAGE_ENDPOINT")?,
            bucket: get_env_or_default("STORAGE_BUCKET", "portfolio"),
        })
    }

    /// Build the key/URL layout for this storage configuration.
    #[must_use]
    pub fn layout(&self) -> StorageLayout {
        StorageLayout::new(
            self.public_url.clone(),
            self.endpoint.clone(),
            self.bucket.clone(),
        )
    }
}

impl AvatarConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let size: u32 = parse_env_or_default("AVATAR_SIZE", "512")?;
        if size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "AVATAR_SIZE".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let timeout_secs: u64 = parse_env_or_default("AVATAR_FETCH_TIMEOUT_SECS", "10")?;

        Ok(Self {
            size,
            fetch_timeout: Duration::from_secs(timeout_secs),
            cache_capacity: parse_env_or_default("AVATAR_CACHE_CAPACITY", "256")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to a default.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get an optional URL, validating it but keeping the raw text.
///
/// The raw value is kept because public URLs are built by string
/// concatenation and `Url` would normalize the path.
fn get_optional_url(key: &str) -> Result<Option<String>, ConfigError> {
    get_optional_env(key)
        .map(|raw| validate_url(key, raw))
        .transpose()
}

fn validate_url(key: &str, raw: String) -> Result<String, ConfigError> {
    Url::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(raw)
}
