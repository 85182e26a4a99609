//! Integration tests for Folio.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate a scratch database and start the site against it
//! cargo run -p folio-cli -- migrate
//! cargo run -p folio-site
//!
//! # Run the ignored tests
//! cargo test -p folio-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `SITE_BASE_URL` - Running site (default: `http://localhost:3000`)
//! - `SITE_DATABASE_URL` / `DATABASE_URL` - Database the site uses

use folio_core::{Domain, UserId};
use folio_site::db::{ProfileRepository, create_pool};
use folio_site::models::Profile;
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

/// Base URL for the site (configurable via environment).
#[must_use]
pub fn site_base_url() -> String {
    std::env::var("SITE_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Connect to the site database.
///
/// # Panics
///
/// Panics if no database URL is set or the connection fails.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("SITE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("SITE_DATABASE_URL or DATABASE_URL must be set");
    create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to database")
}

/// A domain nobody else will claim.
#[must_use]
pub fn unique_domain() -> Domain {
    Domain::from_host(&format!("it-{}.test", Uuid::new_v4().simple()))
        .expect("generated domain is never empty")
}

/// Create a profile, optionally claiming `domain`.
///
/// # Panics
///
/// Panics if any database operation fails.
pub async fn seed_profile(pool: &PgPool, name: &str, domain: Option<&Domain>) -> Profile {
    let repo = ProfileRepository::new(pool);
    let id = UserId::new(Uuid::new_v4());

    let profile = repo.create(id, name).await.expect("Failed to create profile");
    if let Some(domain) = domain {
        repo.claim_domain(id, domain)
            .await
            .expect("Failed to claim domain");
    }
    profile
}

/// Delete a seeded profile.
///
/// # Panics
///
/// Panics if the delete fails.
pub async fn delete_profile(pool: &PgPool, id: UserId) {
    sqlx::query("DELETE FROM profiles WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .expect("Failed to delete profile");
}
