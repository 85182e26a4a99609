//! Profile repository for database operations.
//!
//! Uses runtime queries with `FromRow` row types so the crate builds without
//! a live database or an offline query cache.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tracing::{instrument, warn};

use folio_core::{
    AboutPage, AvatarTransform, Domain, HomePage, Theme, UserId, decode_or_default,
};

use super::{ProfileStore, RepositoryError};
use crate::models::{Avatar, Profile};

/// Columns selected for every profile read.
const PROFILE_COLUMNS: &str = r"
    id, domain, display_name, headline,
    home_page_data, about_page_data, theme,
    avatar_url, avatar_position, avatar_zoom,
    favicon_url, background_url,
    created_at, updated_at
";

/// Internal row type for profile queries.
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: UserId,
    domain: Option<String>,
    display_name: String,
    headline: Option<String>,
    home_page_data: Option<JsonValue>,
    about_page_data: Option<JsonValue>,
    theme: Option<JsonValue>,
    avatar_url: Option<String>,
    avatar_position: Option<JsonValue>,
    avatar_zoom: Option<f64>,
    favicon_url: Option<String>,
    background_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProfileRow {
    /// Convert to the domain type, defaulting malformed content blobs.
    fn into_profile(self) -> Result<Profile, RepositoryError> {
        let domain = self
            .domain
            .map(|raw| {
                Domain::from_host(&raw).ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "profile {} has unusable domain '{raw}'",
                        self.id
                    ))
                })
            })
            .transpose()?;

        let home: HomePage = decode_blob(self.id, "home_page_data", self.home_page_data);
        let about: AboutPage = decode_blob(self.id, "about_page_data", self.about_page_data);
        let theme: Theme = decode_blob(self.id, "theme", self.theme);

        let avatar = self.avatar_url.filter(|url| !url.is_empty()).map(|url| {
            let zoom = self.avatar_zoom.map(JsonValue::from);
            Avatar {
                url,
                transform: AvatarTransform::from_stored(
                    self.avatar_position.as_ref(),
                    zoom.as_ref(),
                ),
            }
        });

        Ok(Profile {
            id: self.id,
            domain,
            display_name: self.display_name,
            headline: self.headline,
            home,
            about,
            theme,
            avatar,
            favicon_url: self.favicon_url,
            background_url: self.background_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn decode_blob<T>(id: UserId, column: &str, value: Option<JsonValue>) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    let (decoded, err) = decode_or_default(value);
    if let Some(err) = err {
        warn!(profile_id = %id, column, error = %err, "Malformed profile content, using defaults");
    }
    decoded
}

/// Repository for profile database operations.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a profile by its owning user ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored domain is unusable.
    #[instrument(skip(self), fields(profile_id = %id))]
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(ProfileRow::into_profile).transpose()
    }

    /// Find profiles whose stored domain equals `domain`.
    ///
    /// Ordered by creation time, then id, and limited to two rows: enough to
    /// detect a duplicate claim without loading more.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn find_by_domain(&self, domain: &Domain) -> Result<Vec<Profile>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE lower(domain) = $1 ORDER BY created_at, id LIMIT 2"
        ))
        .bind(domain.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ProfileRow::into_profile).collect()
    }

    /// Create an empty profile for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has a profile.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self), fields(profile_id = %id))]
    pub async fn create(&self, id: UserId, display_name: &str) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "INSERT INTO profiles (id, display_name) VALUES ($1, $2) RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(id)
        .bind(display_name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("profile already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_profile()
    }

    /// Claim a domain for a profile.
    ///
    /// Uniqueness is enforced here, at claim time, by the unique index on
    /// `lower(domain)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if another profile holds the domain.
    /// Returns `RepositoryError::NotFound` if the profile doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self), fields(profile_id = %id, domain = %domain))]
    pub async fn claim_domain(&self, id: UserId, domain: &Domain) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE profiles
            SET domain = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(domain.as_str())
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!("domain {domain} is already claimed"));
            }
            RepositoryError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Release a profile's domain.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self), fields(profile_id = %id))]
    pub async fn release_domain(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE profiles
            SET domain = NULL, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

impl ProfileStore for ProfileRepository<'_> {
    async fn find_by_domain(&self, domain: &Domain) -> Result<Vec<Profile>, RepositoryError> {
        Self::find_by_domain(self, domain).await
    }
}
