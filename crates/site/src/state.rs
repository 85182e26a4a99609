//! Application state shared across handlers.

use std::sync::Arc;

use folio_core::StorageLayout;
use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::db::ProfileRepository;
use crate::services::{AvatarService, TenantResolver};

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: PgPool,
    storage: StorageLayout,
    avatars: AvatarService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Site configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the avatar HTTP client cannot be built.
    pub fn new(config: SiteConfig, pool: PgPool) -> Result<Self, StateError> {
        let storage = config.storage.layout();
        let avatars = AvatarService::new(&config.avatar)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                storage,
                avatars,
            }),
        })
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the object storage layout.
    #[must_use]
    pub fn storage(&self) -> &StorageLayout {
        &self.inner.storage
    }

    /// Get a reference to the avatar service.
    #[must_use]
    pub fn avatars(&self) -> &AvatarService {
        &self.inner.avatars
    }

    /// A profile repository over the shared pool.
    #[must_use]
    pub fn profiles(&self) -> ProfileRepository<'_> {
        ProfileRepository::new(self.pool())
    }

    /// A tenant resolver using the configured fallback domain.
    #[must_use]
    pub fn tenants(&self) -> TenantResolver<ProfileRepository<'_>> {
        TenantResolver::new(self.profiles(), self.config().fallback_domain.clone())
    }
}
