//! Tenant resolution: map a request host to the profile that claimed it.

use folio_core::Domain;
use tracing::{debug, error, instrument};

use crate::db::{ProfileStore, RepositoryError};
use crate::models::Profile;

/// Outcome of resolving a host.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// A profile claims the domain.
    Found(Box<Profile>),
    /// The host has a domain but nobody claims it.
    NotFound(Domain),
    /// The host reduces to nothing worth looking up (empty or `localhost`).
    NoEffectiveDomain,
}

/// Resolves hosts to tenants through a [`ProfileStore`].
pub struct TenantResolver<S> {
    store: S,
    fallback: Option<Domain>,
}

impl<S: ProfileStore> TenantResolver<S> {
    /// Create a resolver.
    ///
    /// `fallback` is looked up in place of hosts without an effective domain,
    /// which keeps `localhost` usable during development.
    pub const fn new(store: S, fallback: Option<Domain>) -> Self {
        Self { store, fallback }
    }

    /// Resolve a raw host header value.
    ///
    /// Issues at most one store query. When more than one profile claims the
    /// domain the first is returned and the violation is logged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    #[instrument(skip(self))]
    pub async fn resolve(&self, host: &str) -> Result<Resolution, RepositoryError> {
        let Some(domain) = Domain::from_host(host).or_else(|| self.fallback.clone()) else {
            debug!("Host has no effective domain");
            return Ok(Resolution::NoEffectiveDomain);
        };

        let mut profiles = self.store.find_by_domain(&domain).await?;

        if profiles.len() > 1 {
            let ids: Vec<String> = profiles.iter().map(|p| p.id.to_string()).collect();
            error!(
                domain = %domain,
                profile_ids = ?ids,
                "Domain claimed by more than one profile, serving the oldest"
            );
        }

        if profiles.is_empty() {
            return Ok(Resolution::NotFound(domain));
        }

        Ok(Resolution::Found(Box::new(profiles.swap_remove(0))))
    }
}
