//! Custom domain commands.
//!
//! # Usage
//!
//! ```bash
//! folio-cli domain claim --profile <uuid> --domain www.ada.dev
//! folio-cli domain release --profile <uuid>
//! folio-cli domain resolve ada.dev:443
//! ```

use folio_core::{Domain, UserId};
use folio_site::config::fallback_domain_from_env;
use folio_site::db::ProfileRepository;
use folio_site::services::{Resolution, TenantResolver};

use super::{CliError, connect};

/// Claim a domain for a profile.
///
/// The host is normalized first, so `WWW.Ada.dev:443` stores `ada.dev`.
pub async fn claim(profile: UserId, host: &str) -> Result<(), CliError> {
    let domain = Domain::from_host(host).ok_or_else(|| CliError::InvalidDomain(host.to_owned()))?;

    let pool = connect().await?;
    ProfileRepository::new(&pool)
        .claim_domain(profile, &domain)
        .await?;

    tracing::info!("Domain {} claimed for profile {}", domain, profile);
    Ok(())
}

/// Release a profile's domain.
pub async fn release(profile: UserId) -> Result<(), CliError> {
    let pool = connect().await?;
    ProfileRepository::new(&pool).release_domain(profile).await?;

    tracing::info!("Domain released for profile {}", profile);
    Ok(())
}

/// Print which profile a host resolves to.
///
/// Honors `SITE_FALLBACK_DOMAIN` the same way the site does.
pub async fn resolve(host: &str) -> Result<(), CliError> {
    let pool = connect().await?;
    let fallback = fallback_domain_from_env()?;
    let resolver = TenantResolver::new(ProfileRepository::new(&pool), fallback);

    let line = match resolver.resolve(host).await? {
        Resolution::Found(profile) => format!("{}\t{}", profile.id, profile.display_name),
        Resolution::NotFound(domain) => format!("no profile claims {domain}"),
        Resolution::NoEffectiveDomain => format!("'{host}' has no effective domain"),
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{line}");
    }
    Ok(())
}
