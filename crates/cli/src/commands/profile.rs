//! Profile management commands.

use folio_core::UserId;
use folio_site::db::ProfileRepository;

use super::{CliError, connect};

/// Create an empty profile owned by `user`.
pub async fn create(user: UserId, name: &str) -> Result<(), CliError> {
    let pool = connect().await?;

    let profile = ProfileRepository::new(&pool).create(user, name).await?;

    tracing::info!(
        "Profile created! ID: {}, Name: {}",
        profile.id,
        profile.display_name
    );
    Ok(())
}
