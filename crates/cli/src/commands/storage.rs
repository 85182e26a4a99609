//! Storage key and URL commands.
//!
//! # Environment Variables
//!
//! - `STORAGE_PUBLIC_URL` - Public base URL of the object store
//! - `STORAGE_ENDPOINT` - Object store endpoint, used when no public URL is set
//! - `STORAGE_BUCKET` - Global bucket name (default: portfolio)

use folio_core::{Bucket, StorageLayout};
use folio_site::config::StorageConfig;

use super::CliError;

/// Print the storage key for `path` in `bucket`.
pub fn key(bucket: &Bucket, path: &str) {
    #[allow(clippy::print_stdout)]
    {
        println!("{}", StorageLayout::derive_key(bucket, path));
    }
}

/// Print the public URL for `path` in `bucket`.
pub fn url(bucket: &Bucket, path: &str) -> Result<(), CliError> {
    let url = layout()?.public_url(bucket, path)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{url}");
    }
    Ok(())
}

/// Storage layout from the environment.
pub(super) fn layout() -> Result<StorageLayout, CliError> {
    dotenvy::dotenv().ok();
    Ok(StorageConfig::from_env()?.layout())
}
