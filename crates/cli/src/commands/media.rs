//! Media preparation command.
//!
//! Downsizes and re-encodes a local image the way uploads are stored, writes
//! it under the name its storage key will use, and prints the key and URL.
//! Needs `STORAGE_PUBLIC_URL` or `STORAGE_ENDPOINT` to be set.

use std::path::Path;

use chrono::Utc;
use folio_core::{ImagePurpose, UserId};
use folio_site::media::prepare_upload;

use super::CliError;
use super::storage::layout;

/// Prepare `file` for upload as `purpose` on behalf of `owner`.
pub async fn prepare(
    file: &Path,
    purpose: ImagePurpose,
    owner: UserId,
    out_dir: &Path,
) -> Result<(), CliError> {
    let layout = layout()?;

    let source = tokio::fs::read(file).await?;
    tracing::info!("Read {} ({} bytes)", file.display(), source.len());

    let prepared = tokio::task::spawn_blocking(move || prepare_upload(purpose, &source))
        .await
        .map_err(|e| CliError::Io(std::io::Error::other(e)))??;

    let target = layout.upload_target(&purpose.bucket(), owner, prepared.extension, Utc::now())?;

    let file_name = target.path.rsplit('/').next().unwrap_or(&target.path);
    tokio::fs::create_dir_all(out_dir).await?;
    let out_path = out_dir.join(file_name);
    tokio::fs::write(&out_path, &prepared.bytes).await?;

    tracing::info!(
        "Wrote {} ({}x{}, {}, {} bytes)",
        out_path.display(),
        prepared.width,
        prepared.height,
        prepared.content_type,
        prepared.bytes.len()
    );

    #[allow(clippy::print_stdout)]
    {
        println!("key\t{}", target.key);
        println!("url\t{}", target.public_url);
    }
    Ok(())
}
