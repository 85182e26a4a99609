//! Avatar route: the profile's stored image, cropped and scaled the way the
//! editor previewed it.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use folio_core::{Bucket, StorageError, StorageLayout, UserId};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::Avatar;
use crate::state::AppState;

/// `Cache-Control` sent with rendered avatars.
pub const AVATAR_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Query parameters for `/avatar`.
#[derive(Debug, Deserialize)]
pub struct AvatarQuery {
    #[serde(rename = "profileId")]
    pub profile_id: Option<String>,
}

/// Serve a profile's composited avatar.
pub async fn show(
    State(state): State<AppState>,
    Query(query): Query<AvatarQuery>,
) -> Result<Response> {
    let id = parse_profile_id(query.profile_id.as_deref())?;

    let profile = state
        .profiles()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("profile not found".to_string()))?;

    let avatar = profile
        .avatar
        .ok_or_else(|| AppError::NotFound("avatar not found".to_string()))?;

    let avatar = Avatar {
        url: source_url(state.storage(), &avatar.url)?,
        ..avatar
    };

    let jpeg = state.avatars().render(&avatar).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CACHE_CONTROL, AVATAR_CACHE_CONTROL),
        ],
        jpeg,
    )
        .into_response())
}

fn parse_profile_id(raw: Option<&str>) -> Result<UserId> {
    let raw = raw
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("profileId is required".to_string()))?;

    raw.parse()
        .map_err(|_| AppError::BadRequest("profileId must be a UUID".to_string()))
}

/// Absolute URL of a stored avatar.
///
/// Older rows hold full URLs; newer ones may hold a path inside the
/// profile-images bucket.
fn source_url(storage: &StorageLayout, stored: &str) -> std::result::Result<String, StorageError> {
    if stored.starts_with("https://") || stored.starts_with("http://") {
        return Ok(stored.to_string());
    }
    storage.public_url(&Bucket::ProfileImages, stored.trim_start_matches('/'))
}
