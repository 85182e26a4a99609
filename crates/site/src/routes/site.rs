//! Public site data for the tenant addressed by the request host.

use axum::{Json, extract::State, http::HeaderMap};

use crate::error::{AppError, Result};
use crate::models::PublicProfile;
use crate::routes::request_host;
use crate::services::Resolution;
use crate::state::AppState;

/// Serve the public profile of the tenant claiming the request host.
pub async fn show(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PublicProfile>> {
    let host = request_host(&headers);

    match state.tenants().resolve(host).await? {
        Resolution::Found(profile) => Ok(Json(PublicProfile::from(*profile))),
        Resolution::NotFound(domain) => {
            tracing::debug!(%domain, "No profile for domain");
            Err(AppError::NotFound("profile not found".to_string()))
        }
        Resolution::NoEffectiveDomain => Err(AppError::NotFound("domain not claimed".to_string())),
    }
}
