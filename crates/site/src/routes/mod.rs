//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database ping)
//! GET  /avatar?profileId=<id>  - Composited avatar JPEG
//! GET  /api/site               - Public profile for the request host
//! ```

pub mod avatar;
pub mod site;

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    routing::get,
};

use crate::state::AppState;

/// Header set by reverse proxies carrying the original host.
pub const FORWARDED_HOST_HEADER: &str = "x-forwarded-host";

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/avatar", get(avatar::show))
        .route("/api/site", get(site::show))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// The host a request was addressed to.
///
/// The first `X-Forwarded-Host` value wins over `Host`; missing headers
/// yield an empty string.
#[must_use]
pub fn request_host(headers: &HeaderMap) -> &str {
    headers
        .get(FORWARDED_HOST_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .or_else(|| headers.get(header::HOST).and_then(|v| v.to_str().ok()))
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{HeaderValue, Request},
        response::Response,
    };
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{AvatarConfig, SiteConfig, StorageConfig};

    /// State over a pool that never connects unless a handler queries it.
    pub(crate) fn test_state(fallback: Option<&str>) -> AppState {
        let config = SiteConfig {
            database_url: SecretString::from("postgres://folio@127.0.0.1:1/folio_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            fallback_domain: fallback.and_then(folio_core::Domain::from_host),
            storage: StorageConfig {
                public_url: Some("https://cdn.example.com".to_string()),
                endpoint: None,
                bucket: "portfolio".to_string(),
            },
            avatar: AvatarConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        };
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://folio@127.0.0.1:1/folio_test")
            .unwrap();
        AppState::new(config, pool).unwrap()
    }

    pub(crate) async fn get(state: AppState, uri: &str) -> Response {
        routes()
            .with_state(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub(crate) async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = get(test_state(None), "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_without_database() {
        let response = get(test_state(None), "/health/ready").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_request_host_prefers_forwarded_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("internal:8080"));
        assert_eq!(request_host(&headers), "internal:8080");

        headers.insert(
            FORWARDED_HOST_HEADER,
            HeaderValue::from_static("www.macm.dev, proxy.local"),
        );
        assert_eq!(request_host(&headers), "www.macm.dev");
    }

    #[test]
    fn test_request_host_missing() {
        assert_eq!(request_host(&HeaderMap::new()), "");
    }
}
