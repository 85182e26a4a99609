//! Avatar rendering service.
//!
//! Fetches the stored source image, composites it on the blocking pool and
//! caches the result in memory with `moka`.

use std::sync::Arc;

use axum::body::Bytes;
use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::AvatarConfig;
use crate::media::{self, MediaError};
use crate::models::Avatar;

/// Errors from rendering an avatar.
#[derive(Debug, Error)]
pub enum AvatarError {
    /// The source image could not be fetched.
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The source responded with a non-success status.
    #[error("fetch failed: upstream returned {0}")]
    UpstreamStatus(u16),

    /// Decoding, cropping or encoding failed.
    #[error(transparent)]
    Media(#[from] MediaError),

    /// The blocking compositing task panicked or was cancelled.
    #[error("compositing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Cache key: everything that changes the output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AvatarKey {
    url: String,
    size: u32,
    zoom: u64,
    x: u64,
    y: u64,
}

impl AvatarKey {
    fn new(avatar: &Avatar, size: u32) -> Self {
        let position = avatar.transform.position();
        Self {
            url: avatar.url.clone(),
            size,
            zoom: avatar.transform.zoom().to_bits(),
            x: position.x.to_bits(),
            y: position.y.to_bits(),
        }
    }
}

/// Renders square avatars.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AvatarService {
    inner: Arc<AvatarServiceInner>,
}

struct AvatarServiceInner {
    client: reqwest::Client,
    size: u32,
    cache: Cache<AvatarKey, Bytes>,
}

impl AvatarService {
    /// Create a new avatar service.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(config: &AvatarConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .build();

        Ok(Self {
            inner: Arc::new(AvatarServiceInner {
                client,
                size: config.size,
                cache,
            }),
        })
    }

    /// Render `avatar` as a JPEG square.
    ///
    /// # Errors
    ///
    /// Returns `AvatarError` if fetching or compositing fails. Failures are
    /// not cached and not retried.
    #[instrument(skip(self, avatar), fields(url = %avatar.url))]
    pub async fn render(&self, avatar: &Avatar) -> Result<Bytes, AvatarError> {
        let key = AvatarKey::new(avatar, self.inner.size);
        if let Some(hit) = self.inner.cache.get(&key).await {
            debug!("Avatar cache hit");
            return Ok(hit);
        }

        let source = self.fetch(&avatar.url).await?;
        let rendered = self.composite(source, avatar).await?;

        self.inner.cache.insert(key, rendered.clone()).await;
        Ok(rendered)
    }

    /// Composite already-fetched bytes without touching the network or cache.
    ///
    /// # Errors
    ///
    /// Returns `AvatarError::Media` for undecodable input and
    /// `AvatarError::Task` if the blocking task fails.
    pub async fn composite(&self, source: Bytes, avatar: &Avatar) -> Result<Bytes, AvatarError> {
        let size = self.inner.size;
        let transform = avatar.transform;

        let jpeg =
            tokio::task::spawn_blocking(move || media::composite(&source, size, &transform))
                .await??;

        Ok(Bytes::from(jpeg))
    }

    async fn fetch(&self, url: &str) -> Result<Bytes, AvatarError> {
        let response = self.inner.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AvatarError::UpstreamStatus(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        debug!(len = bytes.len(), "Fetched avatar source");
        Ok(bytes)
    }
}
