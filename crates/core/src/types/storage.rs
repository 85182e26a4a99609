//! Object storage layout: logical buckets, storage keys and public URLs.
//!
//! Every uploaded asset lives in one global bucket. Logical buckets are
//! folder prefixes inside it, and uploads are namespaced by owner and
//! suffixed with a millisecond timestamp so two uploads never collide.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Errors from storage URL derivation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Neither a public base URL nor an endpoint is configured.
    #[error("storage public URL is not configured (set STORAGE_PUBLIC_URL or STORAGE_ENDPOINT)")]
    MissingBaseUrl,
}

/// A logical bucket: a named category of uploaded assets.
///
/// Unknown names are carried through as [`Bucket::Custom`] and used as their
/// own folder prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Bucket {
    ProfileImages,
    BackgroundImages,
    ProjectImages,
    Favicons,
    Resumes,
    Custom(String),
}

impl Bucket {
    /// Logical name as used by callers and in configuration.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::ProfileImages => "profile-images",
            Self::BackgroundImages => "background-images",
            Self::ProjectImages => "project-images",
            Self::Favicons => "favicons",
            Self::Resumes => "resumes",
            Self::Custom(name) => name,
        }
    }

    /// Folder prefix inside the global bucket.
    ///
    /// Every logical bucket is stored under a folder of its own name.
    #[must_use]
    pub fn folder(&self) -> &str {
        self.name()
    }
}

impl FromStr for Bucket {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "profile-images" => Self::ProfileImages,
            "background-images" => Self::BackgroundImages,
            "project-images" => Self::ProjectImages,
            "favicons" => Self::Favicons,
            "resumes" => Self::Resumes,
            other => Self::Custom(other.to_owned()),
        })
    }
}

impl From<String> for Bucket {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(bucket) => bucket,
            Err(never) => match never {},
        }
    }
}

impl From<Bucket> for String {
    fn from(bucket: Bucket) -> Self {
        bucket.name().to_owned()
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output encoding chosen for a prepared image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageEncoding {
    Jpeg,
    Png,
}

impl ImageEncoding {
    /// File extension for stored objects.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// MIME type sent with the stored object.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// What an uploaded image is for.
///
/// Callers state the purpose explicitly; it decides the bucket and how the
/// image is prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImagePurpose {
    Avatar,
    Background,
    Project,
    Favicon,
}

impl ImagePurpose {
    /// Bucket the image is stored in.
    #[must_use]
    pub const fn bucket(self) -> Bucket {
        match self {
            Self::Avatar => Bucket::ProfileImages,
            Self::Background => Bucket::BackgroundImages,
            Self::Project => Bucket::ProjectImages,
            Self::Favicon => Bucket::Favicons,
        }
    }

    /// Longest edge, in pixels, kept after preparation.
    #[must_use]
    pub const fn max_edge(self) -> u32 {
        match self {
            Self::Avatar => 1024,
            Self::Background => 2560,
            Self::Project => 1920,
            Self::Favicon => 512,
        }
    }

    /// Encoding of the prepared image.
    #[must_use]
    pub const fn encoding(self) -> ImageEncoding {
        match self {
            Self::Favicon => ImageEncoding::Png,
            Self::Avatar | Self::Background | Self::Project => ImageEncoding::Jpeg,
        }
    }
}

impl FromStr for ImagePurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "avatar" => Ok(Self::Avatar),
            "background" => Ok(Self::Background),
            "project" => Ok(Self::Project),
            "favicon" => Ok(Self::Favicon),
            other => Err(format!(
                "unknown image purpose '{other}' (expected avatar, background, project or favicon)"
            )),
        }
    }
}

/// Relative upload path for a new object: `{owner}/{millis}.{ext}`.
#[must_use]
pub fn upload_path(owner: UserId, extension: &str, at: DateTime<Utc>) -> String {
    format!("{owner}/{}.{extension}", at.timestamp_millis())
}

/// Where an upload will live once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadTarget {
    /// Path inside the logical bucket.
    pub path: String,
    /// Key inside the global bucket.
    pub key: String,
    /// Publicly reachable URL of the object.
    pub public_url: String,
}

/// Storage configuration needed to derive keys and public URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    public_base_url: Option<String>,
    endpoint: Option<String>,
    bucket_name: String,
}

impl StorageLayout {
    /// Create a layout.
    ///
    /// `public_base_url` wins over `endpoint` when both are set.
    #[must_use]
    pub fn new(
        public_base_url: Option<String>,
        endpoint: Option<String>,
        bucket_name: impl Into<String>,
    ) -> Self {
        Self {
            public_base_url,
            endpoint,
            bucket_name: bucket_name.into(),
        }
    }

    /// Storage key for a path inside a logical bucket: `{folder}/{path}`.
    #[must_use]
    pub fn derive_key(bucket: &Bucket, relative_path: &str) -> String {
        format!("{}/{relative_path}", bucket.folder())
    }

    /// Public URL for a path inside a logical bucket.
    ///
    /// Exactly one trailing slash is removed from the configured base. A base
    /// ending in `//` therefore produces a double slash in the result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::MissingBaseUrl` if neither a public base URL
    /// nor an endpoint is configured.
    pub fn public_url(&self, bucket: &Bucket, relative_path: &str) -> Result<String, StorageError> {
        let base = self
            .public_base_url
            .as_deref()
            .or(self.endpoint.as_deref())
            .filter(|base| !base.is_empty())
            .ok_or(StorageError::MissingBaseUrl)?;
        let base = base.strip_suffix('/').unwrap_or(base);
        let key = Self::derive_key(bucket, relative_path);

        Ok(format!("{base}/{}/{key}", self.bucket_name))
    }

    /// Key and public URL for a fresh upload by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::MissingBaseUrl` if no base URL is configured.
    pub fn upload_target(
        &self,
        bucket: &Bucket,
        owner: UserId,
        extension: &str,
        at: DateTime<Utc>,
    ) -> Result<UploadTarget, StorageError> {
        let path = upload_path(owner, extension, at);
        Ok(UploadTarget {
            key: Self::derive_key(bucket, &path),
            public_url: self.public_url(bucket, &path)?,
            path,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;

    fn layout(base: Option<&str>) -> StorageLayout {
        StorageLayout::new(base.map(String::from), None, "portfolio")
    }

    #[test]
    fn test_derive_key_known_bucket() {
        let bucket: Bucket = "profile-images".parse().unwrap();
        assert_eq!(bucket, Bucket::ProfileImages);
        assert_eq!(
            StorageLayout::derive_key(&bucket, "u1/1.png"),
            "profile-images/u1/1.png"
        );
    }

    #[test]
    fn test_derive_key_unknown_bucket_passes_through() {
        let bucket: Bucket = "unknown-bucket".parse().unwrap();
        assert_eq!(bucket, Bucket::Custom("unknown-bucket".to_owned()));
        assert_eq!(StorageLayout::derive_key(&bucket, "x"), "unknown-bucket/x");
    }

    #[test]
    fn test_bucket_names_round_trip() {
        for name in [
            "profile-images",
            "background-images",
            "project-images",
            "favicons",
            "resumes",
            "anything-else",
        ] {
            let bucket: Bucket = name.parse().unwrap();
            assert_eq!(bucket.name(), name);
            assert_eq!(bucket.folder(), name);
        }
    }

    #[test]
    fn test_public_url_joins_parts() {
        let url = layout(Some("https://cdn.example.com"))
            .public_url(&Bucket::Resumes, "u1/2.pdf")
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/portfolio/resumes/u1/2.pdf");
    }

    #[test]
    fn test_public_url_strips_one_trailing_slash() {
        let url = layout(Some("https://cdn.example.com/"))
            .public_url(&Bucket::Favicons, "a.png")
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/portfolio/favicons/a.png");
    }

    #[test]
    fn test_public_url_strips_only_one_trailing_slash() {
        let url = layout(Some("https://cdn.example.com//"))
            .public_url(&Bucket::Favicons, "a.png")
            .unwrap();
        assert_eq!(url, "https://cdn.example.com//portfolio/favicons/a.png");
    }

    #[test]
    fn test_public_url_falls_back_to_endpoint() {
        let layout = StorageLayout::new(None, Some("http://minio:9000".into()), "assets");
        let url = layout
            .public_url(&Bucket::ProjectImages, "p/1.jpg")
            .unwrap();
        assert_eq!(url, "http://minio:9000/assets/project-images/p/1.jpg");
    }

    #[test]
    fn test_public_url_missing_base_is_config_error() {
        let err = layout(None)
            .public_url(&Bucket::ProfileImages, "x")
            .unwrap_err();
        assert_eq!(err, StorageError::MissingBaseUrl);

        let err = layout(Some(""))
            .public_url(&Bucket::ProfileImages, "x")
            .unwrap_err();
        assert_eq!(err, StorageError::MissingBaseUrl);
    }

    #[test]
    fn test_upload_target_is_owner_namespaced_and_timestamped() {
        let owner = UserId::new(Uuid::nil());
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let target = layout(Some("https://cdn.example.com"))
            .upload_target(&ImagePurpose::Avatar.bucket(), owner, "jpg", at)
            .unwrap();

        assert_eq!(
            target.path,
            "00000000-0000-0000-0000-000000000000/1700000000123.jpg"
        );
        assert_eq!(
            target.key,
            "profile-images/00000000-0000-0000-0000-000000000000/1700000000123.jpg"
        );
        assert_eq!(
            target.public_url,
            "https://cdn.example.com/portfolio/profile-images/00000000-0000-0000-0000-000000000000/1700000000123.jpg"
        );
    }

    #[test]
    fn test_image_purpose_parse() {
        assert_eq!("favicon".parse::<ImagePurpose>(), Ok(ImagePurpose::Favicon));
        assert!("banner".parse::<ImagePurpose>().is_err());
        assert_eq!(ImagePurpose::Favicon.encoding(), ImageEncoding::Png);
        assert_eq!(ImagePurpose::Background.bucket(), Bucket::BackgroundImages);
    }
}
