//! Profile domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use folio_core::{AboutPage, AvatarTransform, Domain, HomePage, Theme, UserId};

/// A tenant's portfolio profile (domain type).
#[derive(Debug, Clone)]
pub struct Profile {
    /// Owning user, which is also the tenant id.
    pub id: UserId,
    /// Claimed domain, if any.
    pub domain: Option<Domain>,
    /// Name shown on the site.
    pub display_name: String,
    /// Short tagline.
    pub headline: Option<String>,
    /// Home page content.
    pub home: HomePage,
    /// About page content.
    pub about: AboutPage,
    /// Theme settings.
    pub theme: Theme,
    /// Uploaded avatar, if any.
    pub avatar: Option<Avatar>,
    /// Favicon URL.
    pub favicon_url: Option<String>,
    /// Background image URL.
    pub background_url: Option<String>,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}

/// An avatar reference with its pan/zoom state.
#[derive(Debug, Clone, PartialEq)]
pub struct Avatar {
    /// Source image URL in object storage.
    pub url: String,
    /// Normalized crop center and zoom.
    pub transform: AvatarTransform,
}

/// Profile fields exposed to visitors.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub id: UserId,
    pub domain: Option<Domain>,
    pub display_name: String,
    pub headline: Option<String>,
    pub home: HomePage,
    pub about: AboutPage,
    pub theme: Theme,
    /// Composited avatar endpoint, never the raw upload.
    pub avatar_url: Option<String>,
    pub favicon_url: Option<String>,
    pub background_url: Option<String>,
}

impl From<Profile> for PublicProfile {
    fn from(profile: Profile) -> Self {
        let avatar_url = profile
            .avatar
            .as_ref()
            .map(|_| format!("/avatar?profileId={}", profile.id));

        Self {
            id: profile.id,
            domain: profile.domain,
            display_name: profile.display_name,
            headline: profile.headline,
            home: profile.home,
            about: profile.about,
            theme: profile.theme,
            avatar_url,
            favicon_url: profile.favicon_url,
            background_url: profile.background_url,
        }
    }
}
