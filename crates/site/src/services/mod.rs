//! Business logic services.

pub mod avatar;
pub mod tenant;

pub use avatar::{AvatarError, AvatarService};
pub use tenant::{Resolution, TenantResolver};
