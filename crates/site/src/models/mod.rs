//! Domain models for the site.

pub mod profile;

pub use profile::{Avatar, Profile, PublicProfile};
