//! Core types for Folio.
//!
//! This module provides type-safe wrappers and pure logic for tenant
//! resolution, storage layout and avatar geometry.

pub mod avatar;
pub mod content;
pub mod domain;
pub mod id;
pub mod storage;

pub use avatar::{AvatarTransform, CropError, CropPlan, Extract, Position};
pub use content::{AboutPage, HomePage, Link, Theme, decode_or_default};
pub use domain::{Domain, NoEffectiveDomain, normalize_host};
pub use id::*;
pub use storage::{
    Bucket, ImageEncoding, ImagePurpose, StorageError, StorageLayout, UploadTarget, upload_path,
};
