//! Folio Core - Shared types and pure logic.
//!
//! This crate provides the types used across all Folio components:
//! - `site` - Public tenant sites and the avatar endpoint
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and makes the
//! tenant and image math testable in isolation.
//!
//! # Modules
//!
//! - [`types`] - IDs, domain normalization, storage layout, avatar geometry
//!   and typed profile content

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
