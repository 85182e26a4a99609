//! Folio site library.
//!
//! Serves each tenant's portfolio by the domain it claimed, plus the
//! composited avatar endpoint. Built as a library so the binary, the CLI and
//! the tests share the same code.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod media;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
