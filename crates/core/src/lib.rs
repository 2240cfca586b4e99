//! Chronify Core - Shared domain types.
//!
//! This crate provides the types used across the Chronify components:
//! - `dashboard` - Inventory dashboard (HTTP server and services)
//! - `cli` - Command-line tools for migrations and reports
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Database encoding is available behind the `postgres`
//! feature.
//!
//! # Modules
//!
//! - [`types`] - Validated wrappers for emails, part numbers, part status and
//!   raw stock quantity input

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
