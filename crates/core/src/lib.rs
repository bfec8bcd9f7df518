//! Babytrack Core - Shared domain types.
//!
//! This crate provides the types shared by the Babytrack components:
//! - `server` - HTTP API for accounts and feeding/diaper records
//! - `integration-tests` - End-to-end tests against the API
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP handling. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and record kinds

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
