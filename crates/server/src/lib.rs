//! Babytrack server library.
//!
//! Account registration, bearer-token login, and owner-scoped feeding and
//! diaper records behind a JSON API. Exposed as a library so the router can be
//! driven in-process by tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
