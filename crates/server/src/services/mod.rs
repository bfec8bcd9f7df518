//! Business logic services.
//!
//! - [`auth`] - Registration and password login
//! - [`tokens`] - Signed bearer tokens

pub mod auth;
pub mod tokens;

pub use auth::{AuthError, AuthService, Authenticated};
pub use tokens::{TokenError, TokenService};
