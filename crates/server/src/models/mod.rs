//! Domain models for the server.
//!
//! These types are separate from database row types and from the request
//! bodies accepted by the routes.

pub mod record;
pub mod user;

pub use record::{Record, RecordFields};
pub use user::{User, UserSummary};
