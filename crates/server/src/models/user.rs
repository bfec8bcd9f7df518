//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use babytrack_core::{Email, UserId};

/// A registered account (domain type).
///
/// The password hash is deliberately not part of this type; it is only read
/// by the credential lookup used during login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Store-assigned user ID.
    pub id: UserId,
    /// Login email, unique across users.
    pub email: Email,
    /// Optional display name.
    pub name: Option<String>,
    /// When the account was registered.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The client-safe projection returned by register and login.
    #[must_use]
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

/// User fields that are safe to send to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub email: Email,
    /// Omitted when the user registered without a name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
