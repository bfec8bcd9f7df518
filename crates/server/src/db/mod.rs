//! Persistence for users and records.
//!
//! # Stores
//!
//! Handlers never talk to a database directly. They go through two traits:
//!
//! - [`UserStore`] - credential storage (`users` table)
//! - [`RecordStore`] - per-user feeding/diaper records (`records` table)
//!
//! Two implementations exist:
//!
//! - [`PgStore`] - `PostgreSQL` via `sqlx`
//! - [`MemoryStore`] - in-process maps, for tests and local development
//!
//! # Schema
//!
//! `PgStore::ensure_schema` creates the two tables if they are missing.
//! `(owner_id, client_id)` is the primary key of `records`, so the store
//! itself guarantees one record per client ID per user.

mod memory;
mod records;
mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use babytrack_core::{ClientRecordId, Email, UserId};

use crate::models::{Record, RecordFields, User};

pub use memory::MemoryStore;

/// Errors returned by store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Credential storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    async fn create_user(
        &self,
        email: &Email,
        password_hash: &str,
        name: Option<&str>,
    ) -> Result<User, RepositoryError>;

    /// Look up a user by exact email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Look up a user together with their stored password hash.
    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;
}

/// Owner-scoped record storage.
///
/// Every operation takes the owner explicitly; there is no way to reach
/// another user's records through this trait.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert the record for `(owner, id)` or update it in place.
    ///
    /// Must be atomic per `(owner, id)`: concurrent upserts of the same pair
    /// never produce two records. See [`Record::apply`] for the update rules.
    async fn upsert(
        &self,
        owner: UserId,
        id: ClientRecordId,
        fields: RecordFields,
    ) -> Result<Record, RepositoryError>;

    /// All records of `owner`, newest timestamp first.
    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Record>, RepositoryError>;

    /// Remove and return the record for `(owner, id)`, if present.
    async fn delete_by_owner_and_id(
        &self,
        owner: UserId,
        id: ClientRecordId,
    ) -> Result<Option<Record>, RepositoryError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed store.
///
/// Cheap to clone; clones share the same pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `users` and `records` tables if they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        name          TEXT,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS records (
        owner_id        UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        client_id       BIGINT NOT NULL,
        event_date      TEXT NOT NULL,
        event_time      TEXT NOT NULL,
        kind            TEXT NOT NULL CHECK (kind IN ('feeding', 'diaper')),
        feeding_type    TEXT,
        diaper_type     TEXT,
        details         TEXT,
        amount          DOUBLE PRECISION,
        event_timestamp BIGINT NOT NULL,
        PRIMARY KEY (owner_id, client_id)
    )
    ",
];

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
fn map_unique_violation(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(what.to_owned());
    }
    RepositoryError::Database(err)
}
