//! End-to-end tests for the Babytrack API.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process server over the memory store
//! cargo test -p babytrack-integration-tests
//!
//! # Against a running server instead
//! BABYTRACK_BASE_URL=http://localhost:5000 cargo test -p babytrack-integration-tests
//!
//! # PostgreSQL store tests
//! TEST_DATABASE_URL=postgres://localhost/babytrack_test \
//!     cargo test -p babytrack-integration-tests -- --ignored
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io;
use std::net::SocketAddr;

use babytrack_server::{
    config::{MEMORY_DATABASE_URL, ServerConfig},
    db::MemoryStore,
    routes,
    state::AppState,
};
use reqwest::{Client, Response};
use secrecy::SecretString;
use serde_json::Value;
use uuid::Uuid;

/// Signing secret used by in-process servers.
pub const TEST_JWT_SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%d";

/// Configuration for an in-process server over the memory store.
#[must_use]
pub fn memory_config() -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from(MEMORY_DATABASE_URL),
        jwt_secret: SecretString::from(TEST_JWT_SECRET),
        host: std::net::Ipv4Addr::LOCALHOST.into(),
        port: 0,
        static_dir: "public".into(),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Bind the router on an ephemeral local port and serve it in the background.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound.
pub async fn spawn_memory_server() -> io::Result<SocketAddr> {
    let config = memory_config();
    let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
    let addr = listener.local_addr()?;
    let app = routes::router(AppState::new(config, MemoryStore::new()));

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(addr)
}

/// HTTP client bound to one server.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Use `BABYTRACK_BASE_URL` if set, otherwise start an in-process server.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-process server cannot be started.
    pub async fn new() -> io::Result<Self> {
        let base_url = match std::env::var("BABYTRACK_BASE_URL") {
            Ok(url) => url.trim_end_matches('/').to_string(),
            Err(_) => format!("http://{}", spawn_memory_server().await?),
        };

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `POST` a JSON body, with an optional bearer token.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the request cannot be sent.
    pub async fn post(
        &self,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> reqwest::Result<Response> {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await
    }

    /// `GET` with an optional bearer token.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the request cannot be sent.
    pub async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Result<Response> {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await
    }

    /// `DELETE` with an optional bearer token.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the request cannot be sent.
    pub async fn delete(&self, path: &str, token: Option<&str>) -> reqwest::Result<Response> {
        let mut request = self.client.delete(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await
    }
}

/// A unique email so tests can share a long-running server.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.test", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use babytrack_server::config::validate_secret_strength;

    use super::*;

    #[test]
    fn test_jwt_secret_passes_config_validation() {
        let result = validate_secret_strength(TEST_JWT_SECRET, "BABYTRACK_JWT_SECRET");
        assert!(result.is_ok());
    }
}
