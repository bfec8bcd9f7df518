//! Authentication service.
//!
//! Provides email + password registration and login. Both return a freshly
//! issued bearer token alongside the user.

mod error;

pub use error::AuthError;

use babytrack_core::Email;

use crate::db::{RepositoryError, UserStore};
use crate::models::User;
use crate::services::tokens::TokenService;

/// bcrypt work factor for new password hashes.
pub const BCRYPT_COST: u32 = 10;

/// A user together with a token proving their identity.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: User,
    pub token: String,
}

/// Authentication service.
///
/// Handles user registration and password login.
pub struct AuthService<'a> {
    users: &'a dyn UserStore,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn UserStore, tokens: &'a TokenService) -> Self {
        Self { users, tokens }
    }

    /// Register a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::EmptyPassword` if the password is empty.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<Authenticated, AuthError> {
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }
        let name = name.map(str::trim).filter(|name| !name.is_empty());

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(password).await?;

        // A concurrent registration can still win the race; the unique index
        // reports it as a conflict.
        let user = self
            .users
            .create_user(&email, &password_hash, name)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        let token = self.tokens.issue(user.id)?;
        tracing::info!(user_id = %user.id, "user registered");

        Ok(Authenticated { user, token })
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or
    /// malformed, or the password does not match.
    pub async fn login(&self, email: &str, password: &str) -> Result<Authenticated, AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Err(AuthError::InvalidCredentials);
        };

        let Some((user, password_hash)) = self.users.get_password_hash(&email).await? else {
            tracing::info!("login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &password_hash).await? {
            tracing::info!(user_id = %user.id, "login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id)?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(Authenticated { user, token })
    }
}

/// Hash a password with bcrypt at [`BCRYPT_COST`].
///
/// Runs on the blocking pool; bcrypt is deliberately slow.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub async fn hash_password(password: &str) -> Result<String, AuthError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|_| AuthError::PasswordHash)?
        .map_err(|_| AuthError::PasswordHash)
}

/// Check a plaintext password against a stored bcrypt hash.
///
/// A malformed stored hash never matches.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if the blocking task fails.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .map_err(|_| AuthError::PasswordHash)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::db::MemoryStore;

    fn tokens() -> TokenService {
        TokenService::new(&SecretString::from("kT9#vR2$mQ7!xL4@pW8^nB3&zC6*hJ1%"))
    }

    #[tokio::test]
    async fn test_hash_and_verify_password() {
        let hash = hash_password("p").await.unwrap();

        assert!(hash.starts_with("$2b$10$"));
        assert!(verify_password("p", &hash).await.unwrap());
        assert!(!verify_password("q", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_malformed_hash_is_false() {
        let matched = verify_password("p", "not-a-bcrypt-hash").await.unwrap();
        assert!(!matched);
    }

    #[tokio::test]
    async fn test_register_twice_conflicts() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let auth = AuthService::new(&store, &tokens);

        let first = auth.register("a@x.com", "p", Some("A")).await.unwrap();
        assert_eq!(tokens.verify(&first.token).unwrap(), first.user.id);

        let second = auth.register("a@x.com", "other", None).await;
        assert!(matches!(second, Err(AuthError::UserAlreadyExists)));
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let auth = AuthService::new(&store, &tokens);

        assert!(matches!(
            auth.register("not-an-email", "p", None).await,
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            auth.register("a@x.com", "", None).await,
            Err(AuthError::EmptyPassword)
        ));
    }

    #[tokio::test]
    async fn test_register_blank_name_is_absent() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let auth = AuthService::new(&store, &tokens);

        let registered = auth.register("a@x.com", "p", Some("   ")).await.unwrap();

        assert_eq!(registered.user.name, None);
    }

    #[tokio::test]
    async fn test_login_success_returns_same_user() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let auth = AuthService::new(&store, &tokens);
        let registered = auth.register("a@x.com", "p", None).await.unwrap();

        let logged_in = auth.login("a@x.com", "p").await.unwrap();

        assert_eq!(logged_in.user.id, registered.user.id);
        let token_user = tokens.verify(&logged_in.token).unwrap();
        assert_eq!(token_user, registered.user.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let auth = AuthService::new(&store, &tokens);
        auth.register("a@x.com", "p", None).await.unwrap();

        for (email, password) in [("a@x.com", "wrong"), ("b@x.com", "p"), ("garbage", "p")] {
            assert!(matches!(
                auth.login(email, password).await,
                Err(AuthError::InvalidCredentials)
            ));
        }
    }
}
