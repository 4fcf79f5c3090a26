//! Token login, logout and request authentication.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::entities::User;
use crate::domain::repositories::{TokenRepository, UserRepository};
use crate::error::AppError;
use crate::utils::{password, token};
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Service for issuing and checking auth tokens.
///
/// Tokens are hashed with HMAC-SHA256 (keyed by `signing_secret`) before storage
/// and comparison. An attacker with read-only access to the database cannot verify
/// or forge tokens without the server-side secret.
pub struct AuthService<T: TokenRepository + ?Sized, U: UserRepository + ?Sized> {
    tokens: Arc<T>,
    users: Arc<U>,
    signing_secret: String,
}

impl<T: TokenRepository + ?Sized, U: UserRepository + ?Sized> AuthService<T, U> {
    /// Creates a new authentication service.
    ///
    /// `signing_secret` must match the value used when existing tokens were issued.
    pub fn new(tokens: Arc<T>, users: Arc<U>, signing_secret: String) -> Self {
        Self {
            tokens,
            users,
            signing_secret,
        }
    }

    /// Hashes a raw token with HMAC-SHA256 using the server signing secret.
    ///
    /// Returns a 64-character lowercase hex-encoded MAC.
    pub fn hash_token(&self, token: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(token.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Checks credentials and issues a new token.
    ///
    /// Returns the raw token; only its hash is stored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the email is unknown or the password
    /// does not match. Both cases produce the same message.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let invalid = || {
            AppError::bad_request(
                "Unable to log in with provided credentials",
                json!({ "non_field_errors": ["Unable to log in with provided credentials"] }),
            )
        };

        let user = self.users.find_by_email(email).await?.ok_or_else(invalid)?;
        let stored_hash = self
            .users
            .password_hash(user.id)
            .await?
            .ok_or_else(invalid)?;

        if !password::verify_password(password, &stored_hash) {
            tracing::info!(user_id = user.id, "Login rejected: wrong password");
            return Err(invalid());
        }

        let raw = token::generate_token();
        self.tokens
            .create_token(user.id, &self.hash_token(&raw))
            .await?;

        tracing::info!(user_id = user.id, "Issued auth token");
        Ok(raw)
    }

    /// Resolves a raw token to its user.
    ///
    /// On success the token's `last_used_at` is refreshed; a failure to do so is
    /// logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is unknown or revoked.
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        let token_hash = self.hash_token(token);

        let user = self
            .tokens
            .find_user_by_token(&token_hash)
            .await?
            .ok_or_else(|| {
                AppError::unauthorized(
                    "Invalid token",
                    json!({ "reason": "Invalid or revoked token" }),
                )
            })?;

        if let Err(e) = self.tokens.update_last_used(&token_hash).await {
            tracing::warn!(error = %e, "Failed to update token last_used_at");
        }

        Ok(user)
    }

    /// Revokes a raw token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token was not active.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        if self.tokens.revoke_token(&self.hash_token(token)).await? {
            Ok(())
        } else {
            Err(AppError::unauthorized(
                "Invalid token",
                json!({ "reason": "Invalid or revoked token" }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockTokenRepository, MockUserRepository};
    use crate::test_support::sample_user;

    fn test_secret() -> String {
        "test-signing-secret".to_string()
    }

    fn compute_expected_hash(token: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(test_secret().as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(token.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn service(
        tokens: MockTokenRepository,
        users: MockUserRepository,
    ) -> AuthService<MockTokenRepository, MockUserRepository> {
        AuthService::new(Arc::new(tokens), Arc::new(users), test_secret())
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mut tokens = MockTokenRepository::new();
        let expected_hash = compute_expected_hash("valid-token");

        tokens
            .expect_find_user_by_token()
            .withf(move |hash| hash == expected_hash)
            .times(1)
            .returning(|_| Ok(Some(sample_user(1))));
        tokens
            .expect_update_last_used()
            .times(1)
            .returning(|_| Ok(()));

        let user = service(tokens, MockUserRepository::new())
            .authenticate("valid-token")
            .await
            .unwrap();

        assert_eq!(user.id, 1);
    }

    #[tokio::test]
    async fn test_authenticate_invalid_token() {
        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_find_user_by_token()
            .times(1)
            .returning(|_| Ok(None));

        let result = service(tokens, MockUserRepository::new())
            .authenticate("invalid-token")
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_login_issues_hashed_token() {
        let hash = password::hash_password("correct-horse").unwrap();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(sample_user(4))));
        users
            .expect_password_hash()
            .returning(move |_| Ok(Some(hash.clone())));

        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_create_token()
            .withf(|user_id, hash| *user_id == 4 && hash.len() == 64)
            .times(1)
            .returning(|user_id, hash| {
                Ok(crate::domain::repositories::AuthToken {
                    id: 1,
                    user_id,
                    token_hash: hash.to_string(),
                    created_at: chrono::Utc::now(),
                    revoked_at: None,
                })
            });

        let raw = service(tokens, users)
            .login("u4@example.com", "correct-horse")
            .await
            .unwrap();

        assert_eq!(raw.len(), token::TOKEN_LEN);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let hash = password::hash_password("correct-horse").unwrap();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(sample_user(4))));
        users
            .expect_password_hash()
            .returning(move |_| Ok(Some(hash.clone())));

        let mut tokens = MockTokenRepository::new();
        tokens.expect_create_token().never();

        let result = service(tokens, users)
            .login("u4@example.com", "battery-staple")
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));

        let result = service(MockTokenRepository::new(), users)
            .login("nobody@example.com", "whatever")
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_logout_unknown_token() {
        let mut tokens = MockTokenRepository::new();
        tokens.expect_revoke_token().returning(|_| Ok(false));

        let result = service(tokens, MockUserRepository::new())
            .logout("gone")
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }

    #[test]
    fn test_hash_token_consistency_and_secret() {
        let svc = service(MockTokenRepository::new(), MockUserRepository::new());
        let other = AuthService::new(
            Arc::new(MockTokenRepository::new()),
            Arc::new(MockUserRepository::new()),
            "secret-b".to_string(),
        );

        assert_eq!(svc.hash_token("test-token"), svc.hash_token("test-token"));
        assert_eq!(svc.hash_token("test-token").len(), 64);
        assert_ne!(svc.hash_token("token1"), svc.hash_token("token2"));
        assert_ne!(svc.hash_token("token"), other.hash_token("token"));
    }
}
