// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sign-up, login, refresh and access-token authentication.
//!
//! `sign_up` performs exactly one store write. `login`, `refresh` and
//! `authenticate` never write.

use std::sync::Arc;

use super::error::AuthError;
use super::password::PasswordHasher;
use super::tokens::TokenService;
use crate::models::{TokenPair, User};
use crate::storage::{NewUser, StoreError, UserStore};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher, tokens: TokenService) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Register a new account (no role attached) and return its first pair.
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<TokenPair, AuthError> {
        let password_hash = self.hasher.hash_blocking(password).await?;

        let user = self
            .users
            .create(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
                role_id: None,
            })
            .await
            .map_err(|e| email_conflict(e, email))
            .inspect_err(|e| tracing::warn!(email = %email, error = %e, "Sign-up rejected"))?;

        tracing::info!(user_id = user.id, "User signed up");
        self.tokens.issue_pair(user.id)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            tracing::warn!(email = %email, "Login for unknown email");
            return Err(AuthError::NotFound(format!("User with email {email}")));
        };

        if !self
            .hasher
            .verify_blocking(password, &user.password_hash)
            .await?
        {
            tracing::warn!(user_id = user.id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = user.id, "User logged in");
        self.tokens.issue_pair(user.id)
    }

    /// Exchange a valid refresh token for a new pair. Both tokens rotate.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let user_id = self
            .tokens
            .verify_refresh(refresh_token)
            .inspect_err(|_| tracing::warn!("Refresh with invalid token"))?;

        tracing::info!(user_id, "Tokens refreshed");
        self.tokens.issue_pair(user_id)
    }

    /// Resolve the user behind an access token.
    ///
    /// A valid token whose user has since been deleted is rejected as
    /// [`AuthError::InvalidToken`].
    pub async fn authenticate(&self, access_token: &str) -> Result<User, AuthError> {
        let user_id = self
            .tokens
            .verify_access(access_token)?
            .subject_id()
            .ok_or(AuthError::InvalidToken)?;

        match self.users.find_by_id(user_id).await? {
            Some(user) => Ok(user),
            None => {
                tracing::warn!(user_id, "Access token for missing user");
                Err(AuthError::InvalidToken)
            }
        }
    }
}

/// Translate a duplicate-email store failure.
pub(crate) fn email_conflict(e: StoreError, email: &str) -> AuthError {
    match e {
        StoreError::UniqueViolation(_) => AuthError::EmailConflict(email.to_string()),
        other => other.into(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Duration;

    use super::*;
    use crate::auth::tokens::TokenSettings;
    use crate::storage::{InMemoryStore, StoreResult, UserChanges};

    /// Store wrapper that counts write calls.
    #[derive(Default)]
    pub(crate) struct CountingStore {
        pub inner: InMemoryStore,
        pub writes: AtomicUsize,
    }

    impl CountingStore {
        pub fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UserStore for CountingStore {
        async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
            self.inner.find_by_id(id).await
        }

        async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
            self.inner.find_by_email(email).await
        }

        async fn list(&self) -> StoreResult<Vec<User>> {
            self.inner.list().await
        }

        async fn create(&self, user: NewUser) -> StoreResult<User> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.create(user).await
        }

        async fn update(&self, id: i64, changes: UserChanges) -> StoreResult<User> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.update(id, changes).await
        }

        async fn delete(&self, id: i64) -> StoreResult<User> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.delete(id).await
        }
    }

    pub(crate) fn token_settings() -> TokenSettings {
        TokenSettings {
            access_secret: "test-access-secret".to_string(),
            refresh_secret: "test-refresh-secret".to_string(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
        }
    }

    fn service() -> (AuthService, Arc<CountingStore>) {
        let store = Arc::new(CountingStore::default());
        let service = AuthService::new(
            store.clone(),
            PasswordHasher::new(1).unwrap(),
            TokenService::new(&token_settings()),
        );
        (service, store)
    }

    fn access_subject(service: &AuthService, pair: &TokenPair) -> Option<i64> {
        service
            .tokens()
            .verify_access(&pair.access_token)
            .unwrap()
            .subject_id()
    }

    #[tokio::test]
    async fn sign_up_issues_tokens_for_new_user() {
        let (service, store) = service();
        let pair = service
            .sign_up("Jane", "jane@x.com", "s3cret!")
            .await
            .unwrap();

        let user = store.find_by_email("jane@x.com").await.unwrap().unwrap();
        assert_eq!(access_subject(&service, &pair), Some(user.id));
        assert_ne!(user.password_hash, "s3cret!");
        assert!(user.role.is_none());
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn duplicate_sign_up_is_conflict_without_new_user() {
        let (service, store) = service();
        service.sign_up("Jane", "jane@x.com", "s3cret!").await.unwrap();

        let err = service
            .sign_up("Other", "jane@x.com", "different")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailConflict(ref e) if e == "jane@x.com"));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn login_distinguishes_unknown_email_from_wrong_password() {
        let (service, store) = service();
        service.sign_up("Jane", "jane@x.com", "s3cret!").await.unwrap();
        let writes = store.writes();

        assert!(matches!(
            service.login("nobody@x.com", "s3cret!").await,
            Err(AuthError::NotFound(_))
        ));
        assert!(matches!(
            service.login("jane@x.com", "wrong-password").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(service.login("jane@x.com", "s3cret!").await.is_ok());
        assert_eq!(store.writes(), writes);
    }

    #[tokio::test]
    async fn refresh_rotates_both_tokens_without_writes() {
        let (service, store) = service();
        let first = service
            .sign_up("Jane", "jane@x.com", "s3cret!")
            .await
            .unwrap();
        let id = access_subject(&service, &first);
        let writes = store.writes();

        let second = service.refresh(&first.refresh_token).await.unwrap();
        let third = service.refresh(&first.refresh_token).await.unwrap();

        assert_ne!(second.access_token, first.access_token);
        assert_ne!(second.refresh_token, first.refresh_token);
        assert_ne!(second, third);
        assert_eq!(access_subject(&service, &second), id);
        assert_eq!(access_subject(&service, &third), id);
        assert_eq!(store.writes(), writes);
    }

    #[tokio::test]
    async fn refresh_rejects_access_token_and_garbage() {
        let (service, _) = service();
        let pair = service
            .sign_up("Jane", "jane@x.com", "s3cret!")
            .await
            .unwrap();

        for token in [pair.access_token.as_str(), "", "garbage"] {
            assert!(matches!(
                service.refresh(token).await,
                Err(AuthError::InvalidToken)
            ));
        }
    }

    #[tokio::test]
    async fn authenticate_rejects_token_of_deleted_user() {
        let (service, store) = service();
        let pair = service
            .sign_up("Jane", "jane@x.com", "s3cret!")
            .await
            .unwrap();

        let user = service.authenticate(&pair.access_token).await.unwrap();
        assert_eq!(user.email, "jane@x.com");

        store.delete(user.id).await.unwrap();
        assert!(matches!(
            service.authenticate(&pair.access_token).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn jane_end_to_end() {
        let (service, _) = service();

        let a = service
            .sign_up("Jane", "jane@x.com", "s3cret!")
            .await
            .unwrap();
        let b = service.login("jane@x.com", "s3cret!").await.unwrap();
        assert_ne!(a.access_token, b.access_token);
        assert_eq!(access_subject(&service, &a), access_subject(&service, &b));

        let c = service.refresh(&b.refresh_token).await.unwrap();
        assert_eq!(access_subject(&service, &c), access_subject(&service, &a));

        let mut corrupted = b.refresh_token.clone();
        corrupted.insert(corrupted.len() / 2, 'x');
        assert!(matches!(
            service.refresh(&corrupted).await,
            Err(AuthError::InvalidToken)
        ));
    }
}
