// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access/refresh token minting and verification.
//!
//! ## Token Classes
//!
//! | Class   | Secret               | Default TTL |
//! |---------|----------------------|-------------|
//! | access  | `JWT_ACCESS_SECRET`  | 15 minutes  |
//! | refresh | `JWT_REFRESH_SECRET` | 7 days      |
//!
//! Both are HS256 JWTs carrying [`TokenClaims`]. Each class is verified only
//! with its own secret and must carry its own `typ` claim, so an access token
//! is never accepted as a refresh token or the other way round.
//!
//! There is no revocation list: a token stays valid until it expires.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::{TokenClaims, TokenKind};
use super::error::AuthError;
use crate::models::TokenPair;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Secrets and lifetimes for both token classes.
#[derive(Clone)]
pub struct TokenSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// Keys and lifetime for one token class.
#[derive(Clone)]
struct TokenKeys {
    kind: TokenKind,
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    fn new(kind: TokenKind, secret: &str, ttl: Duration) -> Self {
        Self {
            kind,
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    fn sign(&self, subject_id: i64) -> Result<String, AuthError> {
        let claims = TokenClaims::new(subject_id, self.kind, Utc::now(), self.ttl)
            .ok_or_else(|| AuthError::Internal("token lifetime out of range".to_string()))?;
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("failed to sign token: {e}")))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;

        let claims = decode::<TokenClaims>(token, &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!(kind = ?self.kind, error = %e, "Token rejected");
                AuthError::InvalidToken
            })?
            .claims;

        if claims.typ != self.kind || claims.subject_id().is_none() {
            tracing::debug!(kind = ?self.kind, "Token rejected: wrong class or subject");
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }
}

/// Mints and verifies token pairs.
#[derive(Clone)]
pub struct TokenService {
    access: TokenKeys,
    refresh: TokenKeys,
}

impl TokenService {
    pub fn new(settings: &TokenSettings) -> Self {
        Self {
            access: TokenKeys::new(
                TokenKind::Access,
                &settings.access_secret,
                settings.access_ttl,
            ),
            refresh: TokenKeys::new(
                TokenKind::Refresh,
                &settings.refresh_secret,
                settings.refresh_ttl,
            ),
        }
    }

    /// Issue a fresh access/refresh pair for a user.
    pub fn issue_pair(&self, subject_id: i64) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.access.sign(subject_id)?,
            refresh_token: self.refresh.sign(subject_id)?,
        })
    }

    /// Verify an access token and return its claims.
    pub fn verify_access(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.access.verify(token)
    }

    /// Verify a refresh token and return the user ID it was issued for.
    ///
    /// Every failure (signature, structure, class, expiry) is reported as
    /// [`AuthError::InvalidToken`].
    pub fn verify_refresh(&self, token: &str) -> Result<i64, AuthError> {
        self.refresh
            .verify(token)?
            .subject_id()
            .ok_or(AuthError::InvalidToken)
    }
}
