// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims carried by access and refresh tokens.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Which of the two token classes a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID, decimal string)
    pub sub: String,

    /// Token class, checked on verification
    pub typ: TokenKind,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Unique token ID, so tokens minted in the same second differ
    pub jti: String,
}

impl TokenClaims {
    /// Build claims expiring `ttl` after `issued_at`.
    ///
    /// Returns `None` when the expiry falls outside the representable range.
    pub fn new(
        subject_id: i64,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Option<Self> {
        let expires_at = issued_at.checked_add_signed(ttl)?;
        Some(Self {
            sub: subject_id.to_string(),
            typ: kind,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        })
    }

    /// Subject as a user ID, if it is one.
    pub fn subject_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sets_expiry_from_ttl() {
        let now = Utc::now();
        let claims = TokenClaims::new(42, TokenKind::Access, now, Duration::minutes(15)).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
        assert_eq!(claims.subject_id(), Some(42));
    }

    #[test]
    fn non_numeric_subject_has_no_id() {
        let mut claims = TokenClaims::new(1, TokenKind::Refresh, Utc::now(), Duration::days(7)).unwrap();
        claims.sub = "user_123".to_string();
        assert_eq!(claims.subject_id(), None);
    }

    #[test]
    fn each_token_gets_its_own_id() {
        let now = Utc::now();
        let a = TokenClaims::new(1, TokenKind::Access, now, Duration::minutes(15)).unwrap();
        let b = TokenClaims::new(1, TokenKind::Access, now, Duration::minutes(15)).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn out_of_range_expiry_is_none() {
        let now = Utc::now();
        assert!(TokenClaims::new(1, TokenKind::Refresh, now, Duration::days(100_000_000)).is_none());
        assert!(TokenClaims::new(1, TokenKind::Refresh, now, Duration::MAX).is_none());
    }
}
