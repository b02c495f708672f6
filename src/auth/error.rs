// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::password::PasswordError;
use crate::error::ApiError;
use crate::storage::StoreError;

/// Error type shared by the auth service, the user service and the guards.
///
/// Every variant except [`AuthError::Store`] and [`AuthError::Internal`] is a
/// distinct, user-actionable outcome.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No authorization header present
    #[error("Authorization header is required")]
    MissingAuthHeader,

    /// Invalid authorization header format
    #[error("Invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,

    /// Email already used by another account
    #[error("Email {0} already used")]
    EmailConflict(String),

    /// Lookup miss
    #[error("{0} not found")]
    NotFound(String),

    /// Password does not match
    #[error("Invalid password")]
    InvalidCredentials,

    /// Token is malformed, expired, or signed with the wrong secret
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Authorization denied
    #[error("Insufficient permissions for this operation")]
    Forbidden,

    /// Store failure with no specific recovery path
    #[error("Store error: {0}")]
    Store(StoreError),

    /// Hashing or signing failure
    #[error("Internal authentication error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::EmailConflict(_) => "email_conflict",
            AuthError::NotFound(_) => "not_found",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::InvalidToken => "invalid_token",
            AuthError::Forbidden => "forbidden",
            AuthError::Store(_) => "store_error",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidCredentials
            | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::EmailConflict(_) => StatusCode::CONFLICT,
            AuthError::Store(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => AuthError::NotFound(what),
            other => AuthError::Store(other),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(e: PasswordError) -> Self {
        AuthError::Internal(e.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
