// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Domain and API Data Models
//!
//! This module defines the user, role and token types shared by the store,
//! the auth services and the REST API, together with the request and
//! response bodies. Wire types use camelCase field names and derive
//! `ToSchema` for the OpenAPI document.
//!
//! ## Model Categories
//!
//! - **Principals**: [`User`] records with an optional [`Role`]
//! - **Tokens**: the [`TokenPair`] returned by sign-up, login and refresh
//! - **Requests/Responses**: bodies accepted and returned by the handlers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::policy::{Grant, Permission, PermissionRecord};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

// =============================================================================
// Principals
// =============================================================================

/// How a role grants abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    /// Implicitly allowed every action on every subject.
    Administrative,
    /// Allowed only what its permission set lists.
    Standard,
}

/// A named set of permissions attached to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub kind: RoleKind,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl Role {
    pub fn grants(&self) -> impl Iterator<Item = Grant> + '_ {
        self.permissions.iter().map(|p| p.grant)
    }
}

/// An account that can authenticate.
///
/// `password_hash` never leaves the service; use [`UserResponse`] for output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Tokens
// =============================================================================

/// Access and refresh tokens minted together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_non_empty("name", &self.name)?;
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_non_empty("email", &self.email)?;
        require_non_empty("password", &self.password)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Role to attach on creation.
    #[serde(default)]
    pub role_name: Option<String>,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_non_empty("name", &self.name)?;
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.name {
            require_non_empty("name", name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleRequest {
    pub role_name: String,
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{field} must not be empty")));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    require_non_empty("email", email)?;
    if !email.contains('@') {
        return Err(ApiError::bad_request("email must be a valid address"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

// =============================================================================
// Responses
// =============================================================================

/// Public view of a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RoleResponse {
    pub id: i64,
    pub name: String,
    pub kind: RoleKind,
    pub permissions: Vec<PermissionRecord>,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            name: role.name,
            kind: role.kind,
            permissions: role.permissions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role.map(Into::into),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Rules granted to the current principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AbilityResponse {
    pub rules: Vec<Grant>,
}
