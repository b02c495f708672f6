// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! This module defines the store interfaces the auth and user services
//! depend on, and the implementation used by the server.
//!
//! ## Interfaces
//!
//! - [`UserStore`] - user lookup by id/email, list, create, update, delete
//! - [`RoleStore`] - role lookup by name (with its permissions), upsert
//!
//! Both are injected as `Arc<dyn ...>` through `AppState`. Uniqueness of
//! emails and role names is enforced by the store itself.
//!
//! ## Implementations
//!
//! - [`InMemoryStore`] - map-backed store, optionally persisted to a single
//!   JSON document through [`JsonFile`] when `DATA_DIR` is set

pub mod json_file;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Role, RoleKind, User};
use crate::policy::PermissionParseError;

pub use json_file::JsonFile;
pub use memory::InMemoryStore;

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique field (email, role name) is already taken.
    #[error("unique constraint violated on {0}")]
    UniqueViolation(&'static str),

    #[error("not found: {0}")]
    NotFound(String),

    /// A stored record failed validation on load.
    #[error("invalid record: {0}")]
    InvalidRecord(#[from] PermissionParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Fields of a user to create.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: Option<i64>,
}

/// Partial update of a user. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role_id: Option<i64>,
}

impl UserChanges {
    pub fn role(role_id: i64) -> Self {
        Self {
            role_id: Some(role_id),
            ..Self::default()
        }
    }
}

/// Role to create or replace by name.
#[derive(Debug, Clone)]
pub struct NewRole {
    pub name: String,
    pub kind: RoleKind,
    /// Permission names in `<action>@<Subject>` form.
    pub permissions: Vec<String>,
}

/// Credential store.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn list(&self) -> StoreResult<Vec<User>>;

    /// Fails with [`StoreError::UniqueViolation`] if the email is taken.
    async fn create(&self, user: NewUser) -> StoreResult<User>;

    /// Fails with [`StoreError::NotFound`] for an unknown id, and with
    /// [`StoreError::UniqueViolation`] if a new email is taken.
    async fn update(&self, id: i64, changes: UserChanges) -> StoreResult<User>;

    async fn delete(&self, id: i64) -> StoreResult<User>;
}

/// Role/permission store.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>>;

    /// Create the role, or replace kind and permissions of an existing role
    /// with the same name. Permission names are parsed here.
    async fn upsert_role(&self, role: NewRole) -> StoreResult<Role>;
}
