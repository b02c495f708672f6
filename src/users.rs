// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # User Management
//!
//! CRUD over user accounts plus role assignment. Handler-level permission
//! checks happen in the extractors; [`UserService::assign_role`] carries its
//! own check because it changes what the target user is allowed to do.

use std::sync::Arc;

use crate::auth::{service::email_conflict, AuthError, PasswordHasher};
use crate::models::{CreateUserRequest, Role, UpdateUserRequest, User};
use crate::policy::{require, Action, SubjectType};
use crate::storage::{NewUser, RoleStore, UserChanges, UserStore};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, roles: Arc<dyn RoleStore>, hasher: PasswordHasher) -> Self {
        Self {
            users,
            roles,
            hasher,
        }
    }

    pub async fn list(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.users.list().await?)
    }

    pub async fn find(&self, id: i64) -> Result<User, AuthError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("User {id}")))
    }

    /// Create a user, optionally attaching a role by name.
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, AuthError> {
        let role_id = match &request.role_name {
            Some(name) => Some(self.role_by_name(name).await?.id),
            None => None,
        };
        let password_hash = self.hasher.hash_blocking(&request.password).await?;

        let user = self
            .users
            .create(NewUser {
                name: request.name,
                email: request.email.clone(),
                password_hash,
                role_id,
            })
            .await
            .map_err(|e| email_conflict(e, &request.email))?;

        tracing::info!(user_id = user.id, role_id = ?role_id, "User created");
        Ok(user)
    }

    /// Apply a partial update. A new password is rehashed.
    pub async fn update(&self, id: i64, request: UpdateUserRequest) -> Result<User, AuthError> {
        let password_hash = match &request.password {
            Some(password) => Some(self.hasher.hash_blocking(password).await?),
            None => None,
        };
        let email = request.email.clone();

        let user = self
            .users
            .update(
                id,
                UserChanges {
                    name: request.name,
                    email: request.email,
                    password_hash,
                    role_id: None,
                },
            )
            .await
            .map_err(|e| email_conflict(e, email.as_deref().unwrap_or_default()))?;

        tracing::info!(user_id = id, "User updated");
        Ok(user)
    }

    pub async fn remove(&self, id: i64) -> Result<User, AuthError> {
        let user = self.users.delete(id).await?;
        tracing::info!(user_id = id, "User removed");
        Ok(user)
    }

    /// Attach the named role to a user.
    ///
    /// `actor` must be allowed to update roles. The check runs before any
    /// store access, so a denied call reads and writes nothing.
    pub async fn assign_role(
        &self,
        actor: &User,
        user_id: i64,
        role_name: &str,
    ) -> Result<User, AuthError> {
        require(actor, Action::Update, &SubjectType::Role)?;

        let role = self.role_by_name(role_name).await?;
        let user = self.users.update(user_id, UserChanges::role(role.id)).await?;

        tracing::info!(
            actor_id = actor.id,
            user_id,
            role = %role.name,
            "Role assigned"
        );
        Ok(user)
    }

    async fn role_by_name(&self, name: &str) -> Result<Role, AuthError> {
        self.roles
            .find_role_by_name(name)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("Role {name}")))
    }
}
