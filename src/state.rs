// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{AuthService, PasswordHasher, TokenService};
use crate::storage::{RoleStore, UserStore};
use crate::users::UserService;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub roles: Arc<dyn RoleStore>,
    pub auth: AuthService,
    pub user_service: UserService,
}

impl AppState {
    /// Wire the services over a store that holds both users and roles.
    pub fn new<S>(store: Arc<S>, hasher: PasswordHasher, tokens: TokenService) -> Self
    where
        S: UserStore + RoleStore + 'static,
    {
        let users: Arc<dyn UserStore> = store.clone();
        let roles: Arc<dyn RoleStore> = store;
        Self {
            auth: AuthService::new(users.clone(), hasher.clone(), tokens),
            user_service: UserService::new(users.clone(), roles.clone(), hasher),
            users,
            roles,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// In-memory state with the cheapest hashing cost.
    pub(crate) fn for_tests() -> Self {
        use crate::auth::service::tests::token_settings;
        use crate::storage::InMemoryStore;

        Self::new(
            Arc::new(InMemoryStore::new()),
            PasswordHasher::new(1).unwrap(),
            TokenService::new(&token_settings()),
        )
    }
}
