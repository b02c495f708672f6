// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Default roles and the optional bootstrap administrator.
//!
//! Runs on every startup and is idempotent.

use crate::auth::AuthError;
use crate::config::AdminSeed;
use crate::models::{Role, RoleKind};
use crate::state::AppState;
use crate::storage::{NewRole, NewUser, UserChanges};

/// Name of the administrative role.
pub const ADMIN_ROLE: &str = "admin";

/// Name of the default standard role.
pub const USER_ROLE: &str = "user";

fn default_roles() -> [NewRole; 2] {
    [
        NewRole {
            name: ADMIN_ROLE.to_string(),
            kind: RoleKind::Administrative,
            permissions: Vec::new(),
        },
        NewRole {
            name: USER_ROLE.to_string(),
            kind: RoleKind::Standard,
            permissions: vec!["read@User".to_string()],
        },
    ]
}

/// Upsert the default roles, then make sure the seeded administrator (if
/// any) exists and holds the admin role.
pub async fn seed_defaults(state: &AppState, admin: Option<&AdminSeed>) -> Result<(), AuthError> {
    let mut admin_role = None;
    for role in default_roles() {
        let role = state.roles.upsert_role(role).await?;
        tracing::info!(role = %role.name, permissions = role.permissions.len(), "Seeded role");
        if role.name == ADMIN_ROLE {
            admin_role = Some(role);
        }
    }

    if let (Some(seed), Some(role)) = (admin, admin_role) {
        seed_admin(state, seed, &role).await?;
    }
    Ok(())
}

async fn seed_admin(state: &AppState, seed: &AdminSeed, role: &Role) -> Result<(), AuthError> {
    match state.users.find_by_email(&seed.email).await? {
        Some(user) if user.role.as_ref().map(|r| r.id) == Some(role.id) => {
            tracing::debug!(user_id = user.id, "Seed administrator already present");
        }
        Some(user) => {
            state.users.update(user.id, UserChanges::role(role.id)).await?;
            tracing::info!(user_id = user.id, "Re-attached admin role to seed administrator");
        }
        None => {
            let password_hash = state.auth.hasher().hash_blocking(&seed.password).await?;
            let user = state
                .users
                .create(NewUser {
                    name: seed.name.clone(),
                    email: seed.email.clone(),
                    password_hash,
                    role_id: Some(role.id),
                })
                .await?;
            tracing::info!(user_id = user.id, "Created seed administrator");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Ability, MANAGE_ALL};

    fn admin_seed() -> AdminSeed {
        AdminSeed {
            name: "Administrator".to_string(),
            email: "root@x.com".to_string(),
            password: "r00t-pass".to_string(),
        }
    }

    #[tokio::test]
    async fn seeds_default_roles_idempotently() {
        let state = AppState::for_tests();
        seed_defaults(&state, None).await.unwrap();
        let first = state.roles.find_role_by_name(USER_ROLE).await.unwrap().unwrap();

        seed_defaults(&state, None).await.unwrap();
        let second = state.roles.find_role_by_name(USER_ROLE).await.unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(second.permissions[0].name(), "read@User");
        let admin = state.roles.find_role_by_name(ADMIN_ROLE).await.unwrap().unwrap();
        assert_eq!(admin.kind, RoleKind::Administrative);
        assert!(state.users.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn seeded_administrator_can_log_in_with_full_ability() {
        let state = AppState::for_tests();
        let seed = admin_seed();
        seed_defaults(&state, Some(&seed)).await.unwrap();
        seed_defaults(&state, Some(&seed)).await.unwrap();

        assert_eq!(state.users.list().await.unwrap().len(), 1);
        let pair = state.auth.login(&seed.email, &seed.password).await.unwrap();
        let user = state.auth.authenticate(&pair.access_token).await.unwrap();
        assert_eq!(Ability::for_user(&user).rules(), vec![MANAGE_ALL]);
    }

    #[tokio::test]
    async fn existing_account_gets_admin_role_back() {
        let state = AppState::for_tests();
        let seed = admin_seed();
        state
            .auth
            .sign_up("Root", &seed.email, "whatever-pass")
            .await
            .unwrap();

        seed_defaults(&state, Some(&seed)).await.unwrap();

        let user = state.users.find_by_email(&seed.email).await.unwrap().unwrap();
        assert_eq!(user.role.map(|r| r.name), Some(ADMIN_ROLE.to_string()));
        assert_eq!(user.name, "Root");
    }
}
