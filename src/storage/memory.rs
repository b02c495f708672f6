// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Map-backed implementation of [`UserStore`] and [`RoleStore`].
//!
//! All state sits behind one `RwLock`. Mutations run on a copy of the state
//! which is persisted (when a [`JsonFile`] is attached) and only then swapped
//! in, so a failed write leaves both memory and disk untouched. The write
//! itself runs on the blocking pool while the write lock is held, which keeps
//! mutations ordered on disk the same way they are in memory.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::models::{Role, User};
use crate::policy::Permission;

use super::{
    JsonFile, NewRole, NewUser, RoleStore, StoreError, StoreResult, UserChanges, UserStore,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredUser {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    role_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    users: BTreeMap<i64, StoredUser>,
    #[serde(default)]
    roles: BTreeMap<i64, Role>,
    /// Permission name -> id, shared by every role holding it.
    #[serde(default)]
    permissions: BTreeMap<String, i64>,
    #[serde(default)]
    last_user_id: i64,
    #[serde(default)]
    last_role_id: i64,
    #[serde(default)]
    last_permission_id: i64,
}

impl StoreData {
    fn resolve(&self, stored: &StoredUser) -> User {
        User {
            id: stored.id,
            name: stored.name.clone(),
            email: stored.email.clone(),
            password_hash: stored.password_hash.clone(),
            role: stored.role_id.and_then(|id| self.roles.get(&id).cloned()),
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn ensure_role(&self, role_id: Option<i64>) -> StoreResult<()> {
        match role_id {
            Some(id) if !self.roles.contains_key(&id) => {
                Err(StoreError::NotFound(format!("Role {id}")))
            }
            _ => Ok(()),
        }
    }

    /// Raise each id counter to at least the highest id already stored, so a
    /// file written without counters never hands out an existing id.
    fn reconcile_counters(&mut self) {
        let max_user = self.users.keys().next_back().copied().unwrap_or(0);
        let max_role = self.roles.keys().next_back().copied().unwrap_or(0);
        let max_permission = self.permissions.values().copied().max().unwrap_or(0);
        self.last_user_id = self.last_user_id.max(max_user);
        self.last_role_id = self.last_role_id.max(max_role);
        self.last_permission_id = self.last_permission_id.max(max_permission);
    }

    fn permission(&mut self, name: &str) -> StoreResult<Permission> {
        let id = match self.permissions.get(name) {
            Some(id) => *id,
            None => self.last_permission_id + 1,
        };
        let permission = Permission::parse(id, name)?;
        if id > self.last_permission_id {
            self.last_permission_id = id;
            self.permissions.insert(name.to_string(), id);
        }
        Ok(permission)
    }
}

/// In-memory store, optionally persisted to disk.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<StoreData>,
    file: Option<JsonFile>,
}

impl InMemoryStore {
    /// A store that lives only as long as the process.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store from `file` (empty if it does not exist yet) and write
    /// every later mutation back to it.
    pub fn open(file: JsonFile) -> StoreResult<Self> {
        let mut data = file.read::<StoreData>()?.unwrap_or_default();
        data.reconcile_counters();
        tracing::info!(
            path = %file.path().display(),
            users = data.users.len(),
            roles = data.roles.len(),
            "Loaded store"
        );
        Ok(Self {
            data: RwLock::new(data),
            file: Some(file),
        })
    }

    async fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut StoreData) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut guard = self.data.write().await;
        let mut next = guard.clone();
        let out = apply(&mut next)?;
        if let Some(file) = self.file.clone() {
            let (written, result) = tokio::task::spawn_blocking(move || {
                let result = file.write(&next);
                (next, result)
            })
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e.to_string())))?;
            result?;
            next = written;
        }
        *guard = next;
        Ok(out)
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data.users.get(&id).map(|u| data.resolve(u)))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data
            .users
            .values()
            .find(|u| u.email == email)
            .map(|u| data.resolve(u)))
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let data = self.data.read().await;
        Ok(data.users.values().map(|u| data.resolve(u)).collect())
    }

    async fn create(&self, user: NewUser) -> StoreResult<User> {
        self.mutate(|data| {
            if data.email_taken(&user.email, None) {
                return Err(StoreError::UniqueViolation("email"));
            }
            data.ensure_role(user.role_id)?;

            data.last_user_id += 1;
            let now = Utc::now();
            let stored = StoredUser {
                id: data.last_user_id,
                name: user.name,
                email: user.email,
                password_hash: user.password_hash,
                role_id: user.role_id,
                created_at: now,
                updated_at: now,
            };
            let created = data.resolve(&stored);
            data.users.insert(stored.id, stored);
            Ok(created)
        })
        .await
    }

    async fn update(&self, id: i64, changes: UserChanges) -> StoreResult<User> {
        self.mutate(|data| {
            if !data.users.contains_key(&id) {
                return Err(StoreError::NotFound(format!("User {id}")));
            }
            if let Some(email) = &changes.email {
                if data.email_taken(email, Some(id)) {
                    return Err(StoreError::UniqueViolation("email"));
                }
            }
            data.ensure_role(changes.role_id)?;

            let stored = data
                .users
                .get_mut(&id)
                .ok_or_else(|| StoreError::NotFound(format!("User {id}")))?;
            if let Some(name) = changes.name {
                stored.name = name;
            }
            if let Some(email) = changes.email {
                stored.email = email;
            }
            if let Some(password_hash) = changes.password_hash {
                stored.password_hash = password_hash;
            }
            if let Some(role_id) = changes.role_id {
                stored.role_id = Some(role_id);
            }
            stored.updated_at = Utc::now();

            let stored = stored.clone();
            Ok(data.resolve(&stored))
        })
        .await
    }

    async fn delete(&self, id: i64) -> StoreResult<User> {
        self.mutate(|data| {
            let stored = data
                .users
                .remove(&id)
                .ok_or_else(|| StoreError::NotFound(format!("User {id}")))?;
            Ok(data.resolve(&stored))
        })
        .await
    }
}

#[async_trait]
impl RoleStore for InMemoryStore {
    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let data = self.data.read().await;
        Ok(data.roles.values().find(|r| r.name == name).cloned())
    }

    async fn upsert_role(&self, role: NewRole) -> StoreResult<Role> {
        self.mutate(|data| {
            let permissions = role
                .permissions
                .iter()
                .map(|name| data.permission(name))
                .collect::<StoreResult<Vec<_>>>()?;

            let id = match data.roles.values().find(|r| r.name == role.name) {
                Some(existing) => existing.id,
                None => {
                    data.last_role_id += 1;
                    data.last_role_id
                }
            };
            let stored = Role {
                id,
                name: role.name,
                kind: role.kind,
                permissions,
            };
            data.roles.insert(id, stored.clone());
            Ok(stored)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoleKind;
    use tempfile::TempDir;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Jane".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role_id: None,
        }
    }

    fn standard_role(name: &str, permissions: &[&str]) -> NewRole {
        NewRole {
            name: name.to_string(),
            kind: RoleKind::Standard,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = InMemoryStore::new();
        let a = store.create(new_user("a@x.com")).await.unwrap();
        let b = store.create(new_user("b@x.com")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(
            store.find_by_email("b@x.com").await.unwrap().unwrap().id,
            2
        );
    }

    #[tokio::test]
    async fn duplicate_email_is_unique_violation() {
        let store = InMemoryStore::new();
        store.create(new_user("a@x.com")).await.unwrap();

        let result = store.create(new_user("a@x.com")).await;
        assert!(matches!(result, Err(StoreError::UniqueViolation("email"))));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_rejects_taken_email() {
        let store = InMemoryStore::new();
        store.create(new_user("a@x.com")).await.unwrap();
        let b = store.create(new_user("b@x.com")).await.unwrap();

        let changes = UserChanges {
            email: Some("a@x.com".to_string()),
            ..UserChanges::default()
        };
        let result = store.update(b.id, changes).await;
        assert!(matches!(result, Err(StoreError::UniqueViolation(_))));
    }

    #[tokio::test]
    async fn update_unknown_user_is_not_found() {
        let store = InMemoryStore::new();
        let result = store.update(42, UserChanges::default()).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn role_is_resolved_on_read() {
        let store = InMemoryStore::new();
        let role = store
            .upsert_role(standard_role("user", &["read@User"]))
            .await
            .unwrap();
        let user = store.create(new_user("a@x.com")).await.unwrap();
        assert!(user.role.is_none());

        let updated = store.update(user.id, UserChanges::role(role.id)).await.unwrap();
        assert_eq!(updated.role.as_ref().map(|r| r.name.as_str()), Some("user"));

        let loaded = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(loaded.role.unwrap().permissions[0].name(), "read@User");
    }

    #[tokio::test]
    async fn upsert_role_keeps_id_and_shares_permission_ids() {
        let store = InMemoryStore::new();
        let first = store
            .upsert_role(standard_role("user", &["read@User"]))
            .await
            .unwrap();
        let again = store
            .upsert_role(standard_role("user", &["read@User", "update@User"]))
            .await
            .unwrap();
        let other = store
            .upsert_role(standard_role("editor", &["update@User"]))
            .await
            .unwrap();

        assert_eq!(first.id, again.id);
        assert_eq!(again.permissions.len(), 2);
        assert_eq!(again.permissions[1].id, other.permissions[0].id);
    }

    #[tokio::test]
    async fn malformed_permission_is_rejected_without_writing() {
        let store = InMemoryStore::new();
        let result = store
            .upsert_role(standard_role("broken", &["CREATE_USER"]))
            .await;
        assert!(matches!(result, Err(StoreError::InvalidRecord(_))));
        assert!(store.find_role_by_name("broken").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn persisted_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = InMemoryStore::open(JsonFile::in_dir(dir.path())).unwrap();
            let role = store
                .upsert_role(standard_role("user", &["read@User"]))
                .await
                .unwrap();
            let mut user = new_user("a@x.com");
            user.role_id = Some(role.id);
            store.create(user).await.unwrap();
        }

        let reopened = InMemoryStore::open(JsonFile::in_dir(dir.path())).unwrap();
        let user = reopened.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(user.role.unwrap().name, "user");

        let next = reopened.create(new_user("b@x.com")).await.unwrap();
        assert_eq!(next.id, 2);
    }

    #[tokio::test]
    async fn reopen_without_counters_does_not_reuse_ids() {
        let dir = TempDir::new().unwrap();
        let file = JsonFile::in_dir(dir.path());
        std::fs::write(
            file.path(),
            r#"{
                "users": {"1": {"id": 1, "name": "Root", "email": "root@x.com",
                    "password_hash": "hash", "role_id": 1,
                    "created_at": "2026-01-01T00:00:00Z",
                    "updated_at": "2026-01-01T00:00:00Z"}},
                "roles": {"1": {"id": 1, "name": "user", "kind": "standard",
                    "permissions": [{"id": 1, "name": "read@User"}]}},
                "permissions": {"read@User": 1}
            }"#,
        )
        .unwrap();

        let store = InMemoryStore::open(file).unwrap();
        let created = store.create(new_user("a@x.com")).await.unwrap();
        assert_eq!(created.id, 2);
        assert_eq!(
            store.find_by_id(1).await.unwrap().unwrap().email,
            "root@x.com"
        );

        let editor = store
            .upsert_role(standard_role("editor", &["update@User"]))
            .await
            .unwrap();
        assert_eq!(editor.id, 2);
        assert_eq!(editor.permissions[0].id, 2);
    }

    #[tokio::test]
    async fn malformed_permission_on_disk_fails_to_load() {
        let dir = TempDir::new().unwrap();
        let file = JsonFile::in_dir(dir.path());
        std::fs::write(
            file.path(),
            r#"{"roles": {"1": {"id": 1, "name": "admin", "kind": "standard",
                "permissions": [{"id": 1, "name": "CREATE_USER"}]}}}"#,
        )
        .unwrap();

        assert!(InMemoryStore::open(file).is_err());
    }
}
