// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Subject-type tagging for domain values.
//!
//! Every entity declares its own subject type through [`Subject`]; values
//! that are not entities are checked against [`Resource::All`].

use crate::models::{Role, User};

use super::permission::SubjectType;

/// A value that can be the target of an authorization check.
pub trait Subject {
    fn subject_type(&self) -> SubjectType;
}

impl Subject for User {
    fn subject_type(&self) -> SubjectType {
        SubjectType::User
    }
}

impl Subject for Role {
    fn subject_type(&self) -> SubjectType {
        SubjectType::Role
    }
}

impl Subject for SubjectType {
    fn subject_type(&self) -> SubjectType {
        *self
    }
}

/// Tagged union over the entities a policy can target.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    User(&'a User),
    Role(&'a Role),
    All,
}

impl Subject for Resource<'_> {
    fn subject_type(&self) -> SubjectType {
        match self {
            Resource::User(user) => user.subject_type(),
            Resource::Role(role) => role.subject_type(),
            Resource::All => SubjectType::All,
        }
    }
}

impl<'a> From<&'a User> for Resource<'a> {
    fn from(user: &'a User) -> Self {
        Resource::User(user)
    }
}

impl<'a> From<&'a Role> for Resource<'a> {
    fn from(role: &'a Role) -> Self {
        Resource::Role(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoleKind;
    use chrono::Utc;

    #[test]
    fn resources_report_their_own_tag() {
        let role = Role {
            id: 1,
            name: "user".to_string(),
            kind: RoleKind::Standard,
            permissions: Vec::new(),
        };
        let user = User {
            id: 1,
            name: "Jane".to_string(),
            email: "jane@x.com".to_string(),
            password_hash: String::new(),
            role: Some(role.clone()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(Resource::from(&user).subject_type(), SubjectType::User);
        assert_eq!(Resource::from(&role).subject_type(), SubjectType::Role);
        assert_eq!(Resource::All.subject_type(), SubjectType::All);
    }
}
