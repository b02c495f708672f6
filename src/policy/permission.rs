// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Actions, subject types and parsed permission grants.
//!
//! Permissions are stored as `<action>@<Subject>` strings (e.g. `update@Role`).
//! They are parsed once, when a role is loaded or created, into a [`Grant`].
//! Both atoms are case-sensitive.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Separator between the action and the subject type in a permission name.
pub const PERMISSION_SEPARATOR: char = '@';

/// Something a principal can do to a subject.
///
/// `Manage` subsumes every other action on the same subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Manage,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::Manage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Manage => "manage",
        }
    }
}

impl FromStr for Action {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Action::Create),
            "read" => Ok(Action::Read),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            "manage" => Ok(Action::Manage),
            other => Err(PermissionParseError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain entity type a grant applies to. `All` matches every subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum SubjectType {
    User,
    Role,
    #[serde(rename = "all")]
    All,
}

impl SubjectType {
    pub const ALL: [SubjectType; 3] = [SubjectType::User, SubjectType::Role, SubjectType::All];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectType::User => "User",
            SubjectType::Role => "Role",
            SubjectType::All => "all",
        }
    }
}

impl FromStr for SubjectType {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(SubjectType::User),
            "Role" => Ok(SubjectType::Role),
            "all" => Ok(SubjectType::All),
            other => Err(PermissionParseError::UnknownSubject(other.to_string())),
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while parsing a permission name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionParseError {
    #[error("permission '{0}' must contain exactly one '@' separator")]
    Separator(String),

    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("unknown subject type '{0}'")]
    UnknownSubject(String),
}

/// One action allowed on one subject type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Grant {
    pub action: Action,
    pub subject: SubjectType,
}

impl Grant {
    pub const fn new(action: Action, subject: SubjectType) -> Self {
        Self { action, subject }
    }
}

impl FromStr for Grant {
    type Err = PermissionParseError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let mut parts = name.split(PERMISSION_SEPARATOR);
        let (action, subject) = match (parts.next(), parts.next(), parts.next()) {
            (Some(action), Some(subject), None) => (action, subject),
            _ => return Err(PermissionParseError::Separator(name.to_string())),
        };

        Ok(Grant {
            action: action.parse()?,
            subject: subject.parse()?,
        })
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.action, PERMISSION_SEPARATOR, self.subject)
    }
}

/// Stored shape of a permission (`{id, name}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PermissionRecord {
    pub id: i64,
    pub name: String,
}

/// A permission attached to a role, with its name already parsed.
///
/// Serializes as `{id, name}`; deserializing a malformed name fails, so bad
/// seed data is rejected when the store is loaded rather than on first use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PermissionRecord", into = "PermissionRecord")]
pub struct Permission {
    pub id: i64,
    pub grant: Grant,
}

impl Permission {
    pub fn parse(id: i64, name: &str) -> Result<Self, PermissionParseError> {
        Ok(Self {
            id,
            grant: name.parse()?,
        })
    }

    pub fn name(&self) -> String {
        self.grant.to_string()
    }
}

impl TryFrom<PermissionRecord> for Permission {
    type Error = PermissionParseError;

    fn try_from(record: PermissionRecord) -> Result<Self, Self::Error> {
        Permission::parse(record.id, &record.name)
    }
}

impl From<Permission> for PermissionRecord {
    fn from(permission: Permission) -> Self {
        PermissionRecord {
            id: permission.id,
            name: permission.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_action_and_subject() {
        let grant: Grant = "update@Role".parse().unwrap();
        assert_eq!(grant, Grant::new(Action::Update, SubjectType::Role));

        let grant: Grant = "manage@all".parse().unwrap();
        assert_eq!(grant, Grant::new(Action::Manage, SubjectType::All));
    }

    #[test]
    fn rejects_missing_or_repeated_separator() {
        assert!(matches!(
            "CREATE_USER".parse::<Grant>(),
            Err(PermissionParseError::Separator(_))
        ));
        assert!(matches!(
            "read@User@Role".parse::<Grant>(),
            Err(PermissionParseError::Separator(_))
        ));
    }

    #[test]
    fn atoms_are_case_sensitive() {
        assert!(matches!(
            "Read@User".parse::<Grant>(),
            Err(PermissionParseError::UnknownAction(_))
        ));
        assert!(matches!(
            "read@user".parse::<Grant>(),
            Err(PermissionParseError::UnknownSubject(_))
        ));
    }

    #[test]
    fn permission_serializes_as_record() {
        let permission = Permission::parse(7, "delete@User").unwrap();
        let json = serde_json::to_value(&permission).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 7, "name": "delete@User" }));
    }

    #[test]
    fn malformed_permission_fails_to_deserialize() {
        let result: Result<Permission, _> =
            serde_json::from_str(r#"{"id": 1, "name": "CREATE_USER"}"#);
        assert!(result.is_err());
    }
}
