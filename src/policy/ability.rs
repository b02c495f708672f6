// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ability computation.
//!
//! An [`Ability`] is the set of [`Grant`]s a principal holds. Grants are
//! purely additive: there are no deny rules, so evaluation order does not
//! matter.
//!
//! ## Matching
//!
//! `can(action, subject)` holds when any of these was granted:
//!
//! | action   | subject   |
//! |----------|-----------|
//! | `action` | `subject` |
//! | `manage` | `subject` |
//! | `action` | `all`     |
//! | `manage` | `all`     |

use std::collections::HashSet;

use crate::models::{RoleKind, User};

use super::permission::{Action, Grant, SubjectType};
use super::resource::Subject;

/// Grant held by administrative roles.
pub const MANAGE_ALL: Grant = Grant::new(Action::Manage, SubjectType::All);

/// The actions a principal may perform, by subject type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ability {
    rules: HashSet<Grant>,
}

impl Ability {
    /// An ability that allows nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_grants(grants: impl IntoIterator<Item = Grant>) -> Self {
        Self {
            rules: grants.into_iter().collect(),
        }
    }

    /// Compute the ability of a user from its role.
    pub fn for_user(user: &User) -> Self {
        match &user.role {
            Some(role) if role.kind == RoleKind::Administrative => Self::from_grants([MANAGE_ALL]),
            Some(role) => Self::from_grants(role.grants()),
            None => Self::empty(),
        }
    }

    pub fn can(&self, action: Action, subject: SubjectType) -> bool {
        [action, Action::Manage].into_iter().any(|a| {
            self.rules.contains(&Grant::new(a, subject))
                || self.rules.contains(&Grant::new(a, SubjectType::All))
        })
    }

    /// Check against a concrete value using its declared subject type.
    pub fn can_on(&self, action: Action, target: &impl Subject) -> bool {
        self.can(action, target.subject_type())
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Granted rules, sorted for stable output.
    pub fn rules(&self) -> Vec<Grant> {
        let mut rules: Vec<Grant> = self.rules.iter().copied().collect();
        rules.sort_by_key(|g| (g.subject.as_str(), g.action.as_str()));
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::policy::permission::Permission;
    use crate::policy::resource::Resource;
    use chrono::Utc;

    fn user_with_role(role: Option<Role>) -> User {
        User {
            id: 1,
            name: "Jane".to_string(),
            email: "jane@x.com".to_string(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn standard_role(permissions: &[&str]) -> Role {
        Role {
            id: 2,
            name: "user".to_string(),
            kind: RoleKind::Standard,
            permissions: permissions
                .iter()
                .enumerate()
                .map(|(i, name)| Permission::parse(i as i64 + 1, name).unwrap())
                .collect(),
        }
    }

    #[test]
    fn administrative_role_can_do_everything() {
        let admin = user_with_role(Some(Role {
            id: 1,
            name: "admin".to_string(),
            kind: RoleKind::Administrative,
            permissions: Vec::new(),
        }));
        let ability = Ability::for_user(&admin);

        assert!(ability.can(Action::Manage, SubjectType::All));
        for action in Action::ALL {
            for subject in SubjectType::ALL {
                assert!(ability.can(action, subject), "{action}@{subject}");
            }
        }
    }

    #[test]
    fn admin_flag_does_not_depend_on_role_name() {
        let renamed = user_with_role(Some(Role {
            id: 1,
            name: "superuser".to_string(),
            kind: RoleKind::Administrative,
            permissions: Vec::new(),
        }));
        assert!(Ability::for_user(&renamed).can(Action::Delete, SubjectType::Role));

        let named_admin = user_with_role(Some(Role {
            id: 3,
            name: "admin".to_string(),
            kind: RoleKind::Standard,
            permissions: Vec::new(),
        }));
        assert!(!Ability::for_user(&named_admin).can(Action::Read, SubjectType::User));
    }

    #[test]
    fn explicit_grant_matches_only_its_pair() {
        let user = user_with_role(Some(standard_role(&["read@User"])));
        let ability = Ability::for_user(&user);

        assert!(ability.can(Action::Read, SubjectType::User));
        assert!(!ability.can(Action::Delete, SubjectType::User));
        assert!(!ability.can(Action::Read, SubjectType::Role));
        assert!(!ability.can(Action::Manage, SubjectType::User));
    }

    #[test]
    fn manage_subsumes_actions_on_its_subject() {
        let user = user_with_role(Some(standard_role(&["manage@User"])));
        let ability = Ability::for_user(&user);

        for action in Action::ALL {
            assert!(ability.can(action, SubjectType::User));
        }
        assert!(!ability.can(Action::Read, SubjectType::Role));
    }

    #[test]
    fn action_on_all_matches_every_subject() {
        let user = user_with_role(Some(standard_role(&["read@all"])));
        let ability = Ability::for_user(&user);

        assert!(ability.can(Action::Read, SubjectType::User));
        assert!(ability.can(Action::Read, SubjectType::Role));
        assert!(!ability.can(Action::Update, SubjectType::User));
    }

    #[test]
    fn no_role_or_no_permissions_grants_nothing() {
        for user in [
            user_with_role(None),
            user_with_role(Some(standard_role(&[]))),
        ] {
            let ability = Ability::for_user(&user);
            assert!(ability.is_empty());
            for action in Action::ALL {
                for subject in SubjectType::ALL {
                    assert!(!ability.can(action, subject));
                }
            }
        }
    }

    #[test]
    fn can_on_uses_declared_subject_type() {
        let role = standard_role(&["update@Role"]);
        let user = user_with_role(Some(role.clone()));
        let ability = Ability::for_user(&user);

        assert!(ability.can_on(Action::Update, &Resource::Role(&role)));
        assert!(!ability.can_on(Action::Update, &Resource::User(&user)));
        assert!(!ability.can_on(Action::Update, &Resource::All));
    }

    #[test]
    fn rules_are_sorted() {
        let ability = Ability::from_grants([
            Grant::new(Action::Update, SubjectType::User),
            Grant::new(Action::Read, SubjectType::Role),
            Grant::new(Action::Read, SubjectType::User),
        ]);
        let names: Vec<String> = ability.rules().iter().map(ToString::to_string).collect();
        assert_eq!(names, ["read@Role", "read@User", "update@User"]);
    }
}
