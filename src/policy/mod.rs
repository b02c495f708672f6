// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authorization Policy
//!
//! Permissions are stored as `<action>@<Subject>` strings and parsed once, when
//! a role is loaded, into typed [`Grant`]s. A user's [`Ability`] is derived
//! from its role:
//!
//! - **Administrative** roles may do everything (`manage@all`)
//! - **Standard** roles may do exactly what their permissions list
//! - Users without a role may do nothing
//!
//! ## Atoms
//!
//! | Actions                                      | Subjects              |
//! |----------------------------------------------|-----------------------|
//! | `create`, `read`, `update`, `delete`, `manage` | `User`, `Role`, `all` |
//!
//! `manage` covers every action and `all` covers every subject. Atoms are
//! case-sensitive.

pub mod ability;
pub mod guard;
pub mod permission;
pub mod resource;

pub use ability::{Ability, MANAGE_ALL};
pub use guard::{
    authorize, require, Authorized, CreateUsers, DeleteUsers, Policy, ReadUsers, UpdateRoles,
    UpdateUsers,
};
pub use permission::{
    Action, Grant, Permission, PermissionParseError, PermissionRecord, SubjectType,
};
pub use resource::{Resource, Subject};
