// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization checks for handlers and services.
//!
//! The ability is recomputed from the user's role on every check, so a role
//! change takes effect on the next request.
//!
//! Handlers declare their requirement through the extractor type:
//!
//! ```rust,ignore
//! async fn delete_user(
//!     Authorized(actor, _): Authorized<DeleteUsers>,
//!     Path(id): Path<i64>,
//! ) -> Result<Json<UserResponse>, AuthError> {
//!     // only reached when the actor may delete users
//! }
//! ```
//!
//! Rejection happens during extraction, before the handler body runs.

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::ability::Ability;
use super::permission::{Action, SubjectType};
use super::resource::Subject;
use crate::auth::{Auth, AuthError};
use crate::models::User;
use crate::state::AppState;

/// Whether `user` may perform `action` on `subject`.
pub fn authorize(user: &User, action: Action, subject: &impl Subject) -> bool {
    Ability::for_user(user).can_on(action, subject)
}

/// Like [`authorize`], but denial is an [`AuthError::Forbidden`].
pub fn require(user: &User, action: Action, subject: &impl Subject) -> Result<(), AuthError> {
    if authorize(user, action, subject) {
        return Ok(());
    }
    tracing::warn!(
        user_id = user.id,
        action = %action,
        subject = %subject.subject_type(),
        "Authorization denied"
    );
    Err(AuthError::Forbidden)
}

/// A static `(action, subject)` requirement.
pub trait Policy: Send + Sync + 'static {
    const ACTION: Action;
    const SUBJECT: SubjectType;
}

macro_rules! policy {
    ($(#[$doc:meta])* $name:ident, $action:ident, $subject:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl Policy for $name {
            const ACTION: Action = Action::$action;
            const SUBJECT: SubjectType = SubjectType::$subject;
        }
    };
}

policy!(
    /// `read@User`
    ReadUsers, Read, User
);
policy!(
    /// `create@User`
    CreateUsers, Create, User
);
policy!(
    /// `update@User`
    UpdateUsers, Update, User
);
policy!(
    /// `delete@User`
    DeleteUsers, Delete, User
);
policy!(
    /// `update@Role`
    UpdateRoles, Update, Role
);

/// Extractor that authenticates the caller and enforces policy `P`.
pub struct Authorized<P: Policy>(pub User, pub PhantomData<P>);

impl<P: Policy> FromRequestParts<AppState> for Authorized<P> {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;
        require(&user, P::ACTION, &P::SUBJECT)?;
        Ok(Authorized(user, PhantomData))
    }
}
