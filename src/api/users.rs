// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User management endpoints.
//!
//! Every route requires a permission on `User`, except role assignment,
//! which requires `update@Role`.

use axum::{extract::State, http::StatusCode, Json};

use super::extract::{ApiJson, ApiPath};
use crate::error::ApiError;
use crate::models::{AssignRoleRequest, CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::policy::{Authorized, CreateUsers, DeleteUsers, ReadUsers, UpdateRoles, UpdateUsers};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = [UserResponse]),
        (status = 403, description = "Requires read@User"),
    )
)]
pub async fn list_users(
    _auth: Authorized<ReadUsers>,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.user_service.list().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = CreateUserRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 201, body = UserResponse),
        (status = 403, description = "Requires create@User"),
        (status = 404, description = "Unknown role"),
        (status = 409, description = "Email already used"),
    )
)]
pub async fn create_user(
    _auth: Authorized<CreateUsers>,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    request.validate()?;
    let user = state.user_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserResponse),
        (status = 403, description = "Requires read@User"),
        (status = 404, description = "User not found"),
    )
)]
pub async fn get_user(
    _auth: Authorized<ReadUsers>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(state.user_service.find(id).await?.into()))
}

#[utoipa::path(
    patch,
    path = "/v1/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserResponse),
        (status = 403, description = "Requires update@User"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already used"),
    )
)]
pub async fn update_user(
    _auth: Authorized<UpdateUsers>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    request.validate()?;
    Ok(Json(state.user_service.update(id, request).await?.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Removed user", body = UserResponse),
        (status = 403, description = "Requires delete@User"),
        (status = 404, description = "User not found"),
    )
)]
pub async fn delete_user(
    _auth: Authorized<DeleteUsers>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(state.user_service.remove(id).await?.into()))
}

#[utoipa::path(
    post,
    path = "/v1/users/{id}/assign-role",
    params(("id" = i64, Path, description = "User ID")),
    request_body = AssignRoleRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserResponse),
        (status = 403, description = "Requires update@Role"),
        (status = 404, description = "User or role not found"),
    )
)]
pub async fn assign_role(
    Authorized(actor, _): Authorized<UpdateRoles>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<AssignRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_service
        .assign_role(&actor, id, &request.role_name)
        .await?;
    Ok(Json(user.into()))
}
