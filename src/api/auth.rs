// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session endpoints: sign-up, login, token refresh and the current principal.

use axum::{extract::State, http::StatusCode, Json};

use super::extract::ApiJson;
use crate::auth::Auth;
use crate::error::ApiError;
use crate::models::{
    AbilityResponse, LoginRequest, RefreshTokenRequest, SignUpRequest, TokenPair, UserResponse,
};
use crate::policy::Ability;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/v1/auth/signup",
    request_body = SignUpRequest,
    tag = "Auth",
    responses(
        (status = 201, description = "Account created", body = TokenPair),
        (status = 400, description = "Invalid request body"),
        (status = 409, description = "Email already used"),
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignUpRequest>,
) -> Result<(StatusCode, Json<TokenPair>), ApiError> {
    request.validate()?;
    let pair = state
        .auth
        .sign_up(&request.name, &request.email, &request.password)
        .await?;
    Ok((StatusCode::CREATED, Json(pair)))
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Logged in", body = TokenPair),
        (status = 401, description = "Wrong password"),
        (status = 404, description = "No user with this email"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    request.validate()?;
    let pair = state.auth.login(&request.email, &request.password).await?;
    Ok(Json(pair))
}

/// Exchange a refresh token for a new access/refresh pair.
#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    request_body = RefreshTokenRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 401, description = "Invalid or expired refresh token"),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RefreshTokenRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let pair = state.auth.refresh(&request.refresh_token).await?;
    Ok(Json(pair))
}

#[utoipa::path(
    get,
    path = "/v1/auth/me",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn me(Auth(user): Auth) -> Json<UserResponse> {
    Json(user.into())
}

/// Rules the current user holds, for clients that adapt their UI.
#[utoipa::path(
    get,
    path = "/v1/auth/abilities",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Granted rules", body = AbilityResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn abilities(Auth(user): Auth) -> Json<AbilityResponse> {
    Json(AbilityResponse {
        rules: Ability::for_user(&user).rules(),
    })
}

/// Tokens are not tracked server-side; the client discards them.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn logout(Auth(user): Auth) -> StatusCode {
    tracing::info!(user_id = user.id, "User logged out");
    StatusCode::NO_CONTENT
}
