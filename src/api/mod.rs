// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        AbilityResponse, AssignRoleRequest, CreateUserRequest, LoginRequest, RefreshTokenRequest,
        RoleKind, RoleResponse, SignUpRequest, TokenPair, UpdateUserRequest, UserResponse,
    },
    policy::{Action, Grant, PermissionRecord, SubjectType},
    state::AppState,
};

pub mod auth;
mod extract;
pub mod health;
pub mod users;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/me", get(auth::me))
        .route("/auth/abilities", get(auth::abilities))
        .route("/auth/logout", post(auth::logout))
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/{id}/assign-role", post(users::assign_role))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/live", get(health::liveness))
        .route("/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .nest("/health", health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
}

/// Registers the `bearer` scheme referenced by authenticated routes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::sign_up,
        auth::login,
        auth::refresh,
        auth::me,
        auth::abilities,
        auth::logout,
        users::list_users,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::assign_role,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            SignUpRequest,
            LoginRequest,
            RefreshTokenRequest,
            CreateUserRequest,
            UpdateUserRequest,
            AssignRoleRequest,
            TokenPair,
            UserResponse,
            RoleResponse,
            RoleKind,
            PermissionRecord,
            AbilityResponse,
            Grant,
            Action,
            SubjectType,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Sign-up, login and token refresh"),
        (name = "Users", description = "User and role management"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
