// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process, sync::Arc};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use median_server::{
    api::router,
    auth::{PasswordHasher, TokenService},
    config::{Config, LogFormat, DEFAULT_LOG_FILTER},
    seed::seed_defaults,
    state::AppState,
    storage::{InMemoryStore, JsonFile},
};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match LogFormat::from_env() {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            process::exit(1);
        }
    };

    let hasher = match PasswordHasher::new(config.hash_cost) {
        Ok(hasher) => hasher,
        Err(e) => {
            tracing::error!(error = %e, "Invalid hashing configuration");
            process::exit(1);
        }
    };

    let store = match &config.data_dir {
        Some(dir) => match InMemoryStore::open(JsonFile::in_dir(dir)) {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(error = %e, path = %dir.display(), "Failed to load store");
                process::exit(1);
            }
        },
        None => {
            tracing::warn!("DATA_DIR not set, data will not survive a restart");
            InMemoryStore::new()
        }
    };

    let state = AppState::new(
        Arc::new(store),
        hasher,
        TokenService::new(&config.tokens),
    );

    if let Err(e) = seed_defaults(&state, config.admin_seed.as_ref()).await {
        tracing::error!(error = %e, "Failed to seed default roles");
        process::exit(1);
    }

    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "Failed to bind");
            process::exit(1);
        }
    };

    tracing::info!(%addr, "Median server listening (docs at /docs)");

    if let Err(e) = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server failed");
        process::exit(1);
    }
}
