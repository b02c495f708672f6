// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup and
//! validated eagerly: a bad value stops the server before it binds.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `JWT_ACCESS_SECRET` | Access token signing secret | Required |
//! | `JWT_REFRESH_SECRET` | Refresh token signing secret (must differ) | Required |
//! | `JWT_ACCESS_EXPIRATION` | Access token lifetime | `15m` |
//! | `JWT_REFRESH_EXPIRATION` | Refresh token lifetime | `7d` |
//! | `ROUNDS_OF_HASHING` | Password hashing cost | `10` |
//! | `DATA_DIR` | Directory for `store.json`; in-memory only if unset | unset |
//! | `SEED_ADMIN_EMAIL` | Bootstrap administrator email | unset |
//! | `SEED_ADMIN_PASSWORD` | Bootstrap administrator password | unset |
//! | `SEED_ADMIN_NAME` | Bootstrap administrator name | `Administrator` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! Lifetimes are whole seconds (`900`) or a number with a unit suffix:
//! `s`, `m`, `h`, `d` or `w` (`15m`, `7d`), at most 365 days.

use std::path::PathBuf;

use chrono::Duration;
use thiserror::Error;

use crate::auth::{TokenSettings, DEFAULT_HASH_COST};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_ACCESS_SECRET_ENV: &str = "JWT_ACCESS_SECRET";
pub const JWT_REFRESH_SECRET_ENV: &str = "JWT_REFRESH_SECRET";
pub const JWT_ACCESS_EXPIRATION_ENV: &str = "JWT_ACCESS_EXPIRATION";
pub const JWT_REFRESH_EXPIRATION_ENV: &str = "JWT_REFRESH_EXPIRATION";
pub const ROUNDS_OF_HASHING_ENV: &str = "ROUNDS_OF_HASHING";

/// Environment variable name for the data directory.
///
/// When set, the store is loaded from and written to `<DATA_DIR>/store.json`.
/// When unset, all data is lost on restart.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const SEED_ADMIN_EMAIL_ENV: &str = "SEED_ADMIN_EMAIL";
pub const SEED_ADMIN_PASSWORD_ENV: &str = "SEED_ADMIN_PASSWORD";
pub const SEED_ADMIN_NAME_ENV: &str = "SEED_ADMIN_NAME";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ACCESS_EXPIRATION: &str = "15m";
pub const DEFAULT_REFRESH_EXPIRATION: &str = "7d";
pub const DEFAULT_ADMIN_NAME: &str = "Administrator";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid ({value:?}): {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must differ")]
    SharedSecret,
}

/// Account created (or restored to the admin role) at startup.
#[derive(Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    /// Read `LOG_FORMAT`; anything other than `json` is pretty.
    pub fn from_env() -> Self {
        match std::env::var(LOG_FORMAT_ENV) {
            Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub tokens: TokenSettings,
    pub hash_cost: u32,
    pub data_dir: Option<PathBuf>,
    pub admin_seed: Option<AdminSeed>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let port = match get(PORT_ENV) {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                var: PORT_ENV,
                value: v,
                reason: "expected a port number",
            })?,
            None => DEFAULT_PORT,
        };

        let access_secret = require(JWT_ACCESS_SECRET_ENV)?;
        let refresh_secret = require(JWT_REFRESH_SECRET_ENV)?;
        if access_secret == refresh_secret {
            return Err(ConfigError::SharedSecret);
        }

        let ttl = |name: &'static str, default: &str| {
            let value = get(name).unwrap_or_else(|| default.to_string());
            parse_ttl(&value)
                .filter(|ttl| *ttl <= Duration::days(MAX_TTL_DAYS))
                .ok_or(ConfigError::Invalid {
                    var: name,
                    value,
                    reason: "expected a positive duration up to 365d, like 900, 15m or 7d",
                })
        };

        let hash_cost = match get(ROUNDS_OF_HASHING_ENV) {
            Some(v) => match v.trim().parse::<u32>() {
                Ok(cost) if cost > 0 => cost,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: ROUNDS_OF_HASHING_ENV,
                        value: v,
                        reason: "expected a positive integer",
                    })
                }
            },
            None => DEFAULT_HASH_COST,
        };

        let admin_seed = match (get(SEED_ADMIN_EMAIL_ENV), get(SEED_ADMIN_PASSWORD_ENV)) {
            (Some(email), Some(password)) => Some(AdminSeed {
                name: get(SEED_ADMIN_NAME_ENV).unwrap_or_else(|| DEFAULT_ADMIN_NAME.to_string()),
                email,
                password,
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(SEED_ADMIN_PASSWORD_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(SEED_ADMIN_EMAIL_ENV)),
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            tokens: TokenSettings {
                access_secret,
                refresh_secret,
                access_ttl: ttl(JWT_ACCESS_EXPIRATION_ENV, DEFAULT_ACCESS_EXPIRATION)?,
                refresh_ttl: ttl(JWT_REFRESH_EXPIRATION_ENV, DEFAULT_REFRESH_EXPIRATION)?,
            },
            hash_cost,
            data_dir: get(DATA_DIR_ENV).map(PathBuf::from),
            admin_seed,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Longest accepted token lifetime, in days.
pub const MAX_TTL_DAYS: i64 = 365;

/// Parse a lifetime such as `900`, `30s`, `15m`, `1h`, `7d` or `2w`.
///
/// Returns `None` for anything else, including zero.
pub fn parse_ttl(value: &str) -> Option<Duration> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);
    let amount: i64 = digits.parse().ok().filter(|n| *n > 0)?;

    match unit {
        "" | "s" => Duration::try_seconds(amount),
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        "w" => Duration::try_weeks(amount),
        _ => None,
    }
}
