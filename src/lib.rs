// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Median - User Management Service
//!
//! This crate provides password authentication with rotating JWT token pairs
//! and role-based authorization for user administration.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Password hashing, token issuance and verification
//! - `policy` - Permission parsing, abilities and authorization guards
//! - `storage` - User/role store interfaces and the JSON-backed store
//! - `users` - User management operations
//! - `seed` - Default roles and bootstrap administrator

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod seed;
pub mod state;
pub mod storage;
pub mod users;
