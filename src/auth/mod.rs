// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! This module provides password authentication and JWT session tokens for
//! the Median API.
//!
//! ## Auth Flow
//!
//! 1. Client signs up (`POST /v1/auth/signup`) or logs in
//!    (`POST /v1/auth/login`) and receives an access/refresh token pair
//! 2. Client sends `Authorization: Bearer <access token>` on every request
//! 3. Server:
//!    - Verifies signature, expiry and token class
//!    - Loads the user named by `sub`, with its role and permissions
//! 4. When the access token expires, the client exchanges the refresh token
//!    (`POST /v1/auth/refresh`) for a new pair
//!
//! ## Security
//!
//! - Passwords are stored as salted Argon2id digests
//! - Access and refresh tokens are signed with different secrets
//! - Clock skew tolerance is 60 seconds
//! - Tokens are not revocable; logout is a client-side discard

pub mod claims;
pub mod error;
pub mod extractor;
pub mod password;
pub mod service;
pub mod tokens;

pub use claims::{TokenClaims, TokenKind};
pub use error::AuthError;
pub use extractor::Auth;
pub use password::{PasswordError, PasswordHasher, DEFAULT_HASH_COST};
pub use service::AuthService;
pub use tokens::{TokenService, TokenSettings};
