// ABOUTME: Bearer-token authentication for API requests
// ABOUTME: Validates the access token and re-reads the account so role changes apply at once
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use crate::auth::{AuthManager, TokenType};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use fitclub_core::models::UserRole;
use fitclub_core::permissions::Permissions;
use std::sync::Arc;

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// Account id
    pub user_id: i64,
    /// Login name
    pub username: String,
    /// Current role, read from the database
    pub role: UserRole,
    /// Trainer record linked to the account
    pub trainer_id: Option<i64>,
}

impl AuthResult {
    /// Require a permission of the caller's role
    ///
    /// # Errors
    ///
    /// Returns `PERMISSION_DENIED` when the role lacks it
    pub fn require(&self, required: Permissions) -> AppResult<()> {
        self.role.require(required)
    }
}

/// Middleware for bearer-token authentication
#[derive(Clone)]
pub struct AuthMiddleware {
    auth_manager: AuthManager,
    database: Arc<Database>,
}

impl AuthMiddleware {
    /// Create new auth middleware
    #[must_use]
    pub const fn new(auth_manager: AuthManager, database: Arc<Database>) -> Self {
        Self {
            auth_manager,
            database,
        }
    }

    /// Authenticate a request from its headers
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the header is missing or malformed,
    /// the token is invalid or expired, or the account is gone or inactive
    pub async fn authenticate_headers(&self, headers: &HeaderMap) -> AppResult<AuthResult> {
        let header = headers
            .get(AUTHORIZATION)
            .map(|value| {
                value
                    .to_str()
                    .map_err(|_| AppError::auth_malformed("Authorization header is not valid text"))
            })
            .transpose()?;
        self.authenticate_request(header).await
    }

    /// Authenticate a request from its `Authorization` header value
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the header is missing or malformed,
    /// the token is invalid or expired, or the account is gone or inactive
    #[tracing::instrument(skip(self, auth_header), fields(user_id = tracing::field::Empty))]
    pub async fn authenticate_request(&self, auth_header: Option<&str>) -> AppResult<AuthResult> {
        let header = auth_header.ok_or_else(AppError::auth_required)?;
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::auth_malformed("Authorization header must be 'Bearer <token>'")
            })?;

        let claims = self
            .auth_manager
            .validate_token(token, TokenType::Access)
            .map_err(|e| {
                tracing::debug!("Access token rejected: {e}");
                AppError::from(e)
            })?;
        let user_id = claims.user_id()?;

        let user = self
            .database
            .users()
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Account no longer exists"))?;

        if !user.is_active {
            AppLogger::log_auth_event(&user.username, "token", false, Some("account inactive"));
            return Err(AppError::auth_invalid("Account is inactive"));
        }

        tracing::Span::current().record("user_id", user.id);
        Ok(AuthResult {
            user_id: user.id,
            username: user.username,
            role: user.role,
            trainer_id: user.trainer_id,
        })
    }
}
