// ABOUTME: Token login, refresh, and current-user route handlers
// ABOUTME: Exchanges credentials for an access/refresh JWT pair
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

//! Authentication routes
//!
//! `POST /api/auth/token` and `POST /api/auth/token/refresh` are the only
//! `/api` endpoints reachable without a bearer token.

use crate::auth::{verify_password, TokenType};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::resources::ServerResources;
use crate::routes::ok;
use axum::{
    extract::State,
    http::HeaderMap,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use fitclub_core::models::User;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login name
    pub username: String,
    /// Plaintext password
    pub password: String,
}

/// Token pair issued at login
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Access token for API calls
    pub access: String,
    /// Refresh token for obtaining new access tokens
    pub refresh: String,
    /// When the access token expires
    pub access_expires_at: DateTime<Utc>,
    /// The authenticated account
    pub user: User,
}

/// Refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token from login
    pub refresh: String,
}

/// New access token
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// Access token for API calls
    pub access: String,
    /// When the access token expires
    pub access_expires_at: DateTime<Utc>,
}

/// Authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/token", post(Self::handle_token))
            .route("/api/auth/token/refresh", post(Self::handle_refresh))
            .route("/api/auth/me", get(Self::handle_me))
            .with_state(resources)
    }

    /// Handle login (POST /api/auth/token)
    async fn handle_token(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let invalid = || AppError::auth_invalid("Invalid username or password");

        let Some(user) = resources
            .database
            .users()
            .get_by_username(request.username.trim())
            .await?
        else {
            AppLogger::log_auth_event(&request.username, "login", false, Some("unknown user"));
            return Err(invalid());
        };

        if !verify_password(&request.password, &user.password_hash).await {
            AppLogger::log_auth_event(&user.username, "login", false, Some("wrong password"));
            return Err(invalid());
        }
        if !user.is_active {
            AppLogger::log_auth_event(&user.username, "login", false, Some("account inactive"));
            return Err(AppError::auth_invalid("Account is inactive"));
        }

        let now = Utc::now();
        resources.database.users().touch_last_login(user.id, now).await?;
        let user = User {
            last_login: Some(now),
            ..user
        };

        let access = resources.auth_manager.generate_access_token(&user)?;
        let refresh = resources.auth_manager.generate_refresh_token(&user)?;
        AppLogger::log_auth_event(&user.username, "login", true, None);

        Ok(ok(&LoginResponse {
            access: access.token,
            refresh: refresh.token,
            access_expires_at: access.expires_at,
            user,
        }))
    }

    /// Handle token refresh (POST /api/auth/token/refresh)
    async fn handle_refresh(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RefreshRequest>,
    ) -> Result<Response, AppError> {
        let claims = resources
            .auth_manager
            .validate_token(&request.refresh, TokenType::Refresh)?;
        let user = Self::active_user(&resources, claims.user_id()?).await?;

        let access = resources.auth_manager.generate_access_token(&user)?;
        AppLogger::log_auth_event(&user.username, "refresh", true, None);

        Ok(ok(&RefreshResponse {
            access: access.token,
            access_expires_at: access.expires_at,
        }))
    }

    /// Handle current user lookup (GET /api/auth/me)
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_headers(&headers).await?;
        let user = Self::active_user(&resources, auth.user_id).await?;
        Ok(ok(&user))
    }

    async fn active_user(resources: &Arc<ServerResources>, user_id: i64) -> AppResult<User> {
        let user = resources
            .database
            .users()
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Account no longer exists"))?;
        if !user.is_active {
            return Err(AppError::auth_invalid("Account is inactive"));
        }
        Ok(user)
    }
}
