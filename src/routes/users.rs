// ABOUTME: Staff account management route handlers, restricted to administrators
// ABOUTME: Passwords are bcrypt-hashed on every create and every password change
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use crate::auth::hash_password;
use crate::database::users::UserRecord;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::middleware::AuthResult;
use crate::resources::ServerResources;
use crate::routes::{created, deleted, found, ok};
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
    routing::get,
    Json, Router,
};
use fitclub_core::models::{UserPatch, UserRequest, UserRole};
use fitclub_core::pagination::PageParams;
use fitclub_core::permissions::Permissions;
use std::sync::Arc;

/// Staff account routes
pub struct UserRoutes;

impl UserRoutes {
    /// Create all user management routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/users", get(Self::handle_list).post(Self::handle_create))
            .route(
                "/api/users/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .patch(Self::handle_partial_update)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    async fn authorize_admin(
        headers: &HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> AppResult<AuthResult> {
        let auth = resources.auth_middleware.authenticate_headers(headers).await?;
        auth.require(Permissions::MANAGE_USERS)?;
        Ok(auth)
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(params): Query<PageParams>,
    ) -> Result<Response, AppError> {
        Self::authorize_admin(&headers, &resources).await?;
        let page = resources.database.users().list(&params).await?;
        Ok(ok(&page))
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        Self::authorize_admin(&headers, &resources).await?;
        let user = found(resources.database.users().get(id).await?, "User", id)?;
        Ok(ok(&user))
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<UserRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authorize_admin(&headers, &resources).await?;
        request.validate()?;
        Self::check_trainer_link(&resources, &request).await?;

        let password = request
            .password
            .as_deref()
            .ok_or_else(|| AppError::missing_field("password"))?;
        let password_hash = hash_password(password, resources.config.auth.bcrypt_cost).await?;

        let user = resources
            .database
            .users()
            .create(&Self::record(&request), &password_hash)
            .await?;
        AppLogger::log_data_change(auth.user_id, "create", "user", user.id);
        Ok(created(&user))
    }

    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(request): Json<UserRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authorize_admin(&headers, &resources).await?;
        Self::save(&resources, &auth, id, request).await
    }

    async fn handle_partial_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(patch): Json<UserPatch>,
    ) -> Result<Response, AppError> {
        let auth = Self::authorize_admin(&headers, &resources).await?;
        let existing = found(resources.database.users().get(id).await?, "User", id)?;
        Self::save(&resources, &auth, id, patch.merge(&existing)).await
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = Self::authorize_admin(&headers, &resources).await?;
        if id == auth.user_id {
            return Err(AppError::invalid_input("You cannot delete your own account"));
        }
        let removed = resources.database.users().delete(id).await?;
        if removed {
            AppLogger::log_data_change(auth.user_id, "delete", "user", id);
        }
        deleted(removed, "User", id)
    }

    async fn save(
        resources: &Arc<ServerResources>,
        auth: &AuthResult,
        id: i64,
        request: UserRequest,
    ) -> Result<Response, AppError> {
        request.validate()?;
        Self::check_trainer_link(resources, &request).await?;
        if id == auth.user_id && (request.role != UserRole::Admin || !request.is_active) {
            return Err(AppError::invalid_input(
                "You cannot demote or deactivate your own account",
            ));
        }

        let password_hash = match request.password.as_deref() {
            Some(password) => Some(hash_password(password, resources.config.auth.bcrypt_cost).await?),
            None => None,
        };

        let user = resources
            .database
            .users()
            .update(id, &Self::record(&request), password_hash.as_deref())
            .await?;
        let user = found(user, "User", id)?;
        AppLogger::log_data_change(auth.user_id, "update", "user", id);
        Ok(ok(&user))
    }

    /// A trainer link must point at an existing trainer
    async fn check_trainer_link(
        resources: &Arc<ServerResources>,
        request: &UserRequest,
    ) -> AppResult<()> {
        if let Some(trainer_id) = request.trainer_id {
            if resources.database.trainers().get(trainer_id).await?.is_none() {
                return Err(AppError::invalid_input(format!(
                    "Trainer {trainer_id} does not exist"
                )));
            }
        }
        Ok(())
    }

    fn record(request: &UserRequest) -> UserRecord {
        UserRecord {
            username: request.username.trim().to_owned(),
            email: request.email.clone(),
            role: request.role,
            trainer_id: request.trainer_id,
            is_active: request.is_active,
        }
    }
}
