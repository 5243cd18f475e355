// ABOUTME: Attendance route handlers and trainer check-in
// ABOUTME: Every write that takes a place at a training goes through the capacity guard
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use crate::database::attendance::AttendanceFilter;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::resources::ServerResources;
use crate::routes::{authorize, created, deleted, found, ok};
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use fitclub_core::models::{AttendancePatch, AttendanceRequest, AttendanceStatus};
use fitclub_core::pagination::PageParams;
use fitclub_core::permissions::{Access, Permissions};
use serde::Deserialize;
use std::sync::Arc;

/// Attendance list filters
#[derive(Debug, Default, Deserialize)]
pub struct AttendanceQuery {
    /// Only rows for this training
    pub training_id: Option<i64>,
    /// Only rows for this client
    pub client_id: Option<i64>,
    /// Only rows in this status
    pub status: Option<AttendanceStatus>,
}

/// Attendance routes
pub struct AttendanceRoutes;

impl AttendanceRoutes {
    /// Create all attendance routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/attendance",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/attendance/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .patch(Self::handle_partial_update)
                    .delete(Self::handle_delete),
            )
            .route("/api/attendance/:id/check_in", post(Self::handle_check_in))
            .with_state(resources)
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(params): Query<PageParams>,
        Query(query): Query<AttendanceQuery>,
    ) -> Result<Response, AppError> {
        authorize(&headers, &resources, Access::Read).await?;
        let filter = AttendanceFilter {
            training_id: query.training_id,
            client_id: query.client_id,
            status: query.status,
        };
        let page = resources.database.attendance().list(&filter, &params).await?;
        Ok(ok(&page))
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        authorize(&headers, &resources, Access::Read).await?;
        let attendance = found(resources.database.attendance().get(id).await?, "Attendance", id)?;
        Ok(ok(&attendance))
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<AttendanceRequest>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        Self::check_references(&resources, &request).await?;
        let attendance = resources.database.attendance().register(&request).await?;
        AppLogger::log_data_change(auth.user_id, "create", "attendance", attendance.id);
        Ok(created(&attendance))
    }

    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(request): Json<AttendanceRequest>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        Self::save(&resources, auth.user_id, id, &request).await
    }

    async fn handle_partial_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(patch): Json<AttendancePatch>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        let existing = found(resources.database.attendance().get(id).await?, "Attendance", id)?;
        Self::save(&resources, auth.user_id, id, &patch.merge(&existing)).await
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        let removed = resources.database.attendance().delete(id).await?;
        if removed {
            AppLogger::log_data_change(auth.user_id, "delete", "attendance", id);
        }
        deleted(removed, "Attendance", id)
    }

    /// Handle check-in (POST /api/attendance/:id/check_in)
    ///
    /// Staff may check anyone in; a trainer only clients of trainings they lead.
    async fn handle_check_in(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_headers(&headers).await?;
        auth.require(Permissions::CHECK_IN)?;

        let attendance = resources.database.attendance();
        let trainer_id = found(attendance.training_trainer(id).await?, "Attendance", id)?;
        if !auth.role.is_staff() && auth.trainer_id != Some(trainer_id) {
            return Err(AppError::permission_denied(
                "Trainers may only check in clients of their own trainings",
            ));
        }

        let checked_in = found(attendance.check_in(id, Utc::now()).await?, "Attendance", id)?;
        AppLogger::log_data_change(auth.user_id, "check_in", "attendance", id);
        Ok(ok(&checked_in))
    }

    async fn save(
        resources: &Arc<ServerResources>,
        user_id: i64,
        id: i64,
        request: &AttendanceRequest,
    ) -> Result<Response, AppError> {
        Self::check_references(resources, request).await?;
        let updated = resources.database.attendance().update(id, request).await?;
        let attendance = found(updated, "Attendance", id)?;
        AppLogger::log_data_change(user_id, "update", "attendance", id);
        Ok(ok(&attendance))
    }

    async fn check_references(
        resources: &Arc<ServerResources>,
        request: &AttendanceRequest,
    ) -> AppResult<()> {
        request.validate()?;
        if resources.database.trainings().get(request.training_id).await?.is_none() {
            return Err(AppError::invalid_input(format!(
                "Training {} does not exist",
                request.training_id
            )));
        }
        if !resources.database.clients().exists(request.client_id).await? {
            return Err(AppError::invalid_input(format!(
                "Client {} does not exist",
                request.client_id
            )));
        }
        Ok(())
    }
}
