// ABOUTME: Trainer route handlers for listing, creating, updating, and deleting trainers
// ABOUTME: Deleting a trainer also removes their trainings through the schema cascade
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use crate::errors::AppError;
use crate::logging::AppLogger;
use crate::resources::ServerResources;
use crate::routes::{authorize, created, deleted, found, ok};
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
    routing::get,
    Json, Router,
};
use fitclub_core::models::{TrainerPatch, TrainerRequest};
use fitclub_core::pagination::PageParams;
use fitclub_core::permissions::Access;
use std::sync::Arc;

/// Trainer routes
pub struct TrainerRoutes;

impl TrainerRoutes {
    /// Create all trainer routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/trainers", get(Self::handle_list).post(Self::handle_create))
            .route(
                "/api/trainers/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .patch(Self::handle_partial_update)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(params): Query<PageParams>,
    ) -> Result<Response, AppError> {
        authorize(&headers, &resources, Access::Read).await?;
        let page = resources.database.trainers().list(&params).await?;
        Ok(ok(&page))
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        authorize(&headers, &resources, Access::Read).await?;
        let trainer = found(resources.database.trainers().get(id).await?, "Trainer", id)?;
        Ok(ok(&trainer))
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<TrainerRequest>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        request.validate()?;
        let trainer = resources.database.trainers().create(&request).await?;
        AppLogger::log_data_change(auth.user_id, "create", "trainer", trainer.id);
        Ok(created(&trainer))
    }

    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(request): Json<TrainerRequest>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        Self::save(&resources, auth.user_id, id, &request).await
    }

    async fn handle_partial_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(patch): Json<TrainerPatch>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        let existing = found(resources.database.trainers().get(id).await?, "Trainer", id)?;
        Self::save(&resources, auth.user_id, id, &patch.merge(&existing)).await
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        let removed = resources.database.trainers().delete(id).await?;
        if removed {
            AppLogger::log_data_change(auth.user_id, "delete", "trainer", id);
        }
        deleted(removed, "Trainer", id)
    }

    async fn save(
        resources: &Arc<ServerResources>,
        user_id: i64,
        id: i64,
        request: &TrainerRequest,
    ) -> Result<Response, AppError> {
        request.validate()?;
        let trainer = resources.database.trainers().update(id, request).await?;
        let trainer = found(trainer, "Trainer", id)?;
        AppLogger::log_data_change(user_id, "update", "trainer", id);
        Ok(ok(&trainer))
    }
}
