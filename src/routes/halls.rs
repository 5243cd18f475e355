// ABOUTME: Hall route handlers for listing, creating, updating, and deleting halls
// ABOUTME: A hall's capacity cannot drop below the client limit of a training held there
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
use fitclub_core::models::{HallPatch, HallRequest};
use fitclub_core::pagination::PageParams;
use fitclub_core::permissions::Access;
use std::sync::Arc;

/// Hall routes
pub struct HallRoutes;

impl HallRoutes {
    /// Create all hall routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/halls", get(Self::handle_list).post(Self::handle_create))
            .route(
                "/api/halls/:id",
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
        let page = resources.database.halls().list(&params).await?;
        Ok(ok(&page))
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        authorize(&headers, &resources, Access::Read).await?;
        let hall = found(resources.database.halls().get(id).await?, "Hall", id)?;
        Ok(ok(&hall))
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<HallRequest>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        request.validate()?;
        let hall = resources.database.halls().create(&request).await?;
        AppLogger::log_data_change(auth.user_id, "create", "hall", hall.id);
        Ok(created(&hall))
    }

    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(request): Json<HallRequest>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        Self::save(&resources, auth.user_id, id, &request).await
    }

    async fn handle_partial_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(patch): Json<HallPatch>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        let existing = found(resources.database.halls().get(id).await?, "Hall", id)?;
        Self::save(&resources, auth.user_id, id, &patch.merge(&existing)).await
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        let removed = resources.database.halls().delete(id).await?;
        if removed {
            AppLogger::log_data_change(auth.user_id, "delete", "hall", id);
        }
        deleted(removed, "Hall", id)
    }

    async fn save(
        resources: &Arc<ServerResources>,
        user_id: i64,
        id: i64,
        request: &HallRequest,
    ) -> Result<Response, AppError> {
        request.validate()?;
        let halls = resources.database.halls();

        let largest = halls.largest_training(id).await?;
        if request.capacity < largest {
            AppLogger::log_rule_violation(
                "hall_capacity",
                "hall",
                &format!("hall {id} capacity {} below training limit {largest}", request.capacity),
            );
            return Err(AppError::out_of_range(
                "capacity",
                format!("Capacity cannot be lower than {largest}, the client limit of a training in this hall"),
            ));
        }

        let hall = found(halls.update(id, request).await?, "Hall", id)?;
        AppLogger::log_data_change(user_id, "update", "hall", id);
        Ok(ok(&hall))
    }
}
