// ABOUTME: Membership type route handlers for the club's plans and their prices
// ABOUTME: A plan still referenced by memberships cannot be deleted
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
use fitclub_core::models::{MembershipTypePatch, MembershipTypeRequest};
use fitclub_core::pagination::PageParams;
use fitclub_core::permissions::Access;
use std::sync::Arc;

/// Membership type routes
pub struct MembershipTypeRoutes;

impl MembershipTypeRoutes {
    /// Create all membership type routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/membership-types",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/membership-types/:id",
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
        let page = resources.database.membership_types().list(&params).await?;
        Ok(ok(&page))
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        authorize(&headers, &resources, Access::Read).await?;
        let membership_type = resources.database.membership_types().get(id).await?;
        Ok(ok(&found(membership_type, "Membership type", id)?))
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<MembershipTypeRequest>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        request.validate()?;
        let membership_type = resources.database.membership_types().create(&request).await?;
        AppLogger::log_data_change(auth.user_id, "create", "membership_type", membership_type.id);
        Ok(created(&membership_type))
    }

    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(request): Json<MembershipTypeRequest>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        Self::save(&resources, auth.user_id, id, &request).await
    }

    async fn handle_partial_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(patch): Json<MembershipTypePatch>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        let existing = resources.database.membership_types().get(id).await?;
        let existing = found(existing, "Membership type", id)?;
        Self::save(&resources, auth.user_id, id, &patch.merge(&existing)).await
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        let removed = resources.database.membership_types().delete(id).await?;
        if removed {
            AppLogger::log_data_change(auth.user_id, "delete", "membership_type", id);
        }
        deleted(removed, "Membership type", id)
    }

    async fn save(
        resources: &Arc<ServerResources>,
        user_id: i64,
        id: i64,
        request: &MembershipTypeRequest,
    ) -> Result<Response, AppError> {
        request.validate()?;
        let updated = resources.database.membership_types().update(id, request).await?;
        let membership_type = found(updated, "Membership type", id)?;
        AppLogger::log_data_change(user_id, "update", "membership_type", id);
        Ok(ok(&membership_type))
    }
}
