// ABOUTME: Membership route handlers; end date and status are resolved on every save
// ABOUTME: A membership whose end date has passed is stored as expired regardless of input
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use crate::database::memberships::{MembershipFilter, MembershipRecord};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::resources::ServerResources;
use crate::routes::{authorize, created, deleted, found, ok, today};
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
    routing::get,
    Json, Router,
};
use fitclub_core::models::{MembershipPatch, MembershipRequest, MembershipStatus};
use fitclub_core::pagination::PageParams;
use fitclub_core::permissions::Access;
use serde::Deserialize;
use std::sync::Arc;

/// Membership list filters
#[derive(Debug, Default, Deserialize)]
pub struct MembershipQuery {
    /// Only memberships of this client
    pub client_id: Option<i64>,
    /// Only memberships in this status
    pub status: Option<MembershipStatus>,
}

/// Membership routes
pub struct MembershipRoutes;

impl MembershipRoutes {
    /// Create all membership routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/memberships",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/memberships/:id",
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
        Query(query): Query<MembershipQuery>,
    ) -> Result<Response, AppError> {
        authorize(&headers, &resources, Access::Read).await?;
        let filter = MembershipFilter {
            client_id: query.client_id,
            status: query.status,
        };
        let page = resources.database.memberships().list(&filter, &params).await?;
        Ok(ok(&page))
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        authorize(&headers, &resources, Access::Read).await?;
        let membership = found(resources.database.memberships().get(id).await?, "Membership", id)?;
        Ok(ok(&membership))
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<MembershipRequest>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        let record = Self::resolve(&resources, &request).await?;
        let membership = resources.database.memberships().create(&record).await?;
        AppLogger::log_data_change(auth.user_id, "create", "membership", membership.id);
        Ok(created(&membership))
    }

    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(request): Json<MembershipRequest>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        Self::save(&resources, auth.user_id, id, &request).await
    }

    async fn handle_partial_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(patch): Json<MembershipPatch>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        let existing = found(resources.database.memberships().get(id).await?, "Membership", id)?;
        Self::save(&resources, auth.user_id, id, &patch.merge(&existing)).await
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        let removed = resources.database.memberships().delete(id).await?;
        if removed {
            AppLogger::log_data_change(auth.user_id, "delete", "membership", id);
        }
        deleted(removed, "Membership", id)
    }

    async fn save(
        resources: &Arc<ServerResources>,
        user_id: i64,
        id: i64,
        request: &MembershipRequest,
    ) -> Result<Response, AppError> {
        let record = Self::resolve(resources, request).await?;
        let updated = resources.database.memberships().update(id, &record).await?;
        let membership = found(updated, "Membership", id)?;
        AppLogger::log_data_change(user_id, "update", "membership", id);
        Ok(ok(&membership))
    }

    /// Validate the request against its plan and compute the stored fields
    async fn resolve(
        resources: &Arc<ServerResources>,
        request: &MembershipRequest,
    ) -> AppResult<MembershipRecord> {
        request.validate()?;
        let membership_type = resources
            .database
            .membership_types()
            .get(request.type_id)
            .await?
            .ok_or_else(|| {
                AppError::invalid_input(format!(
                    "Membership type {} does not exist",
                    request.type_id
                ))
            })?;

        let (end_date, status) = request.resolve(membership_type.duration_days, today())?;
        Ok(MembershipRecord {
            client_id: request.client_id,
            type_id: request.type_id,
            start_date: request.start_date,
            end_date,
            status,
        })
    }
}
