// ABOUTME: Client route handlers with surname/phone search
// ABOUTME: Registration date is set on create and never changed afterwards
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use crate::errors::AppError;
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
use fitclub_core::models::{ClientPatch, ClientRequest};
use fitclub_core::pagination::PageParams;
use fitclub_core::permissions::Access;
use serde::Deserialize;
use std::sync::Arc;

/// Client list filters
#[derive(Debug, Default, Deserialize)]
pub struct ClientQuery {
    /// Substring of the surname or phone number
    pub search: Option<String>,
}

/// Client routes
pub struct ClientRoutes;

impl ClientRoutes {
    /// Create all client routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/clients", get(Self::handle_list).post(Self::handle_create))
            .route(
                "/api/clients/:id",
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
        Query(query): Query<ClientQuery>,
    ) -> Result<Response, AppError> {
        authorize(&headers, &resources, Access::Read).await?;
        let page = resources
            .database
            .clients()
            .list(query.search.as_deref(), &params)
            .await?;
        Ok(ok(&page))
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        authorize(&headers, &resources, Access::Read).await?;
        let client = found(resources.database.clients().get(id).await?, "Client", id)?;
        Ok(ok(&client))
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<ClientRequest>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        let today = today();
        request.validate(today)?;
        let client = resources.database.clients().create(&request, today).await?;
        AppLogger::log_data_change(auth.user_id, "create", "client", client.id);
        Ok(created(&client))
    }

    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(request): Json<ClientRequest>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        Self::save(&resources, auth.user_id, id, &request).await
    }

    async fn handle_partial_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(patch): Json<ClientPatch>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        let existing = found(resources.database.clients().get(id).await?, "Client", id)?;
        Self::save(&resources, auth.user_id, id, &patch.merge(&existing)).await
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        let removed = resources.database.clients().delete(id).await?;
        if removed {
            AppLogger::log_data_change(auth.user_id, "delete", "client", id);
        }
        deleted(removed, "Client", id)
    }

    async fn save(
        resources: &Arc<ServerResources>,
        user_id: i64,
        id: i64,
        request: &ClientRequest,
    ) -> Result<Response, AppError> {
        request.validate(today())?;
        let client = found(resources.database.clients().update(id, request).await?, "Client", id)?;
        AppLogger::log_data_change(user_id, "update", "client", id);
        Ok(ok(&client))
    }
}
