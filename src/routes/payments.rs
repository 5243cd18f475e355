// ABOUTME: Payment route handlers with client and date-range filters
// ABOUTME: Payments are timestamped on creation; a linked membership must belong to the payer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use crate::database::payments::PaymentFilter;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::resources::ServerResources;
use crate::routes::{authorize, created, deleted, found, ok, DateRangeQuery};
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use fitclub_core::models::{PaymentPatch, PaymentRequest};
use fitclub_core::pagination::PageParams;
use fitclub_core::permissions::Access;
use serde::Deserialize;
use std::sync::Arc;

/// Payment list filters
#[derive(Debug, Default, Deserialize)]
pub struct PaymentQuery {
    /// Only payments by this client
    pub client_id: Option<i64>,
}

/// Payment routes
pub struct PaymentRoutes;

impl PaymentRoutes {
    /// Create all payment routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/payments", get(Self::handle_list).post(Self::handle_create))
            .route(
                "/api/payments/:id",
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
        Query(query): Query<PaymentQuery>,
        Query(range): Query<DateRangeQuery>,
    ) -> Result<Response, AppError> {
        authorize(&headers, &resources, Access::Read).await?;
        let (date_from, date_to) = range.bounds()?;
        let filter = PaymentFilter {
            client_id: query.client_id,
            date_from,
            date_to,
        };
        let page = resources.database.payments().list(&filter, &params).await?;
        Ok(ok(&page))
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        authorize(&headers, &resources, Access::Read).await?;
        let payment = found(resources.database.payments().get(id).await?, "Payment", id)?;
        Ok(ok(&payment))
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<PaymentRequest>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        Self::check_references(&resources, &request).await?;
        let payment = resources
            .database
            .payments()
            .create(&request, Utc::now())
            .await?;
        AppLogger::log_data_change(auth.user_id, "create", "payment", payment.id);
        Ok(created(&payment))
    }

    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(request): Json<PaymentRequest>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        Self::save(&resources, auth.user_id, id, &request).await
    }

    async fn handle_partial_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(patch): Json<PaymentPatch>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        let existing = found(resources.database.payments().get(id).await?, "Payment", id)?;
        Self::save(&resources, auth.user_id, id, &patch.merge(&existing)).await
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        let removed = resources.database.payments().delete(id).await?;
        if removed {
            AppLogger::log_data_change(auth.user_id, "delete", "payment", id);
        }
        deleted(removed, "Payment", id)
    }

    async fn save(
        resources: &Arc<ServerResources>,
        user_id: i64,
        id: i64,
        request: &PaymentRequest,
    ) -> Result<Response, AppError> {
        Self::check_references(resources, request).await?;
        let payment = found(resources.database.payments().update(id, request).await?, "Payment", id)?;
        AppLogger::log_data_change(user_id, "update", "payment", id);
        Ok(ok(&payment))
    }

    /// The payer must exist and a linked membership must be theirs
    async fn check_references(
        resources: &Arc<ServerResources>,
        request: &PaymentRequest,
    ) -> AppResult<()> {
        request.validate()?;
        if !resources.database.clients().exists(request.client_id).await? {
            return Err(AppError::invalid_input(format!(
                "Client {} does not exist",
                request.client_id
            )));
        }
        if let Some(membership_id) = request.membership_id {
            let membership = resources
                .database
                .memberships()
                .get(membership_id)
                .await?
                .ok_or_else(|| {
                    AppError::invalid_input(format!("Membership {membership_id} does not exist"))
                })?;
            if membership.client_id != request.client_id {
                AppLogger::log_rule_violation(
                    "payment_membership_owner",
                    "payment",
                    &format!(
                        "membership {membership_id} belongs to client {}, not {}",
                        membership.client_id, request.client_id
                    ),
                );
                return Err(AppError::invalid_input(
                    "Membership belongs to a different client",
                ));
            }
        }
        Ok(())
    }
}
