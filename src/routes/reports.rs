// ABOUTME: Report download route handlers for revenue, attendance, trainer, and expiry reports
// ABOUTME: Returns PDF attachments by default and the document model with ?format=json
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use crate::errors::AppError;
use crate::logging::AppLogger;
use crate::reports::{render, ReportFormat, ReportKind, ReportParams};
use crate::resources::ServerResources;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use fitclub_core::permissions::Permissions;
use serde::Deserialize;
use std::sync::Arc;

/// Report query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// `pdf` (default) or `json`
    pub format: Option<String>,
    /// First day of the revenue period
    pub date_from: Option<NaiveDate>,
    /// Last day of the revenue period
    pub date_to: Option<NaiveDate>,
}

/// Report routes
pub struct ReportRoutes;

impl ReportRoutes {
    /// Create all report routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/reports/revenue", get(Self::handle_revenue))
            .route("/api/reports/attendance", get(Self::handle_attendance))
            .route(
                "/api/reports/trainer_performance",
                get(Self::handle_trainer_performance),
            )
            .route(
                "/api/reports/expiring_memberships",
                get(Self::handle_expiring_memberships),
            )
            .with_state(resources)
    }

    async fn handle_revenue(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ReportQuery>,
    ) -> Result<Response, AppError> {
        Self::respond(&resources, &headers, ReportKind::Revenue, query).await
    }

    async fn handle_attendance(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ReportQuery>,
    ) -> Result<Response, AppError> {
        Self::respond(&resources, &headers, ReportKind::Attendance, query).await
    }

    async fn handle_trainer_performance(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ReportQuery>,
    ) -> Result<Response, AppError> {
        Self::respond(&resources, &headers, ReportKind::TrainerPerformance, query).await
    }

    async fn handle_expiring_memberships(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ReportQuery>,
    ) -> Result<Response, AppError> {
        Self::respond(&resources, &headers, ReportKind::ExpiringMemberships, query).await
    }

    async fn respond(
        resources: &Arc<ServerResources>,
        headers: &HeaderMap,
        kind: ReportKind,
        query: ReportQuery,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_headers(headers).await?;
        auth.require(Permissions::VIEW_REPORTS)?;

        let format = query
            .format
            .as_deref()
            .map_or(ReportFormat::Pdf, ReportFormat::from_str_param);
        let params = ReportParams {
            date_from: query.date_from,
            date_to: query.date_to,
            ..ReportParams::now()
        };

        let document = resources.reports.build(kind, &params).await?;
        let rendered = render(&document, format)?;
        AppLogger::log_report(auth.user_id, kind.as_str(), format.as_str(), rendered.bytes.len());

        let mut response = (StatusCode::OK, rendered.bytes).into_response();
        let response_headers = response.headers_mut();
        response_headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(rendered.content_type),
        );
        if format == ReportFormat::Pdf {
            let disposition = format!("attachment; filename=\"{}\"", rendered.filename);
            response_headers.insert(
                header::CONTENT_DISPOSITION,
                HeaderValue::from_str(&disposition)
                    .map_err(|e| AppError::internal(format!("Invalid content disposition: {e}")))?,
            );
        }
        Ok(response)
    }
}
