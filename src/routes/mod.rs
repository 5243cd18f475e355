// ABOUTME: Route module organization for the club management HTTP API
// ABOUTME: Shared authentication, date-range, and response helpers for the domain route modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

//! Route module for the club API
//!
//! Each resource module owns its routes and thin handlers that validate input,
//! apply business rules, and delegate storage to the database managers.

/// Attendance records and check-in
pub mod attendance;
/// Token login, refresh, and current user
pub mod auth;
/// Clients
pub mod clients;
/// Halls
pub mod halls;
/// Liveness and readiness
pub mod health;
/// Membership types
pub mod membership_types;
/// Memberships
pub mod memberships;
/// Payments
pub mod payments;
/// PDF reports
pub mod reports;
/// Trainers
pub mod trainers;
/// Trainings and client registration
pub mod trainings;
/// Staff accounts
pub mod users;

pub use attendance::AttendanceRoutes;
pub use auth::AuthRoutes;
pub use clients::ClientRoutes;
pub use halls::HallRoutes;
pub use health::HealthRoutes;
pub use membership_types::MembershipTypeRoutes;
pub use memberships::MembershipRoutes;
pub use payments::PaymentRoutes;
pub use reports::ReportRoutes;
pub use trainers::TrainerRoutes;
pub use trainings::TrainingRoutes;
pub use users::UserRoutes;

use crate::errors::{AppError, AppResult};
use crate::middleware::AuthResult;
use crate::reports::Period;
use crate::resources::ServerResources;
use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use fitclub_core::permissions::Access;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Authenticate the caller and check the read/write permission for the request kind
pub(crate) async fn authorize(
    headers: &HeaderMap,
    resources: &Arc<ServerResources>,
    access: Access,
) -> AppResult<AuthResult> {
    let auth = resources.auth_middleware.authenticate_headers(headers).await?;
    auth.role.require_access(access)?;
    Ok(auth)
}

/// `200 OK` with a JSON body
pub(crate) fn ok<T: Serialize>(body: &T) -> Response {
    (StatusCode::OK, Json(body)).into_response()
}

/// `201 Created` with a JSON body
pub(crate) fn created<T: Serialize>(body: &T) -> Response {
    (StatusCode::CREATED, Json(body)).into_response()
}

/// `204 No Content`
pub(crate) fn no_content() -> Response {
    (StatusCode::NO_CONTENT, ()).into_response()
}

/// Turn a manager's `Option` into a 404 naming the resource
pub(crate) fn found<T>(value: Option<T>, resource: &str, id: i64) -> AppResult<T> {
    value.ok_or_else(|| AppError::not_found(resource).with_resource_id(id.to_string()))
}

/// Turn a manager's delete flag into `204` or a 404
pub(crate) fn deleted(removed: bool, resource: &str, id: i64) -> AppResult<Response> {
    if removed {
        Ok(no_content())
    } else {
        Err(AppError::not_found(resource).with_resource_id(id.to_string()))
    }
}

/// Inclusive calendar-day range from `date_from`/`date_to` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DateRangeQuery {
    /// First day included
    pub date_from: Option<NaiveDate>,
    /// Last day included
    pub date_to: Option<NaiveDate>,
}

impl DateRangeQuery {
    /// Half-open UTC bounds `[start of date_from, start of the day after date_to)`
    ///
    /// # Errors
    ///
    /// Returns `VALUE_OUT_OF_RANGE` when `date_to` precedes `date_from`
    pub fn bounds(&self) -> AppResult<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
        Period::new(self.date_from, self.date_to).map(|period| period.bounds())
    }
}

/// Today's date in UTC
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
