// ABOUTME: Training route handlers and client registration for a training
// ABOUTME: Registration enforces status, client existence, and the capacity limit atomically
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

//! Training routes
//!
//! Besides the CRUD handlers this module owns
//! `POST /api/trainings/:id/register_client`, the only path that books a
//! client onto a training with the registration checks applied in order:
//! training exists, training is scheduled, client exists, a place is free,
//! client is not yet registered.

use crate::database::trainings::TrainingFilter;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::logging::AppLogger;
use crate::resources::ServerResources;
use crate::routes::{authorize, created, deleted, found, ok, DateRangeQuery};
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use fitclub_core::models::{
    Attendance, AttendanceRequest, AttendanceStatus, TrainingPatch, TrainingRequest,
    TrainingStatus,
};
use fitclub_core::pagination::PageParams;
use fitclub_core::permissions::Access;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Training list filters
#[derive(Debug, Default, Deserialize)]
pub struct TrainingQuery {
    /// Only trainings in this status
    pub status: Option<TrainingStatus>,
    /// Only trainings led by this trainer
    pub trainer_id: Option<i64>,
}

/// Body of a registration request
#[derive(Debug, Deserialize)]
pub struct RegisterClientRequest {
    /// Client to register
    pub client_id: i64,
}

/// Successful registration
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterClientResponse {
    /// Confirmation text
    pub status: String,
    /// The created attendance record
    pub attendance: Attendance,
}

/// Training routes
pub struct TrainingRoutes;

impl TrainingRoutes {
    /// Create all training routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/trainings", get(Self::handle_list).post(Self::handle_create))
            .route(
                "/api/trainings/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .patch(Self::handle_partial_update)
                    .delete(Self::handle_delete),
            )
            .route(
                "/api/trainings/:id/register_client",
                post(Self::handle_register_client),
            )
            .with_state(resources)
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(params): Query<PageParams>,
        Query(query): Query<TrainingQuery>,
        Query(range): Query<DateRangeQuery>,
    ) -> Result<Response, AppError> {
        authorize(&headers, &resources, Access::Read).await?;
        let (date_from, date_to) = range.bounds()?;
        let filter = TrainingFilter {
            status: query.status,
            trainer_id: query.trainer_id,
            date_from,
            date_to,
        };
        let page = resources.database.trainings().list(&filter, &params).await?;
        Ok(ok(&page))
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        authorize(&headers, &resources, Access::Read).await?;
        let training = found(resources.database.trainings().get(id).await?, "Training", id)?;
        Ok(ok(&training))
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<TrainingRequest>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        Self::check_references(&resources, &request).await?;
        let training = resources.database.trainings().create(&request).await?;
        AppLogger::log_data_change(auth.user_id, "create", "training", training.id);
        Ok(created(&training))
    }

    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(request): Json<TrainingRequest>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        Self::save(&resources, auth.user_id, id, &request).await
    }

    async fn handle_partial_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(patch): Json<TrainingPatch>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        let existing = found(resources.database.trainings().get(id).await?, "Training", id)?;
        Self::save(&resources, auth.user_id, id, &patch.merge(&existing)).await
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;
        let removed = resources.database.trainings().delete(id).await?;
        if removed {
            AppLogger::log_data_change(auth.user_id, "delete", "training", id);
        }
        deleted(removed, "Training", id)
    }

    /// Handle client registration (POST /api/trainings/:id/register_client)
    async fn handle_register_client(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(request): Json<RegisterClientRequest>,
    ) -> Result<Response, AppError> {
        let auth = authorize(&headers, &resources, Access::Write).await?;

        let training = found(resources.database.trainings().get(id).await?, "Training", id)?;
        if !training.status.accepts_registrations() {
            AppLogger::log_rule_violation(
                "training_closed",
                "training",
                &format!("training {id} is {}", training.status),
            );
            return Err(AppError::new(
                ErrorCode::TrainingClosed,
                format!("Training is {} and does not accept registrations", training.status),
            ));
        }
        if !resources.database.clients().exists(request.client_id).await? {
            return Err(AppError::invalid_input(format!(
                "Client {} does not exist",
                request.client_id
            )));
        }

        let attendance = resources
            .database
            .attendance()
            .register(&AttendanceRequest {
                client_id: request.client_id,
                training_id: id,
                status: AttendanceStatus::Registered,
                is_present: false,
                check_in_time: None,
            })
            .await
            .inspect_err(|e| {
                if e.code == ErrorCode::TrainingFull {
                    AppLogger::log_rule_violation(
                        "training_capacity",
                        "training",
                        &format!("training {id} is full, client {} rejected", request.client_id),
                    );
                }
            })?;

        AppLogger::log_data_change(auth.user_id, "register", "attendance", attendance.id);
        Ok(created(&RegisterClientResponse {
            status: "Client registered".to_owned(),
            attendance,
        }))
    }

    async fn save(
        resources: &Arc<ServerResources>,
        user_id: i64,
        id: i64,
        request: &TrainingRequest,
    ) -> Result<Response, AppError> {
        Self::check_references(resources, request).await?;

        let trainings = resources.database.trainings();
        let registered = trainings.registered_count(id).await?;
        if request.max_clients < registered {
            return Err(AppError::out_of_range(
                "max_clients",
                format!("max_clients cannot be lower than the {registered} clients already registered"),
            ));
        }

        let training = found(trainings.update(id, request).await?, "Training", id)?;
        AppLogger::log_data_change(user_id, "update", "training", id);
        Ok(ok(&training))
    }

    /// The hall, trainer, and membership type must exist; the hall caps `max_clients`
    async fn check_references(
        resources: &Arc<ServerResources>,
        request: &TrainingRequest,
    ) -> AppResult<()> {
        let database = &resources.database;
        let hall = database
            .halls()
            .get(request.hall_id)
            .await?
            .ok_or_else(|| {
                AppError::invalid_input(format!("Hall {} does not exist", request.hall_id))
            })?;
        if request.max_clients > hall.capacity {
            AppLogger::log_rule_violation(
                "hall_capacity",
                "training",
                &format!(
                    "max_clients {} rejected for hall {} with capacity {}",
                    request.max_clients, hall.id, hall.capacity
                ),
            );
        }
        request.validate(hall.capacity)?;

        if database.trainers().get(request.trainer_id).await?.is_none() {
            return Err(AppError::invalid_input(format!(
                "Trainer {} does not exist",
                request.trainer_id
            )));
        }
        if database
            .membership_types()
            .get(request.training_type_id)
            .await?
            .is_none()
        {
            return Err(AppError::invalid_input(format!(
                "Membership type {} does not exist",
                request.training_type_id
            )));
        }
        Ok(())
    }
}
