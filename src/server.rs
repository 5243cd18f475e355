// ABOUTME: HTTP server assembly: merges all route modules and applies tower-http layers
// ABOUTME: Serves with axum and shuts down gracefully on Ctrl+C or SIGTERM
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

//! Club API server

use crate::errors::{AppError, AppResult};
use crate::middleware::setup_cors;
use crate::resources::ServerResources;
use crate::routes::{
    AttendanceRoutes, AuthRoutes, ClientRoutes, HallRoutes, HealthRoutes, MembershipRoutes,
    MembershipTypeRoutes, PaymentRoutes, ReportRoutes, TrainerRoutes, TrainingRoutes, UserRoutes,
};
use axum::{extract::Request, http::StatusCode, Router, ServiceExt};
use fitclub_core::constants::limits::MAX_REQUEST_BODY_BYTES;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Club management HTTP server
pub struct ClubServer {
    resources: Arc<ServerResources>,
}

impl ClubServer {
    /// Create a server over shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Build the full application router with middleware
    #[must_use]
    pub fn router(&self) -> Router {
        let resources = &self.resources;
        let timeout = Duration::from_secs(resources.config.request_timeout_secs);

        Router::new()
            .merge(HealthRoutes::routes(Arc::clone(resources)))
            .merge(AuthRoutes::routes(Arc::clone(resources)))
            .merge(UserRoutes::routes(Arc::clone(resources)))
            .merge(TrainerRoutes::routes(Arc::clone(resources)))
            .merge(ClientRoutes::routes(Arc::clone(resources)))
            .merge(HallRoutes::routes(Arc::clone(resources)))
            .merge(MembershipTypeRoutes::routes(Arc::clone(resources)))
            .merge(MembershipRoutes::routes(Arc::clone(resources)))
            .merge(TrainingRoutes::routes(Arc::clone(resources)))
            .merge(AttendanceRoutes::routes(Arc::clone(resources)))
            .merge(PaymentRoutes::routes(Arc::clone(resources)))
            .merge(ReportRoutes::routes(Arc::clone(resources)))
            .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                timeout,
            ))
            .layer(setup_cors(&resources.config))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Router wrapped so `/api/clients/` and `/api/clients` reach the same handler
    ///
    /// Trailing slashes are trimmed before routing, so the layer sits outside the router.
    #[must_use]
    pub fn app(&self) -> NormalizePath<Router> {
        NormalizePathLayer::trim_trailing_slash().layer(self.router())
    }

    /// Bind and serve until a shutdown signal arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or the server fails
    pub async fn run(self, port: u16) -> AppResult<()> {
        let address = format!("{}:{port}", self.resources.config.host);
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|e| AppError::config(format!("Failed to bind {address}: {e}")))?;
        info!("Club API listening on http://{address}");

        axum::serve(listener, ServiceExt::<Request>::into_make_service(self.app()))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received, draining connections");
}
