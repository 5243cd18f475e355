// ABOUTME: Shared server resources handed to every route as axum state
// ABOUTME: Builds the database-backed auth middleware and report service from configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use crate::auth::{generate_jwt_secret, AuthManager};
use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::middleware::AuthMiddleware;
use crate::reports::ReportService;
use std::sync::Arc;
use tracing::warn;

/// Centralized resource container for the HTTP server
///
/// Everything is created once at startup and shared through `Arc`.
#[derive(Clone)]
pub struct ServerResources {
    /// Database with all record managers
    pub database: Arc<Database>,
    /// JWT issuing and validation
    pub auth_manager: Arc<AuthManager>,
    /// Bearer-token authentication
    pub auth_middleware: Arc<AuthMiddleware>,
    /// Report building and rendering
    pub reports: Arc<ReportService>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Create server resources; a random JWT secret is generated when none is configured
    #[must_use]
    pub fn new(database: Database, config: Arc<ServerConfig>) -> Self {
        let secret = config.auth.jwt_secret.as_ref().map_or_else(
            || {
                warn!("JWT_SECRET is not set; using a random secret, tokens will not survive a restart");
                generate_jwt_secret()
            },
            |secret| secret.as_bytes().to_vec(),
        );

        let database = Arc::new(database);
        let auth_manager = AuthManager::new(
            &secret,
            config.auth.access_token_minutes,
            config.auth.refresh_token_hours,
        );
        let auth_middleware = AuthMiddleware::new(auth_manager.clone(), Arc::clone(&database));
        let reports = ReportService::new(Arc::clone(&database), config.club.clone());

        Self {
            database,
            auth_manager: Arc::new(auth_manager),
            auth_middleware: Arc::new(auth_middleware),
            reports: Arc::new(reports),
            config,
        }
    }
}
