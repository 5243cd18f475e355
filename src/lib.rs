// ABOUTME: Main library entry point for the fitness club management API
// ABOUTME: Client, trainer, membership, training, attendance, and payment records with PDF reports
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

#![deny(unsafe_code)]

//! # FitClub Server
//!
//! A REST API for running a fitness club front desk: clients and their
//! memberships, trainers, halls, scheduled trainings with a capacity limit,
//! attendance check-in, payments, and four downloadable PDF reports.
//!
//! ## Roles
//!
//! - **admin**: everything, including staff accounts
//! - **manager**: reads and writes club records, views reports
//! - **trainer**: reads records, views reports, checks clients in to their own trainings
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fitclub_server::config::environment::ServerConfig;
//! use fitclub_server::database::Database;
//! use fitclub_server::resources::ServerResources;
//! use fitclub_server::server::ClubServer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let database = Database::new(
//!         &config.database.url.to_connection_string(),
//!         config.database.max_connections,
//!     )
//!     .await?;
//!     let port = config.http_port;
//!     let resources = Arc::new(ServerResources::new(database, Arc::new(config)));
//!     ClubServer::new(resources).run(port).await?;
//!     Ok(())
//! }
//! ```

/// JWT issuing and password hashing
pub mod auth;

/// Environment-driven configuration
pub mod config;

/// `SQLite` storage and record managers
pub mod database;

/// Error types re-exported from the core crate
pub mod errors;

/// Tracing setup and structured application events
pub mod logging;

/// Authentication and CORS middleware
pub mod middleware;

/// Report documents, layout, and PDF output
pub mod reports;

/// Shared server state
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Router assembly and serving
pub mod server;
