// ABOUTME: HTTP middleware for authentication and cross-origin access
// ABOUTME: Request ids, tracing, and timeouts come from tower-http layers in the server
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

pub mod auth;
pub mod cors;

// Authentication middleware
pub use auth::{AuthMiddleware, AuthResult};

// CORS configuration
pub use cors::setup_cors;
