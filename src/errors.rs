// ABOUTME: Error types used across the server, re-exported from the core crate
// ABOUTME: Keeps `crate::errors` paths stable for handlers and managers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

//! # Error Handling
//!
//! [`AppError`] carries an [`ErrorCode`] that decides the HTTP status; its
//! `IntoResponse` impl renders the `{"error": {"code", "message"}}` body.

pub use fitclub_core::errors::{
    AppError, AppResult, ErrorCode, ErrorContext, ErrorResponse, ErrorResponseDetails,
};
