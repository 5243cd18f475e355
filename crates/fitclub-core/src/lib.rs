// ABOUTME: Core types and constants for the FitClub fitness club management platform
// ABOUTME: Foundation crate with error handling, domain models, permissions, and pagination
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

#![deny(unsafe_code)]

//! # FitClub Core
//!
//! Foundation crate providing shared types for the FitClub server. This crate
//! changes infrequently and carries no I/O, so the storage and HTTP layers in
//! the main crate can depend on it without pulling each other in.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and HTTP error bodies
//! - **constants**: Application-wide constants organized by domain
//! - **models**: Club domain records (clients, trainers, halls, memberships, trainings, payments)
//! - **permissions**: Role-based permission system with bitflags
//! - **pagination**: Offset pagination for list endpoints

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants and configuration defaults organized by domain
pub mod constants;

/// Core domain models (Client, Trainer, Membership, Training, Payment, etc.)
pub mod models;

/// Role-based permission system with bitflags
pub mod permissions;

/// Offset pagination for list endpoints
pub mod pagination;
