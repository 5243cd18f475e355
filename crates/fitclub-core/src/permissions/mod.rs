// ABOUTME: Role-based permission system built on bitflags
// ABOUTME: Maps each staff role to the set of operations it may perform
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

//! # Permissions
//!
//! Staff (admins and managers) read and write club records; trainers read
//! them and check clients in at their own trainings. Reports are open to every
//! authenticated role, user management to admins only.

use crate::errors::{AppError, AppResult};
use crate::models::UserRole;
use bitflags::bitflags;

bitflags! {
    /// Operations a role may perform
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u8 {
        /// List and retrieve club records
        const READ_RECORDS = 0b0000_0001;
        /// Create, update, and delete club records
        const WRITE_RECORDS = 0b0000_0010;
        /// Manage staff accounts
        const MANAGE_USERS = 0b0000_0100;
        /// Download reports
        const VIEW_REPORTS = 0b0000_1000;
        /// Check clients in at trainings
        const CHECK_IN = 0b0001_0000;
    }
}

/// Whether a request only reads or also mutates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// GET, HEAD, OPTIONS
    Read,
    /// POST, PUT, PATCH, DELETE
    Write,
}

impl Access {
    /// Classify an HTTP method name
    #[must_use]
    pub fn from_method(method: &str) -> Self {
        match method {
            "GET" | "HEAD" | "OPTIONS" => Self::Read,
            _ => Self::Write,
        }
    }
}

impl Permissions {
    /// Human-readable name of the first flag set, for error messages
    #[must_use]
    pub fn describe(self) -> &'static str {
        if self.contains(Self::MANAGE_USERS) {
            "manage users"
        } else if self.contains(Self::WRITE_RECORDS) {
            "modify records"
        } else if self.contains(Self::CHECK_IN) {
            "check clients in"
        } else if self.contains(Self::VIEW_REPORTS) {
            "view reports"
        } else {
            "read records"
        }
    }
}

impl UserRole {
    /// Permissions granted to this role
    #[must_use]
    pub const fn permissions(&self) -> Permissions {
        match self {
            Self::Admin => Permissions::all(),
            Self::Manager => Permissions::READ_RECORDS
                .union(Permissions::WRITE_RECORDS)
                .union(Permissions::VIEW_REPORTS)
                .union(Permissions::CHECK_IN),
            Self::Trainer => Permissions::READ_RECORDS
                .union(Permissions::VIEW_REPORTS)
                .union(Permissions::CHECK_IN),
        }
    }

    /// Whether the role holds every permission in `required`
    #[must_use]
    pub const fn has(&self, required: Permissions) -> bool {
        self.permissions().contains(required)
    }

    /// Staff roles may write club records
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.has(Permissions::WRITE_RECORDS)
    }

    /// Fail with `PERMISSION_DENIED` unless the role holds `required`
    ///
    /// # Errors
    ///
    /// Returns `PERMISSION_DENIED` naming the missing permission
    pub fn require(&self, required: Permissions) -> AppResult<()> {
        if self.has(required) {
            Ok(())
        } else {
            Err(AppError::permission_denied(format!(
                "Role '{self}' is not allowed to {}",
                required.describe()
            )))
        }
    }

    /// Staff-or-read-only rule: reads need `READ_RECORDS`, writes need `WRITE_RECORDS`
    ///
    /// # Errors
    ///
    /// Returns `PERMISSION_DENIED` when the role lacks the permission
    pub fn require_access(&self, access: Access) -> AppResult<()> {
        match access {
            Access::Read => self.require(Permissions::READ_RECORDS),
            Access::Write => self.require(Permissions::WRITE_RECORDS),
        }
    }
}
