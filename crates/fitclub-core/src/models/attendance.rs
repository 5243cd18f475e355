// ABOUTME: Attendance records linking a client to a training
// ABOUTME: Tracks registration status, presence flag, and check-in time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{nullable, require_id};
use crate::errors::AppResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// State of a client's attendance at a training
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Signed up
    #[default]
    Registered,
    /// Showed up
    Attended,
    /// Withdrew
    Cancelled,
    /// Signed up but did not show
    NoShow,
}

impl AttendanceStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Attended => "attended",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "registered" => Some(Self::Registered),
            "attended" => Some(Self::Attended),
            "cancelled" => Some(Self::Cancelled),
            "no_show" => Some(Self::NoShow),
            _ => None,
        }
    }
}

impl Display for AttendanceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client's attendance at a training
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    /// Unique identifier
    pub id: i64,
    /// Attending client
    pub client_id: i64,
    /// Training
    pub training_id: i64,
    /// Current state
    pub status: AttendanceStatus,
    /// Whether the client was present
    pub is_present: bool,
    /// When the client checked in
    pub check_in_time: Option<DateTime<Utc>>,
}

/// Fields for creating or fully replacing an attendance record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRequest {
    /// Attending client
    pub client_id: i64,
    /// Training
    pub training_id: i64,
    /// State, registered when omitted
    #[serde(default)]
    pub status: AttendanceStatus,
    /// Presence flag
    #[serde(default)]
    pub is_present: bool,
    /// Check-in time
    #[serde(default)]
    pub check_in_time: Option<DateTime<Utc>>,
}

impl AttendanceRequest {
    /// Validate field shapes
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for non-positive ids
    pub fn validate(&self) -> AppResult<()> {
        require_id("client_id", self.client_id)?;
        require_id("training_id", self.training_id)
    }
}

/// Partial update of an attendance record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendancePatch {
    /// New client
    pub client_id: Option<i64>,
    /// New training
    pub training_id: Option<i64>,
    /// New state
    pub status: Option<AttendanceStatus>,
    /// New presence flag
    pub is_present: Option<bool>,
    /// New check-in time, `null` clears it
    #[serde(default, deserialize_with = "nullable")]
    pub check_in_time: Option<Option<DateTime<Utc>>>,
}

impl AttendancePatch {
    /// Merge onto the stored attendance record
    #[must_use]
    pub fn merge(self, existing: &Attendance) -> AttendanceRequest {
        AttendanceRequest {
            client_id: self.client_id.unwrap_or(existing.client_id),
            training_id: self.training_id.unwrap_or(existing.training_id),
            status: self.status.unwrap_or(existing.status),
            is_present: self.is_present.unwrap_or(existing.is_present),
            check_in_time: self.check_in_time.unwrap_or(existing.check_in_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_show_uses_snake_case() {
        assert_eq!(AttendanceStatus::NoShow.as_str(), "no_show");
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::NoShow).unwrap(),
            "\"no_show\""
        );
        assert_eq!(
            AttendanceStatus::parse("no_show"),
            Some(AttendanceStatus::NoShow)
        );
    }

    #[test]
    fn test_request_defaults() {
        let request: AttendanceRequest =
            serde_json::from_str(r#"{"client_id": 1, "training_id": 2}"#).unwrap();
        assert_eq!(request.status, AttendanceStatus::Registered);
        assert!(!request.is_present);
        assert!(request.check_in_time.is_none());
    }
}
