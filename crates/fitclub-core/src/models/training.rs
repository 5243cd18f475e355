// ABOUTME: Scheduled trainings led by a trainer in a hall with a client limit
// ABOUTME: Only scheduled trainings accept registrations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::require_id;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Lifecycle state of a training
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    /// Planned and open for registration
    #[default]
    Scheduled,
    /// Called off
    Cancelled,
    /// Took place
    Completed,
}

impl TrainingStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(Self::Scheduled),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Whether clients may still register
    #[must_use]
    pub const fn accepts_registrations(&self) -> bool {
        matches!(self, Self::Scheduled)
    }
}

impl Display for TrainingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A training session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Training {
    /// Unique identifier
    pub id: i64,
    /// Leading trainer
    pub trainer_id: i64,
    /// Surname of the leading trainer, filled in on reads
    pub trainer_name: String,
    /// Membership type this training belongs to
    pub training_type_id: i64,
    /// Hall the training takes place in
    pub hall_id: i64,
    /// Start time
    pub date_time: DateTime<Utc>,
    /// Maximum number of registered clients
    pub max_clients: i64,
    /// Current status
    pub status: TrainingStatus,
}

/// Fields for creating or fully replacing a training
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRequest {
    /// Leading trainer
    pub trainer_id: i64,
    /// Membership type
    pub training_type_id: i64,
    /// Hall
    pub hall_id: i64,
    /// Start time
    pub date_time: DateTime<Utc>,
    /// Maximum number of registered clients
    pub max_clients: i64,
    /// Status, scheduled when omitted
    #[serde(default)]
    pub status: TrainingStatus,
}

impl TrainingRequest {
    /// Validate field shapes; `hall_capacity` caps `max_clients`
    ///
    /// # Errors
    ///
    /// Returns `VALUE_OUT_OF_RANGE` when `max_clients` is not positive or
    /// exceeds the hall capacity
    pub fn validate(&self, hall_capacity: i64) -> AppResult<()> {
        require_id("trainer_id", self.trainer_id)?;
        require_id("training_type_id", self.training_type_id)?;
        require_id("hall_id", self.hall_id)?;
        if self.max_clients <= 0 {
            return Err(AppError::out_of_range(
                "max_clients",
                "max_clients must be greater than zero",
            ));
        }
        if self.max_clients > hall_capacity {
            return Err(AppError::out_of_range(
                "max_clients",
                format!("max_clients exceeds hall capacity of {hall_capacity}"),
            ));
        }
        Ok(())
    }
}

/// Partial update of a training
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingPatch {
    /// New trainer
    pub trainer_id: Option<i64>,
    /// New membership type
    pub training_type_id: Option<i64>,
    /// New hall
    pub hall_id: Option<i64>,
    /// New start time
    pub date_time: Option<DateTime<Utc>>,
    /// New client limit
    pub max_clients: Option<i64>,
    /// New status
    pub status: Option<TrainingStatus>,
}

impl TrainingPatch {
    /// Merge onto the stored training
    #[must_use]
    pub fn merge(self, existing: &Training) -> TrainingRequest {
        TrainingRequest {
            trainer_id: self.trainer_id.unwrap_or(existing.trainer_id),
            training_type_id: self.training_type_id.unwrap_or(existing.training_type_id),
            hall_id: self.hall_id.unwrap_or(existing.hall_id),
            date_time: self.date_time.unwrap_or(existing.date_time),
            max_clients: self.max_clients.unwrap_or(existing.max_clients),
            status: self.status.unwrap_or(existing.status),
        }
    }
}
