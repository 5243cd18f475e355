// ABOUTME: Training hall records with unique name, capacity, and equipment notes
// ABOUTME: Hall capacity caps the max_clients of trainings held in it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{nullable, require_name};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// A room where trainings take place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hall {
    /// Unique identifier
    pub id: i64,
    /// Unique name
    pub name: String,
    /// Maximum number of people
    pub capacity: i64,
    /// Free-form equipment description
    pub equipment: Option<String>,
}

/// Fields for creating or fully replacing a hall
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HallRequest {
    /// Unique name
    pub name: String,
    /// Maximum number of people
    pub capacity: i64,
    /// Equipment description
    #[serde(default)]
    pub equipment: Option<String>,
}

impl HallRequest {
    /// Validate field shapes
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field
    pub fn validate(&self) -> AppResult<()> {
        require_name("name", &self.name)?;
        if self.capacity <= 0 {
            return Err(AppError::out_of_range(
                "capacity",
                "Hall capacity must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Partial update of a hall
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HallPatch {
    /// New name
    pub name: Option<String>,
    /// New capacity
    pub capacity: Option<i64>,
    /// New equipment, `null` clears it
    #[serde(default, deserialize_with = "nullable")]
    pub equipment: Option<Option<String>>,
}

impl HallPatch {
    /// Merge onto the stored hall
    #[must_use]
    pub fn merge(self, existing: &Hall) -> HallRequest {
        HallRequest {
            name: self.name.unwrap_or_else(|| existing.name.clone()),
            capacity: self.capacity.unwrap_or(existing.capacity),
            equipment: self.equipment.unwrap_or_else(|| existing.equipment.clone()),
        }
    }
}
