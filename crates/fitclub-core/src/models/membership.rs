// ABOUTME: Membership types (plans) and client memberships with derived expiry status
// ABOUTME: A membership whose end date is in the past is always stored as expired
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::money::{self, Decimal};
use super::{nullable, require_id, require_name};
use crate::errors::{AppError, AppResult};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A purchasable plan: duration and price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipType {
    /// Unique identifier
    pub id: i64,
    /// Plan name, also used as the training type name
    pub name: String,
    /// Validity period in days
    pub duration_days: i64,
    /// Price of the plan
    pub price: Decimal,
    /// Optional description
    pub description: Option<String>,
}

/// Fields for creating or fully replacing a membership type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipTypeRequest {
    /// Plan name
    pub name: String,
    /// Validity period in days
    pub duration_days: i64,
    /// Price of the plan
    pub price: Decimal,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

impl MembershipTypeRequest {
    /// Validate field shapes
    ///
    /// # Errors
    ///
    /// Returns `VALUE_OUT_OF_RANGE` for a non-positive duration or a negative price
    pub fn validate(&self) -> AppResult<()> {
        require_name("name", &self.name)?;
        if self.duration_days <= 0 {
            return Err(AppError::out_of_range(
                "duration_days",
                "Duration must be at least one day",
            ));
        }
        money::validate_scale("price", self.price)?;
        if self.price < Decimal::ZERO {
            return Err(AppError::out_of_range(
                "price",
                "Price cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Partial update of a membership type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MembershipTypePatch {
    /// New plan name
    pub name: Option<String>,
    /// New duration
    pub duration_days: Option<i64>,
    /// New price
    pub price: Option<Decimal>,
    /// New description, `null` clears it
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl MembershipTypePatch {
    /// Merge onto the stored membership type
    #[must_use]
    pub fn merge(self, existing: &MembershipType) -> MembershipTypeRequest {
        MembershipTypeRequest {
            name: self.name.unwrap_or_else(|| existing.name.clone()),
            duration_days: self.duration_days.unwrap_or(existing.duration_days),
            price: self.price.unwrap_or(existing.price),
            description: self
                .description
                .unwrap_or_else(|| existing.description.clone()),
        }
    }
}

/// Lifecycle state of a membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// Usable
    #[default]
    Active,
    /// Paused by the club
    Suspended,
    /// End date has passed
    Expired,
}

impl MembershipStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Expired => "expired",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "suspended" => Some(Self::Suspended),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }

    /// Status to store for a membership ending on `end_date`
    ///
    /// A membership that ended before `today` is expired whatever status the
    /// caller asked for; otherwise the requested status is kept.
    #[must_use]
    pub fn derive(requested: Self, end_date: NaiveDate, today: NaiveDate) -> Self {
        if end_date < today {
            Self::Expired
        } else {
            requested
        }
    }
}

impl Display for MembershipStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client's membership of a given type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// Unique identifier
    pub id: i64,
    /// Owning client
    pub client_id: i64,
    /// Plan
    pub type_id: i64,
    /// First valid day
    pub start_date: NaiveDate,
    /// Last valid day
    pub end_date: NaiveDate,
    /// Current status
    pub status: MembershipStatus,
}

impl Membership {
    /// Whole days from `today` until the end date (negative once past)
    #[must_use]
    pub fn days_left(&self, today: NaiveDate) -> i64 {
        (self.end_date - today).num_days()
    }
}

/// Fields for creating or fully replacing a membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipRequest {
    /// Owning client
    pub client_id: i64,
    /// Plan
    pub type_id: i64,
    /// First valid day
    pub start_date: NaiveDate,
    /// Last valid day; defaults to start date plus the plan duration
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Requested status, active when omitted
    #[serde(default)]
    pub status: MembershipStatus,
}

impl MembershipRequest {
    /// Validate field shapes that do not need the plan
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for non-positive ids
    pub fn validate(&self) -> AppResult<()> {
        require_id("client_id", self.client_id)?;
        require_id("type_id", self.type_id)
    }

    /// Resolve the end date and stored status given the plan duration
    ///
    /// # Errors
    ///
    /// Returns `VALUE_OUT_OF_RANGE` when the end date precedes the start date
    /// or the default end date overflows the calendar
    pub fn resolve(
        &self,
        duration_days: i64,
        today: NaiveDate,
    ) -> AppResult<(NaiveDate, MembershipStatus)> {
        let end_date = match self.end_date {
            Some(end) => end,
            None => u64::try_from(duration_days)
                .ok()
                .and_then(|days| self.start_date.checked_add_days(Days::new(days)))
                .ok_or_else(|| {
                    AppError::out_of_range("end_date", "Membership end date is out of range")
                })?,
        };
        if end_date < self.start_date {
            return Err(AppError::out_of_range(
                "end_date",
                "End date cannot be before start date",
            ));
        }
        Ok((end_date, MembershipStatus::derive(self.status, end_date, today)))
    }
}

/// Partial update of a membership
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MembershipPatch {
    /// New owner
    pub client_id: Option<i64>,
    /// New plan
    pub type_id: Option<i64>,
    /// New start date
    pub start_date: Option<NaiveDate>,
    /// New end date
    pub end_date: Option<NaiveDate>,
    /// New status
    pub status: Option<MembershipStatus>,
}

impl MembershipPatch {
    /// Merge onto the stored membership
    #[must_use]
    pub fn merge(self, existing: &Membership) -> MembershipRequest {
        MembershipRequest {
            client_id: self.client_id.unwrap_or(existing.client_id),
            type_id: self.type_id.unwrap_or(existing.type_id),
            start_date: self.start_date.unwrap_or(existing.start_date),
            end_date: Some(self.end_date.unwrap_or(existing.end_date)),
            status: self.status.unwrap_or(existing.status),
        }
    }
}
