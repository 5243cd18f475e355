// ABOUTME: Core domain models for the fitness club: people, rooms, memberships, sessions, money
// ABOUTME: Each record comes with its request type, validation rules, and patch merge logic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

//! # Domain Models
//!
//! Records mirror the database rows one-to-one. Every writable resource has
//! a `*Request` type (the full set of client-supplied fields, used by create
//! and full update) and a `*Patch` type (all fields optional, used by partial
//! update). A patch is merged onto the stored record to produce a request, so
//! validation and storage only ever see complete requests.

/// Attendance of a client at a training
pub mod attendance;
/// Clients of the club
pub mod client;
/// Training halls
pub mod hall;
/// Memberships and membership types
pub mod membership;
/// Monetary amounts
pub mod money;
/// Payments made by clients
pub mod payment;
/// Trainers
pub mod trainer;
/// Scheduled trainings
pub mod training;
/// Staff accounts and roles
pub mod user;

pub use attendance::{Attendance, AttendancePatch, AttendanceRequest, AttendanceStatus};
pub use client::{Client, ClientPatch, ClientRequest};
pub use hall::{Hall, HallPatch, HallRequest};
pub use membership::{
    Membership, MembershipPatch, MembershipRequest, MembershipStatus, MembershipType,
    MembershipTypePatch, MembershipTypeRequest,
};
pub use money::Decimal;
pub use payment::{Payment, PaymentPatch, PaymentRequest, PaymentType};
pub use trainer::{Trainer, TrainerPatch, TrainerRequest};
pub use training::{Training, TrainingPatch, TrainingRequest, TrainingStatus};
pub use user::{User, UserPatch, UserRequest, UserRole};

use crate::constants::limits::{MAX_NAME_LEN, MAX_PHONE_LEN};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Deserializer};

/// Deserialize a field that distinguishes "absent" from "explicitly null"
///
/// Use with `#[serde(default, deserialize_with = "nullable")]` on an
/// `Option<Option<T>>` patch field: absent gives `None`, `null` gives
/// `Some(None)`, a value gives `Some(Some(v))`.
///
/// # Errors
///
/// Propagates the inner deserializer error
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Require a non-blank text field no longer than `max_len` characters
///
/// # Errors
///
/// Returns `MISSING_REQUIRED_FIELD` for blank input and
/// `VALUE_OUT_OF_RANGE` for overlong input
pub fn require_text(field: &str, value: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::missing_field(field));
    }
    if value.chars().count() > max_len {
        return Err(AppError::out_of_range(
            field,
            format!("Field '{field}' must be at most {max_len} characters"),
        ));
    }
    Ok(())
}

/// Require a person or place name
///
/// # Errors
///
/// See [`require_text`]
pub fn require_name(field: &str, value: &str) -> AppResult<()> {
    require_text(field, value, MAX_NAME_LEN)
}

/// Validate a phone number: digits with optional `+`, spaces, dashes and parentheses
///
/// # Errors
///
/// Returns `INVALID_INPUT` when the number contains other characters or
/// fewer than five digits
pub fn validate_phone(field: &str, value: &str) -> AppResult<()> {
    require_text(field, value, MAX_PHONE_LEN)?;
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));
    let digits = value.chars().filter(char::is_ascii_digit).count();
    if !allowed || digits < 5 {
        return Err(
            AppError::invalid_input(format!("Field '{field}' is not a valid phone number"))
                .with_details(serde_json::json!({ "field": field })),
        );
    }
    Ok(())
}

/// Validate an optional e-mail address with a minimal shape check
///
/// # Errors
///
/// Returns `INVALID_INPUT` when the address has no `@` or no domain dot
pub fn validate_email(field: &str, value: Option<&str>) -> AppResult<()> {
    let Some(email) = value else {
        return Ok(());
    };
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if valid {
        Ok(())
    } else {
        Err(
            AppError::invalid_input(format!("Field '{field}' is not a valid e-mail address"))
                .with_details(serde_json::json!({ "field": field })),
        )
    }
}

/// Reject ids that can never reference a row
///
/// # Errors
///
/// Returns `INVALID_INPUT` for zero or negative ids
pub fn require_id(field: &str, id: i64) -> AppResult<()> {
    if id > 0 {
        Ok(())
    } else {
        Err(AppError::invalid_input(format!("Field '{field}' must be a positive id"))
            .with_details(serde_json::json!({ "field": field })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_require_text() {
        assert!(require_text("name", "Anna", 10).is_ok());
        assert_eq!(
            require_text("name", "   ", 10).unwrap_err().code,
            ErrorCode::MissingRequiredField
        );
        assert_eq!(
            require_text("name", "Anastasiya-Maria", 10).unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("phone", "+7 (999) 000-00-00").is_ok());
        assert!(validate_phone("phone", "12ab5678").is_err());
        assert!(validate_phone("phone", "+7 12").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("email", None).is_ok());
        assert!(validate_email("email", Some("a@club.ru")).is_ok());
        assert!(validate_email("email", Some("club.ru")).is_err());
        assert!(validate_email("email", Some("@club.ru")).is_err());
    }
}
