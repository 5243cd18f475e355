// ABOUTME: Staff user accounts with roles (admin, manager, trainer)
// ABOUTME: Password hashes never leave the server; a trainer account may link to a trainer record
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{nullable, require_id, require_text, validate_email};
use crate::constants::auth::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Role of a staff account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full access including user management
    #[default]
    Admin,
    /// Runs the trainings and checks clients in
    Trainer,
    /// Day-to-day club administration
    Manager,
}

impl UserRole {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Trainer => "trainer",
            Self::Manager => "manager",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "trainer" => Some(Self::Trainer),
            "manager" => Some(Self::Manager),
            _ => None,
        }
    }

    /// Human-readable label used in reports
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Trainer => "Trainer",
            Self::Manager => "Manager",
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Staff account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Login name
    pub username: String,
    /// Contact e-mail
    pub email: Option<String>,
    /// Access role
    pub role: UserRole,
    /// Trainer record this account belongs to
    pub trainer_id: Option<i64>,
    /// Inactive accounts cannot log in
    pub is_active: bool,
    /// Account creation time
    pub created_at: DateTime<Utc>,
    /// Last successful login
    pub last_login: Option<DateTime<Utc>>,
    /// Bcrypt hash of the password
    #[serde(skip)]
    pub password_hash: String,
}

/// Fields for creating or fully replacing a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRequest {
    /// Login name
    pub username: String,
    /// Plaintext password; required on create, optional on update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Contact e-mail
    #[serde(default)]
    pub email: Option<String>,
    /// Access role, admin when omitted
    #[serde(default)]
    pub role: UserRole,
    /// Linked trainer record
    #[serde(default)]
    pub trainer_id: Option<i64>,
    /// Active flag, true when omitted
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

impl UserRequest {
    /// Validate field shapes
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field
    pub fn validate(&self) -> AppResult<()> {
        require_text("username", &self.username, 150)?;
        if self.username.chars().any(char::is_whitespace) {
            return Err(AppError::invalid_input("Username must not contain whitespace"));
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        validate_email("email", self.email.as_deref())?;
        if let Some(trainer_id) = self.trainer_id {
            require_id("trainer_id", trainer_id)?;
        }
        Ok(())
    }
}

/// Check the minimum password policy
///
/// # Errors
///
/// Returns `VALUE_OUT_OF_RANGE` for passwords shorter than the minimum
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::out_of_range(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// Partial update of a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    /// New login name
    pub username: Option<String>,
    /// New plaintext password
    pub password: Option<String>,
    /// New e-mail, `null` clears it
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    /// New role
    pub role: Option<UserRole>,
    /// New trainer link, `null` clears it
    #[serde(default, deserialize_with = "nullable")]
    pub trainer_id: Option<Option<i64>>,
    /// New active flag
    pub is_active: Option<bool>,
}

impl UserPatch {
    /// Merge onto the stored user
    #[must_use]
    pub fn merge(self, existing: &User) -> UserRequest {
        UserRequest {
            username: self.username.unwrap_or_else(|| existing.username.clone()),
            password: self.password,
            email: self.email.unwrap_or_else(|| existing.email.clone()),
            role: self.role.unwrap_or(existing.role),
            trainer_id: self.trainer_id.unwrap_or(existing.trainer_id),
            is_active: self.is_active.unwrap_or(existing.is_active),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_and_default() {
        for role in [UserRole::Admin, UserRole::Trainer, UserRole::Manager] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("owner"), None);
        assert_eq!(UserRole::default(), UserRole::Admin);
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            username: "admin".into(),
            email: None,
            role: UserRole::Admin,
            trainer_id: None,
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
            password_hash: "$2b$04$secret".into(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_request_defaults() {
        let request: UserRequest = serde_json::from_str(r#"{"username": "manager"}"#).unwrap();
        assert_eq!(request.role, UserRole::Admin);
        assert!(request.is_active);
        assert!(request.password.is_none());
    }

    #[test]
    fn test_validation() {
        let mut request: UserRequest =
            serde_json::from_str(r#"{"username": "front desk", "password": "secret1"}"#).unwrap();
        assert!(request.validate().is_err());
        request.username = "frontdesk".into();
        assert!(request.validate().is_ok());
        request.password = Some("123".into());
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_patch_clears_nullable_fields() {
        let existing = User {
            id: 3,
            username: "trainer".into(),
            email: Some("t@club.ru".into()),
            role: UserRole::Trainer,
            trainer_id: Some(1),
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
            password_hash: String::new(),
        };
        let patch: UserPatch = serde_json::from_str(r#"{"trainer_id": null}"#).unwrap();
        let merged = patch.merge(&existing);
        assert_eq!(merged.trainer_id, None);
        assert_eq!(merged.email.as_deref(), Some("t@club.ru"));
        assert_eq!(merged.role, UserRole::Trainer);
    }
}
