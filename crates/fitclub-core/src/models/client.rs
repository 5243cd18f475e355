// ABOUTME: Club client records with contact details and registration date
// ABOUTME: Registration date is fixed at creation; phone numbers are unique
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{nullable, require_name, validate_email, validate_phone};
use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A club member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Unique identifier
    pub id: i64,
    /// Given name
    pub name: String,
    /// Family name
    pub surname: String,
    /// Patronymic, may be empty
    pub secondname: String,
    /// Unique phone number
    pub phone: String,
    /// Contact e-mail
    pub email: Option<String>,
    /// Date of birth
    pub birth_date: NaiveDate,
    /// Day the client was registered, set by the server
    pub registration_date: NaiveDate,
}

impl Client {
    /// Display name, surname first
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.surname, self.name)
    }
}

/// Fields for creating or fully replacing a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRequest {
    /// Given name
    pub name: String,
    /// Family name
    pub surname: String,
    /// Patronymic
    #[serde(default)]
    pub secondname: String,
    /// Unique phone number
    pub phone: String,
    /// Contact e-mail
    #[serde(default)]
    pub email: Option<String>,
    /// Date of birth
    pub birth_date: NaiveDate,
}

impl ClientRequest {
    /// Validate field shapes; `today` bounds the birth date
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field
    pub fn validate(&self, today: NaiveDate) -> AppResult<()> {
        require_name("name", &self.name)?;
        require_name("surname", &self.surname)?;
        if !self.secondname.is_empty() {
            require_name("secondname", &self.secondname)?;
        }
        validate_phone("phone", &self.phone)?;
        validate_email("email", self.email.as_deref())?;
        if self.birth_date > today {
            return Err(AppError::out_of_range(
                "birth_date",
                "Birth date cannot be in the future",
            ));
        }
        Ok(())
    }
}

/// Partial update of a client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientPatch {
    /// New given name
    pub name: Option<String>,
    /// New family name
    pub surname: Option<String>,
    /// New patronymic
    pub secondname: Option<String>,
    /// New phone number
    pub phone: Option<String>,
    /// New e-mail, `null` clears it
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    /// New birth date
    pub birth_date: Option<NaiveDate>,
}

impl ClientPatch {
    /// Merge onto the stored client
    #[must_use]
    pub fn merge(self, existing: &Client) -> ClientRequest {
        ClientRequest {
            name: self.name.unwrap_or_else(|| existing.name.clone()),
            surname: self.surname.unwrap_or_else(|| existing.surname.clone()),
            secondname: self
                .secondname
                .unwrap_or_else(|| existing.secondname.clone()),
            phone: self.phone.unwrap_or_else(|| existing.phone.clone()),
            email: self.email.unwrap_or_else(|| existing.email.clone()),
            birth_date: self.birth_date.unwrap_or(existing.birth_date),
        }
    }
}
