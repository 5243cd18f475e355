// ABOUTME: Trainer records with specialization and unique phone number
// ABOUTME: Trainers lead trainings and may be linked to a trainer user account
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{require_name, require_text, validate_phone};
use crate::errors::AppResult;
use serde::{Deserialize, Serialize};

/// A trainer employed by the club
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trainer {
    /// Unique identifier
    pub id: i64,
    /// Given name
    pub name: String,
    /// Family name
    pub surname: String,
    /// Patronymic, may be empty
    pub secondname: String,
    /// Area of expertise (yoga, strength, swimming)
    pub specialization: String,
    /// Unique phone number
    pub phone: String,
}

impl Trainer {
    /// Display name, surname first
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.surname, self.name)
    }
}

/// Fields for creating or fully replacing a trainer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerRequest {
    /// Given name
    pub name: String,
    /// Family name
    pub surname: String,
    /// Patronymic
    #[serde(default)]
    pub secondname: String,
    /// Area of expertise
    pub specialization: String,
    /// Unique phone number
    pub phone: String,
}

impl TrainerRequest {
    /// Validate field shapes
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field
    pub fn validate(&self) -> AppResult<()> {
        require_name("name", &self.name)?;
        require_name("surname", &self.surname)?;
        if !self.secondname.is_empty() {
            require_name("secondname", &self.secondname)?;
        }
        require_text("specialization", &self.specialization, 100)?;
        validate_phone("phone", &self.phone)
    }
}

/// Partial update of a trainer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainerPatch {
    /// New given name
    pub name: Option<String>,
    /// New family name
    pub surname: Option<String>,
    /// New patronymic
    pub secondname: Option<String>,
    /// New specialization
    pub specialization: Option<String>,
    /// New phone number
    pub phone: Option<String>,
}

impl TrainerPatch {
    /// Merge onto the stored trainer
    #[must_use]
    pub fn merge(self, existing: &Trainer) -> TrainerRequest {
        TrainerRequest {
            name: self.name.unwrap_or_else(|| existing.name.clone()),
            surname: self.surname.unwrap_or_else(|| existing.surname.clone()),
            secondname: self
                .secondname
                .unwrap_or_else(|| existing.secondname.clone()),
            specialization: self
                .specialization
                .unwrap_or_else(|| existing.specialization.clone()),
            phone: self.phone.unwrap_or_else(|| existing.phone.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secondname_is_optional() {
        let request: TrainerRequest = serde_json::from_str(
            r#"{"name": "Ivan", "surname": "Ivanov", "specialization": "Fitness", "phone": "+79990000000"}"#,
        )
        .unwrap();
        assert!(request.secondname.is_empty());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_blank_specialization_rejected() {
        let request = TrainerRequest {
            name: "Ivan".into(),
            surname: "Ivanov".into(),
            secondname: String::new(),
            specialization: " ".into(),
            phone: "+79990000000".into(),
        };
        assert!(request.validate().is_err());
    }
}
