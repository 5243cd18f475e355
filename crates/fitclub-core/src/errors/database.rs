// ABOUTME: Conversion from sqlx errors into AppError with constraint classification
// ABOUTME: Unique, foreign-key, and check violations become client errors instead of 500s
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{AppError, ErrorCode};
use sqlx::error::ErrorKind;

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => Self::not_found("Record"),
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_owned();
                let code = match db_err.kind() {
                    ErrorKind::UniqueViolation => ErrorCode::ResourceAlreadyExists,
                    ErrorKind::ForeignKeyViolation => ErrorCode::InvalidInput,
                    ErrorKind::NotNullViolation => ErrorCode::MissingRequiredField,
                    ErrorKind::CheckViolation => ErrorCode::ValueOutOfRange,
                    _ => ErrorCode::DatabaseError,
                };
                let message = match code {
                    ErrorCode::ResourceAlreadyExists => format!("Duplicate value: {message}"),
                    ErrorCode::InvalidInput => {
                        format!("Referenced record does not exist: {message}")
                    }
                    ErrorCode::MissingRequiredField | ErrorCode::ValueOutOfRange => {
                        format!("Constraint violated: {message}")
                    }
                    _ => format!("Database error: {message}"),
                };
                Self::new(code, message).with_source(error)
            }
            _ => Self::database(format!("Database error: {error}")).with_source(error),
        }
    }
}

impl AppError {
    /// Convert a storage error, keeping constraint classification but
    /// prefixing plain database failures with the operation that failed
    #[must_use]
    pub fn from_sqlx(context: &str, error: sqlx::Error) -> Self {
        let converted = Self::from(error);
        if converted.code == ErrorCode::DatabaseError {
            Self {
                message: format!("{context}: {}", converted.message),
                ..converted
            }
        } else {
            converted
        }
    }

    /// Convert a storage error raised while deleting a row; a foreign-key
    /// violation there means other rows still reference it
    #[must_use]
    pub fn from_sqlx_delete(context: &str, error: sqlx::Error) -> Self {
        let converted = Self::from_sqlx(context, error);
        if converted.code == ErrorCode::InvalidInput {
            Self {
                code: ErrorCode::ResourceLocked,
                message: format!("{context}: record is still referenced by other records"),
                ..converted
            }
        } else {
            converted
        }
    }
}
