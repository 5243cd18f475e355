// ABOUTME: Database operations for attendance with capacity-guarded registration
// ABOUTME: Registration is a single conditional insert so a training can never exceed max_clients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{count_from_db, format_timestamp, parse_timestamp, Database};
use crate::errors::{AppError, AppResult, ErrorCode};
use chrono::{DateTime, Utc};
use fitclub_core::models::{Attendance, AttendanceRequest, AttendanceStatus};
use fitclub_core::pagination::{Page, PageParams};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

impl Database {
    pub(super) async fn migrate_attendance(&self) -> AppResult<()> {
        self.execute_ddl(
            "attendance",
            r"
            CREATE TABLE IF NOT EXISTS attendance (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_id INTEGER NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
                training_id INTEGER NOT NULL REFERENCES trainings(id) ON DELETE CASCADE,
                status TEXT NOT NULL DEFAULT 'registered'
                    CHECK (status IN ('registered', 'attended', 'cancelled', 'no_show')),
                is_present INTEGER NOT NULL DEFAULT 0,
                check_in_time TEXT,
                UNIQUE (client_id, training_id)
            )
            ",
        )
        .await?;
        self.execute_ddl(
            "attendance_training_index",
            "CREATE INDEX IF NOT EXISTS idx_attendance_training ON attendance(training_id)",
        )
        .await
    }
}

/// Filters for listing attendance
#[derive(Debug, Clone, Copy, Default)]
pub struct AttendanceFilter {
    /// Only rows for this training
    pub training_id: Option<i64>,
    /// Only rows for this client
    pub client_id: Option<i64>,
    /// Only rows in this status
    pub status: Option<AttendanceStatus>,
}

/// Error returned when a training has no free places
#[must_use]
pub fn training_full() -> AppError {
    AppError::new(ErrorCode::TrainingFull, "No places left")
}

/// Attendance database operations
pub struct AttendanceManager {
    pool: SqlitePool,
}

impl AttendanceManager {
    /// Create a new attendance manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a client for a training if a place is free
    ///
    /// The capacity check and the insert are one statement: the row is only
    /// inserted while the training has fewer attendance rows than `max_clients`.
    ///
    /// # Errors
    ///
    /// Returns `TRAINING_FULL` when no places are left, `RESOURCE_ALREADY_EXISTS`
    /// when the client is already registered, `INVALID_INPUT` for an unknown
    /// client, and `RESOURCE_NOT_FOUND` for an unknown training
    pub async fn register(&self, request: &AttendanceRequest) -> AppResult<Attendance> {
        let result = sqlx::query(
            r"
            INSERT INTO attendance (client_id, training_id, status, is_present, check_in_time)
            SELECT $1, t.id, $3, $4, $5
            FROM trainings t
            WHERE t.id = $2
              AND (SELECT COUNT(*) FROM attendance a WHERE a.training_id = t.id) < t.max_clients
            ",
        )
        .bind(request.client_id)
        .bind(request.training_id)
        .bind(request.status.as_str())
        .bind(request.is_present)
        .bind(request.check_in_time.map(format_timestamp))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to register attendance", e))?;

        if result.rows_affected() == 0 {
            let training: Option<i64> = sqlx::query_scalar("SELECT id FROM trainings WHERE id = $1")
                .bind(request.training_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::from_sqlx("Failed to look up training", e))?;
            return Err(match training {
                Some(_) => training_full(),
                None => AppError::not_found("Training"),
            });
        }

        self.get(result.last_insert_rowid())
            .await?
            .ok_or_else(|| AppError::internal("Attendance vanished after insert"))
    }

    /// Get an attendance record by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, id: i64) -> AppResult<Option<Attendance>> {
        let row = sqlx::query(
            r"
            SELECT id, client_id, training_id, status, is_present, check_in_time
            FROM attendance WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to get attendance", e))?;

        row.map(|r| row_to_attendance(&r)).transpose()
    }

    /// Trainer leading the training an attendance record belongs to
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn training_trainer(&self, id: i64) -> AppResult<Option<i64>> {
        sqlx::query_scalar(
            r"
            SELECT t.trainer_id
            FROM attendance a JOIN trainings t ON t.id = a.training_id
            WHERE a.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to look up attendance training", e))
    }

    /// List attendance records
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list(
        &self,
        filter: &AttendanceFilter,
        params: &PageParams,
    ) -> AppResult<Page<Attendance>> {
        let status = filter.status.map(|s| s.as_str());

        let rows = sqlx::query(
            r"
            SELECT id, client_id, training_id, status, is_present, check_in_time
            FROM attendance
            WHERE ($1 IS NULL OR training_id = $1)
              AND ($2 IS NULL OR client_id = $2)
              AND ($3 IS NULL OR status = $3)
            ORDER BY id
            LIMIT $4 OFFSET $5
            ",
        )
        .bind(filter.training_id)
        .bind(filter.client_id)
        .bind(status)
        .bind(i64::from(params.limit()))
        .bind(i64::from(params.offset()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to list attendance", e))?;

        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM attendance
            WHERE ($1 IS NULL OR training_id = $1)
              AND ($2 IS NULL OR client_id = $2)
              AND ($3 IS NULL OR status = $3)
            ",
        )
        .bind(filter.training_id)
        .bind(filter.client_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to count attendance", e))?;

        let records = rows.iter().map(row_to_attendance).collect::<AppResult<_>>()?;
        Ok(Page::new(records, count_from_db(count), params))
    }

    /// Replace an attendance record's fields
    ///
    /// Moving the record to another training takes a place there, so the same
    /// capacity guard as registration applies.
    ///
    /// # Errors
    ///
    /// Returns `TRAINING_FULL` when the target training has no places left
    pub async fn update(
        &self,
        id: i64,
        request: &AttendanceRequest,
    ) -> AppResult<Option<Attendance>> {
        let result = sqlx::query(
            r"
            UPDATE attendance
            SET client_id = $1, training_id = $2, status = $3, is_present = $4, check_in_time = $5
            WHERE id = $6
              AND (
                training_id = $2
                OR (SELECT COUNT(*) FROM attendance a WHERE a.training_id = $2)
                    < (SELECT t.max_clients FROM trainings t WHERE t.id = $2)
              )
            ",
        )
        .bind(request.client_id)
        .bind(request.training_id)
        .bind(request.status.as_str())
        .bind(request.is_present)
        .bind(request.check_in_time.map(format_timestamp))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to update attendance", e))?;

        if result.rows_affected() == 0 {
            return match self.get(id).await? {
                Some(_) => Err(training_full()),
                None => Ok(None),
            };
        }
        self.get(id).await
    }

    /// Mark the client as present now
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn check_in(&self, id: i64, at: DateTime<Utc>) -> AppResult<Option<Attendance>> {
        let result = sqlx::query(
            r"
            UPDATE attendance
            SET status = 'attended', is_present = 1, check_in_time = $1
            WHERE id = $2
            ",
        )
        .bind(format_timestamp(at))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to check in", e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Delete an attendance record, freeing the place
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx_delete("Failed to delete attendance", e))?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_attendance(row: &SqliteRow) -> AppResult<Attendance> {
    let status: String = row.try_get("status")?;
    let check_in_time: Option<String> = row.try_get("check_in_time")?;

    Ok(Attendance {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        training_id: row.try_get("training_id")?,
        status: AttendanceStatus::parse(&status).ok_or_else(|| {
            AppError::internal(format!("Unknown stored attendance status '{status}'"))
        })?,
        is_present: row.try_get("is_present")?,
        check_in_time: check_in_time.as_deref().map(parse_timestamp).transpose()?,
    })
}
