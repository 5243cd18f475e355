// ABOUTME: Database operations for scheduled trainings
// ABOUTME: Listing joins the trainer surname; deleting a training removes its attendance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{count_from_db, format_timestamp, parse_timestamp, Database};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use fitclub_core::models::{Training, TrainingRequest, TrainingStatus};
use fitclub_core::pagination::{Page, PageParams};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

impl Database {
    pub(super) async fn migrate_trainings(&self) -> AppResult<()> {
        self.execute_ddl(
            "trainings",
            r"
            CREATE TABLE IF NOT EXISTS trainings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                trainer_id INTEGER NOT NULL REFERENCES trainers(id) ON DELETE CASCADE,
                training_type_id INTEGER NOT NULL REFERENCES membership_types(id) ON DELETE CASCADE,
                hall_id INTEGER NOT NULL REFERENCES halls(id) ON DELETE CASCADE,
                date_time TEXT NOT NULL,
                max_clients INTEGER NOT NULL CHECK (max_clients > 0),
                status TEXT NOT NULL DEFAULT 'scheduled'
                    CHECK (status IN ('scheduled', 'cancelled', 'completed'))
            )
            ",
        )
        .await?;
        self.execute_ddl(
            "trainings_date_index",
            "CREATE INDEX IF NOT EXISTS idx_trainings_date_time ON trainings(date_time)",
        )
        .await?;
        self.execute_ddl(
            "trainings_trainer_index",
            "CREATE INDEX IF NOT EXISTS idx_trainings_trainer ON trainings(trainer_id)",
        )
        .await
    }
}

/// Filters for listing trainings
#[derive(Debug, Clone, Copy, Default)]
pub struct TrainingFilter {
    /// Only trainings in this status
    pub status: Option<TrainingStatus>,
    /// Only trainings led by this trainer
    pub trainer_id: Option<i64>,
    /// Earliest start time, inclusive
    pub date_from: Option<DateTime<Utc>>,
    /// Latest start time, exclusive
    pub date_to: Option<DateTime<Utc>>,
}

const SELECT_TRAINING: &str = r"
    SELECT t.id, t.trainer_id, tr.surname AS trainer_name, t.training_type_id, t.hall_id,
           t.date_time, t.max_clients, t.status
    FROM trainings t
    JOIN trainers tr ON tr.id = t.trainer_id
";

/// Training database operations
pub struct TrainingsManager {
    pool: SqlitePool,
}

impl TrainingsManager {
    /// Create a new trainings manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a training
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when a referenced record does not exist
    pub async fn create(&self, request: &TrainingRequest) -> AppResult<Training> {
        let result = sqlx::query(
            r"
            INSERT INTO trainings (trainer_id, training_type_id, hall_id, date_time, max_clients, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(request.trainer_id)
        .bind(request.training_type_id)
        .bind(request.hall_id)
        .bind(format_timestamp(request.date_time))
        .bind(request.max_clients)
        .bind(request.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to create training", e))?;

        self.get(result.last_insert_rowid())
            .await?
            .ok_or_else(|| AppError::internal("Training vanished after insert"))
    }

    /// Get a training by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, id: i64) -> AppResult<Option<Training>> {
        let query = format!("{SELECT_TRAINING} WHERE t.id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to get training", e))?;

        row.map(|r| row_to_training(&r)).transpose()
    }

    /// List trainings ordered by start time
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list(
        &self,
        filter: &TrainingFilter,
        params: &PageParams,
    ) -> AppResult<Page<Training>> {
        const WHERE: &str = r"
            WHERE ($1 IS NULL OR t.status = $1)
              AND ($2 IS NULL OR t.trainer_id = $2)
              AND ($3 IS NULL OR t.date_time >= $3)
              AND ($4 IS NULL OR t.date_time < $4)
        ";
        let status = filter.status.map(|s| s.as_str());
        let date_from = filter.date_from.map(format_timestamp);
        let date_to = filter.date_to.map(format_timestamp);

        let query = format!("{SELECT_TRAINING} {WHERE} ORDER BY t.date_time, t.id LIMIT $5 OFFSET $6");
        let rows = sqlx::query(&query)
            .bind(status)
            .bind(filter.trainer_id)
            .bind(&date_from)
            .bind(&date_to)
            .bind(i64::from(params.limit()))
            .bind(i64::from(params.offset()))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to list trainings", e))?;

        let count_query = format!("SELECT COUNT(*) FROM trainings t {WHERE}");
        let count: i64 = sqlx::query_scalar(&count_query)
            .bind(status)
            .bind(filter.trainer_id)
            .bind(&date_from)
            .bind(&date_to)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to count trainings", e))?;

        let trainings = rows.iter().map(row_to_training).collect::<AppResult<_>>()?;
        Ok(Page::new(trainings, count_from_db(count), params))
    }

    /// Replace a training's fields
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when a referenced record does not exist
    pub async fn update(&self, id: i64, request: &TrainingRequest) -> AppResult<Option<Training>> {
        let result = sqlx::query(
            r"
            UPDATE trainings
            SET trainer_id = $1, training_type_id = $2, hall_id = $3, date_time = $4,
                max_clients = $5, status = $6
            WHERE id = $7
            ",
        )
        .bind(request.trainer_id)
        .bind(request.training_type_id)
        .bind(request.hall_id)
        .bind(format_timestamp(request.date_time))
        .bind(request.max_clients)
        .bind(request.status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to update training", e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Delete a training and its attendance
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM trainings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx_delete("Failed to delete training", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of attendance rows registered for a training
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn registered_count(&self, id: i64) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM attendance WHERE training_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to count registrations", e))
    }
}

fn row_to_training(row: &SqliteRow) -> AppResult<Training> {
    let date_time: String = row.try_get("date_time")?;
    let status: String = row.try_get("status")?;

    Ok(Training {
        id: row.try_get("id")?,
        trainer_id: row.try_get("trainer_id")?,
        trainer_name: row.try_get("trainer_name")?,
        training_type_id: row.try_get("training_type_id")?,
        hall_id: row.try_get("hall_id")?,
        date_time: parse_timestamp(&date_time)?,
        max_clients: row.try_get("max_clients")?,
        status: TrainingStatus::parse(&status).ok_or_else(|| {
            AppError::internal(format!("Unknown stored training status '{status}'"))
        })?,
    })
}
