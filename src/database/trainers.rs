// ABOUTME: Database operations for trainer records
// ABOUTME: Trainers are referenced by trainings and may be linked to a trainer user account
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{count_from_db, Database};
use crate::errors::{AppError, AppResult};
use fitclub_core::models::{Trainer, TrainerRequest};
use fitclub_core::pagination::{Page, PageParams};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

impl Database {
    pub(super) async fn migrate_trainers(&self) -> AppResult<()> {
        self.execute_ddl(
            "trainers",
            r"
            CREATE TABLE IF NOT EXISTS trainers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                surname TEXT NOT NULL,
                secondname TEXT NOT NULL DEFAULT '',
                specialization TEXT NOT NULL,
                phone TEXT NOT NULL UNIQUE
            )
            ",
        )
        .await?;
        self.execute_ddl(
            "trainers_surname_index",
            "CREATE INDEX IF NOT EXISTS idx_trainers_surname ON trainers(surname)",
        )
        .await
    }
}

/// Trainer database operations
pub struct TrainersManager {
    pool: SqlitePool,
}

impl TrainersManager {
    /// Create a new trainers manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a trainer
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` for a duplicate phone number
    pub async fn create(&self, request: &TrainerRequest) -> AppResult<Trainer> {
        let result = sqlx::query(
            r"
            INSERT INTO trainers (name, surname, secondname, specialization, phone)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&request.name)
        .bind(&request.surname)
        .bind(&request.secondname)
        .bind(&request.specialization)
        .bind(&request.phone)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to create trainer", e))?;

        self.get(result.last_insert_rowid())
            .await?
            .ok_or_else(|| AppError::internal("Trainer vanished after insert"))
    }

    /// Get a trainer by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, id: i64) -> AppResult<Option<Trainer>> {
        let row = sqlx::query(
            r"
            SELECT id, name, surname, secondname, specialization, phone
            FROM trainers WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to get trainer", e))?;

        row.map(|r| row_to_trainer(&r)).transpose()
    }

    /// List trainers ordered by surname
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list(&self, params: &PageParams) -> AppResult<Page<Trainer>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, surname, secondname, specialization, phone
            FROM trainers
            ORDER BY surname, name, id
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(i64::from(params.limit()))
        .bind(i64::from(params.offset()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to list trainers", e))?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trainers")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to count trainers", e))?;

        let trainers = rows.iter().map(row_to_trainer).collect::<AppResult<_>>()?;
        Ok(Page::new(trainers, count_from_db(count), params))
    }

    /// Replace a trainer's fields
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` for a duplicate phone number
    pub async fn update(&self, id: i64, request: &TrainerRequest) -> AppResult<Option<Trainer>> {
        let result = sqlx::query(
            r"
            UPDATE trainers
            SET name = $1, surname = $2, secondname = $3, specialization = $4, phone = $5
            WHERE id = $6
            ",
        )
        .bind(&request.name)
        .bind(&request.surname)
        .bind(&request.secondname)
        .bind(&request.specialization)
        .bind(&request.phone)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to update trainer", e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Delete a trainer; their trainings are removed with them
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM trainers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx_delete("Failed to delete trainer", e))?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_trainer(row: &SqliteRow) -> AppResult<Trainer> {
    Ok(Trainer {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        surname: row.try_get("surname")?,
        secondname: row.try_get("secondname")?,
        specialization: row.try_get("specialization")?,
        phone: row.try_get("phone")?,
    })
}
