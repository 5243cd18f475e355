// ABOUTME: Database operations for halls (training rooms)
// ABOUTME: Hall capacity bounds the max_clients of trainings held there
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{count_from_db, Database};
use crate::errors::{AppError, AppResult};
use fitclub_core::models::{Hall, HallRequest};
use fitclub_core::pagination::{Page, PageParams};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

impl Database {
    pub(super) async fn migrate_halls(&self) -> AppResult<()> {
        self.execute_ddl(
            "halls",
            r"
            CREATE TABLE IF NOT EXISTS halls (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                capacity INTEGER NOT NULL CHECK (capacity > 0),
                equipment TEXT
            )
            ",
        )
        .await
    }
}

/// Hall database operations
pub struct HallsManager {
    pool: SqlitePool,
}

impl HallsManager {
    /// Create a new halls manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a hall
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` for a duplicate name
    pub async fn create(&self, request: &HallRequest) -> AppResult<Hall> {
        let result = sqlx::query("INSERT INTO halls (name, capacity, equipment) VALUES ($1, $2, $3)")
            .bind(&request.name)
            .bind(request.capacity)
            .bind(&request.equipment)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to create hall", e))?;

        self.get(result.last_insert_rowid())
            .await?
            .ok_or_else(|| AppError::internal("Hall vanished after insert"))
    }

    /// Get a hall by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, id: i64) -> AppResult<Option<Hall>> {
        let row = sqlx::query("SELECT id, name, capacity, equipment FROM halls WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to get hall", e))?;

        row.map(|r| row_to_hall(&r)).transpose()
    }

    /// List halls by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list(&self, params: &PageParams) -> AppResult<Page<Hall>> {
        let rows = sqlx::query(
            "SELECT id, name, capacity, equipment FROM halls ORDER BY name LIMIT $1 OFFSET $2",
        )
        .bind(i64::from(params.limit()))
        .bind(i64::from(params.offset()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to list halls", e))?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM halls")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to count halls", e))?;

        let halls = rows.iter().map(row_to_hall).collect::<AppResult<_>>()?;
        Ok(Page::new(halls, count_from_db(count), params))
    }

    /// Largest `max_clients` among the hall's trainings, zero when none
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn largest_training(&self, id: i64) -> AppResult<i64> {
        let largest: Option<i64> =
            sqlx::query_scalar("SELECT MAX(max_clients) FROM trainings WHERE hall_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::from_sqlx("Failed to inspect hall trainings", e))?;
        Ok(largest.unwrap_or(0))
    }

    /// Replace a hall's fields
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` for a duplicate name
    pub async fn update(&self, id: i64, request: &HallRequest) -> AppResult<Option<Hall>> {
        let result =
            sqlx::query("UPDATE halls SET name = $1, capacity = $2, equipment = $3 WHERE id = $4")
                .bind(&request.name)
                .bind(request.capacity)
                .bind(&request.equipment)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::from_sqlx("Failed to update hall", e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Delete a hall and the trainings scheduled in it
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM halls WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx_delete("Failed to delete hall", e))?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_hall(row: &SqliteRow) -> AppResult<Hall> {
    Ok(Hall {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        capacity: row.try_get("capacity")?,
        equipment: row.try_get("equipment")?,
    })
}
