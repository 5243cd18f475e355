// ABOUTME: Database operations for membership types (plans with duration and price)
// ABOUTME: A type still used by memberships cannot be deleted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{count_from_db, Database};
use crate::errors::{AppError, AppResult};
use fitclub_core::models::{money, MembershipType, MembershipTypeRequest};
use fitclub_core::pagination::{Page, PageParams};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

impl Database {
    pub(super) async fn migrate_membership_types(&self) -> AppResult<()> {
        self.execute_ddl(
            "membership_types",
            r"
            CREATE TABLE IF NOT EXISTS membership_types (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                duration_days INTEGER NOT NULL CHECK (duration_days > 0),
                price_minor INTEGER NOT NULL CHECK (price_minor >= 0),
                description TEXT
            )
            ",
        )
        .await
    }
}

/// Membership type database operations
pub struct MembershipTypesManager {
    pool: SqlitePool,
}

impl MembershipTypesManager {
    /// Create a new membership types manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a membership type
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create(&self, request: &MembershipTypeRequest) -> AppResult<MembershipType> {
        let result = sqlx::query(
            r"
            INSERT INTO membership_types (name, duration_days, price_minor, description)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(&request.name)
        .bind(request.duration_days)
        .bind(money::to_minor("price", request.price)?)
        .bind(&request.description)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to create membership type", e))?;

        self.get(result.last_insert_rowid())
            .await?
            .ok_or_else(|| AppError::internal("Membership type vanished after insert"))
    }

    /// Get a membership type by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, id: i64) -> AppResult<Option<MembershipType>> {
        let row = sqlx::query(
            "SELECT id, name, duration_days, price_minor, description FROM membership_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to get membership type", e))?;

        row.map(|r| row_to_membership_type(&r)).transpose()
    }

    /// List membership types by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list(&self, params: &PageParams) -> AppResult<Page<MembershipType>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, duration_days, price_minor, description
            FROM membership_types
            ORDER BY name, id
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(i64::from(params.limit()))
        .bind(i64::from(params.offset()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to list membership types", e))?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM membership_types")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to count membership types", e))?;

        let types = rows
            .iter()
            .map(row_to_membership_type)
            .collect::<AppResult<_>>()?;
        Ok(Page::new(types, count_from_db(count), params))
    }

    /// Replace a membership type's fields
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update(
        &self,
        id: i64,
        request: &MembershipTypeRequest,
    ) -> AppResult<Option<MembershipType>> {
        let result = sqlx::query(
            r"
            UPDATE membership_types
            SET name = $1, duration_days = $2, price_minor = $3, description = $4
            WHERE id = $5
            ",
        )
        .bind(&request.name)
        .bind(request.duration_days)
        .bind(money::to_minor("price", request.price)?)
        .bind(&request.description)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to update membership type", e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Delete a membership type; blocked while memberships reference it
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_LOCKED` when memberships still use the type
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM membership_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx_delete("Failed to delete membership type", e))?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_membership_type(row: &SqliteRow) -> AppResult<MembershipType> {
    Ok(MembershipType {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        duration_days: row.try_get("duration_days")?,
        price: money::from_minor(row.try_get("price_minor")?),
        description: row.try_get("description")?,
    })
}
