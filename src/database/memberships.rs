// ABOUTME: Database operations for client memberships and the expiry sweep
// ABOUTME: Status is derived before every write; the sweep bulk-expires lapsed memberships
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{count_from_db, format_date, parse_date, Database};
use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use fitclub_core::models::{Membership, MembershipStatus};
use fitclub_core::pagination::{Page, PageParams};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

impl Database {
    pub(super) async fn migrate_memberships(&self) -> AppResult<()> {
        self.execute_ddl(
            "memberships",
            r"
            CREATE TABLE IF NOT EXISTS memberships (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_id INTEGER NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
                type_id INTEGER NOT NULL REFERENCES membership_types(id) ON DELETE RESTRICT,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'active'
                    CHECK (status IN ('active', 'suspended', 'expired')),
                CHECK (end_date >= start_date)
            )
            ",
        )
        .await?;
        self.execute_ddl(
            "memberships_client_index",
            "CREATE INDEX IF NOT EXISTS idx_memberships_client ON memberships(client_id)",
        )
        .await?;
        self.execute_ddl(
            "memberships_status_end_index",
            "CREATE INDEX IF NOT EXISTS idx_memberships_status_end ON memberships(status, end_date)",
        )
        .await
    }
}

/// Membership row ready to store: end date resolved and status derived
#[derive(Debug, Clone, Copy)]
pub struct MembershipRecord {
    /// Owning client
    pub client_id: i64,
    /// Membership type
    pub type_id: i64,
    /// First valid day
    pub start_date: NaiveDate,
    /// Last valid day
    pub end_date: NaiveDate,
    /// Derived status
    pub status: MembershipStatus,
}

/// Filters for listing memberships
#[derive(Debug, Clone, Copy, Default)]
pub struct MembershipFilter {
    /// Only memberships of this client
    pub client_id: Option<i64>,
    /// Only memberships in this status
    pub status: Option<MembershipStatus>,
}

/// Membership database operations
pub struct MembershipsManager {
    pool: SqlitePool,
}

impl MembershipsManager {
    /// Create a new memberships manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a membership
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when the client or type does not exist
    pub async fn create(&self, record: &MembershipRecord) -> AppResult<Membership> {
        let result = sqlx::query(
            r"
            INSERT INTO memberships (client_id, type_id, start_date, end_date, status)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(record.client_id)
        .bind(record.type_id)
        .bind(format_date(record.start_date))
        .bind(format_date(record.end_date))
        .bind(record.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to create membership", e))?;

        self.get(result.last_insert_rowid())
            .await?
            .ok_or_else(|| AppError::internal("Membership vanished after insert"))
    }

    /// Get a membership by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, id: i64) -> AppResult<Option<Membership>> {
        let row = sqlx::query(
            r"
            SELECT id, client_id, type_id, start_date, end_date, status
            FROM memberships WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to get membership", e))?;

        row.map(|r| row_to_membership(&r)).transpose()
    }

    /// List memberships, newest end date first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list(
        &self,
        filter: &MembershipFilter,
        params: &PageParams,
    ) -> AppResult<Page<Membership>> {
        let status = filter.status.map(|s| s.as_str());

        let rows = sqlx::query(
            r"
            SELECT id, client_id, type_id, start_date, end_date, status
            FROM memberships
            WHERE ($1 IS NULL OR client_id = $1)
              AND ($2 IS NULL OR status = $2)
            ORDER BY end_date DESC, id DESC
            LIMIT $3 OFFSET $4
            ",
        )
        .bind(filter.client_id)
        .bind(status)
        .bind(i64::from(params.limit()))
        .bind(i64::from(params.offset()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to list memberships", e))?;

        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM memberships
            WHERE ($1 IS NULL OR client_id = $1)
              AND ($2 IS NULL OR status = $2)
            ",
        )
        .bind(filter.client_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to count memberships", e))?;

        let memberships = rows
            .iter()
            .map(row_to_membership)
            .collect::<AppResult<_>>()?;
        Ok(Page::new(memberships, count_from_db(count), params))
    }

    /// Replace a membership's fields
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when the client or type does not exist
    pub async fn update(&self, id: i64, record: &MembershipRecord) -> AppResult<Option<Membership>> {
        let result = sqlx::query(
            r"
            UPDATE memberships
            SET client_id = $1, type_id = $2, start_date = $3, end_date = $4, status = $5
            WHERE id = $6
            ",
        )
        .bind(record.client_id)
        .bind(record.type_id)
        .bind(format_date(record.start_date))
        .bind(format_date(record.end_date))
        .bind(record.status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to update membership", e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Delete a membership; its payments stay with the membership link cleared
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM memberships WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx_delete("Failed to delete membership", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark every membership that ended before `today` as expired
    ///
    /// Returns the number of memberships whose status changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn refresh_expired_memberships(&self, today: NaiveDate) -> AppResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE memberships
            SET status = 'expired'
            WHERE end_date < $1 AND status <> 'expired'
            ",
        )
        .bind(format_date(today))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to expire memberships", e))?;

        let expired = result.rows_affected();
        if expired > 0 {
            info!(expired, today = %today, "Expired lapsed memberships");
        }
        Ok(expired)
    }
}

fn row_to_membership(row: &SqliteRow) -> AppResult<Membership> {
    let start_date: String = row.try_get("start_date")?;
    let end_date: String = row.try_get("end_date")?;
    let status: String = row.try_get("status")?;

    Ok(Membership {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        type_id: row.try_get("type_id")?,
        start_date: parse_date(&start_date)?,
        end_date: parse_date(&end_date)?,
        status: MembershipStatus::parse(&status).ok_or_else(|| {
            AppError::internal(format!("Unknown stored membership status '{status}'"))
        })?,
    })
}
