// ABOUTME: Database operations for client payments
// ABOUTME: Amounts are stored in minor units; the payment date is set at creation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{count_from_db, format_timestamp, parse_timestamp, Database};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use fitclub_core::models::{money, Payment, PaymentRequest, PaymentType};
use fitclub_core::pagination::{Page, PageParams};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

impl Database {
    pub(super) async fn migrate_payments(&self) -> AppResult<()> {
        self.execute_ddl(
            "payments",
            r"
            CREATE TABLE IF NOT EXISTS payments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_id INTEGER NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
                membership_id INTEGER REFERENCES memberships(id) ON DELETE SET NULL,
                amount_minor INTEGER NOT NULL CHECK (amount_minor > 0),
                payment_date TEXT NOT NULL,
                payment_type TEXT NOT NULL CHECK (payment_type IN ('cash', 'card', 'transfer')),
                description TEXT
            )
            ",
        )
        .await?;
        self.execute_ddl(
            "payments_date_index",
            "CREATE INDEX IF NOT EXISTS idx_payments_date ON payments(payment_date)",
        )
        .await
    }
}

/// Filters for listing payments
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentFilter {
    /// Only payments by this client
    pub client_id: Option<i64>,
    /// Earliest payment time, inclusive
    pub date_from: Option<DateTime<Utc>>,
    /// Latest payment time, exclusive
    pub date_to: Option<DateTime<Utc>>,
}

/// Payment database operations
pub struct PaymentsManager {
    pool: SqlitePool,
}

impl PaymentsManager {
    /// Create a new payments manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a payment made at `paid_at`
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when the client or membership does not exist
    pub async fn create(
        &self,
        request: &PaymentRequest,
        paid_at: DateTime<Utc>,
    ) -> AppResult<Payment> {
        let result = sqlx::query(
            r"
            INSERT INTO payments (client_id, membership_id, amount_minor, payment_date, payment_type, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(request.client_id)
        .bind(request.membership_id)
        .bind(money::to_minor("amount", request.amount)?)
        .bind(format_timestamp(paid_at))
        .bind(request.payment_type.as_str())
        .bind(&request.description)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to create payment", e))?;

        self.get(result.last_insert_rowid())
            .await?
            .ok_or_else(|| AppError::internal("Payment vanished after insert"))
    }

    /// Get a payment by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, id: i64) -> AppResult<Option<Payment>> {
        let row = sqlx::query(
            r"
            SELECT id, client_id, membership_id, amount_minor, payment_date, payment_type, description
            FROM payments WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to get payment", e))?;

        row.map(|r| row_to_payment(&r)).transpose()
    }

    /// List payments, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list(&self, filter: &PaymentFilter, params: &PageParams) -> AppResult<Page<Payment>> {
        let date_from = filter.date_from.map(format_timestamp);
        let date_to = filter.date_to.map(format_timestamp);

        let rows = sqlx::query(
            r"
            SELECT id, client_id, membership_id, amount_minor, payment_date, payment_type, description
            FROM payments
            WHERE ($1 IS NULL OR client_id = $1)
              AND ($2 IS NULL OR payment_date >= $2)
              AND ($3 IS NULL OR payment_date < $3)
            ORDER BY payment_date DESC, id DESC
            LIMIT $4 OFFSET $5
            ",
        )
        .bind(filter.client_id)
        .bind(&date_from)
        .bind(&date_to)
        .bind(i64::from(params.limit()))
        .bind(i64::from(params.offset()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to list payments", e))?;

        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM payments
            WHERE ($1 IS NULL OR client_id = $1)
              AND ($2 IS NULL OR payment_date >= $2)
              AND ($3 IS NULL OR payment_date < $3)
            ",
        )
        .bind(filter.client_id)
        .bind(&date_from)
        .bind(&date_to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to count payments", e))?;

        let payments = rows.iter().map(row_to_payment).collect::<AppResult<_>>()?;
        Ok(Page::new(payments, count_from_db(count), params))
    }

    /// Replace a payment's fields; the payment date is kept
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when the client or membership does not exist
    pub async fn update(&self, id: i64, request: &PaymentRequest) -> AppResult<Option<Payment>> {
        let result = sqlx::query(
            r"
            UPDATE payments
            SET client_id = $1, membership_id = $2, amount_minor = $3, payment_type = $4, description = $5
            WHERE id = $6
            ",
        )
        .bind(request.client_id)
        .bind(request.membership_id)
        .bind(money::to_minor("amount", request.amount)?)
        .bind(request.payment_type.as_str())
        .bind(&request.description)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to update payment", e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Delete a payment
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx_delete("Failed to delete payment", e))?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_payment(row: &SqliteRow) -> AppResult<Payment> {
    let payment_date: String = row.try_get("payment_date")?;
    let payment_type: String = row.try_get("payment_type")?;

    Ok(Payment {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        membership_id: row.try_get("membership_id")?,
        amount: money::from_minor(row.try_get("amount_minor")?),
        payment_date: parse_timestamp(&payment_date)?,
        payment_type: PaymentType::parse(&payment_type).ok_or_else(|| {
            AppError::internal(format!("Unknown stored payment type '{payment_type}'"))
        })?,
        description: row.try_get("description")?,
    })
}
