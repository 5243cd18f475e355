// ABOUTME: Read-only aggregate queries backing the PDF reports
// ABOUTME: Returns flat rows with display names already joined in
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{format_date, format_timestamp, parse_date, parse_timestamp};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use fitclub_core::models::{money, Decimal, PaymentType};
use sqlx::{Row, SqlitePool};

/// One payment line of the revenue report
#[derive(Debug, Clone)]
pub struct RevenueRow {
    /// When the payment was made
    pub payment_date: DateTime<Utc>,
    /// Client display name
    pub client_name: String,
    /// Amount paid
    pub amount: Decimal,
    /// Payment method
    pub payment_type: PaymentType,
}

/// One visit line of the attendance report
#[derive(Debug, Clone)]
pub struct VisitRow {
    /// Training start time
    pub training_time: DateTime<Utc>,
    /// Client display name
    pub client_name: String,
    /// Training type name
    pub training_name: String,
    /// Trainer display name
    pub trainer_name: String,
}

/// One trainer line of the performance report
#[derive(Debug, Clone)]
pub struct TrainerLoadRow {
    /// Trainer display name
    pub trainer_name: String,
    /// Area of expertise
    pub specialization: String,
    /// Number of trainings led
    pub trainings: i64,
    /// Number of attended visits across those trainings
    pub visits: i64,
}

/// One membership line of the expiring memberships report
#[derive(Debug, Clone)]
pub struct ExpiringRow {
    /// Client display name
    pub client_name: String,
    /// Client phone, for follow-up calls
    pub client_phone: String,
    /// Membership type name
    pub type_name: String,
    /// Last valid day
    pub end_date: NaiveDate,
}

/// Report queries
pub struct ReportsRepository {
    pool: SqlitePool,
}

impl ReportsRepository {
    /// Create a new reports repository
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Payments made in `[from, to)`, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn revenue(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<RevenueRow>> {
        let rows = sqlx::query(
            r"
            SELECT p.payment_date, c.surname || ' ' || c.name AS client_name,
                   p.amount_minor, p.payment_type
            FROM payments p
            JOIN clients c ON c.id = p.client_id
            WHERE ($1 IS NULL OR p.payment_date >= $1)
              AND ($2 IS NULL OR p.payment_date < $2)
            ORDER BY p.payment_date, p.id
            ",
        )
        .bind(from.map(format_timestamp))
        .bind(to.map(format_timestamp))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to load revenue", e))?;

        rows.iter()
            .map(|row| {
                let payment_date: String = row.try_get("payment_date")?;
                let payment_type: String = row.try_get("payment_type")?;
                Ok(RevenueRow {
                    payment_date: parse_timestamp(&payment_date)?,
                    client_name: row.try_get("client_name")?,
                    amount: money::from_minor(row.try_get("amount_minor")?),
                    payment_type: PaymentType::parse(&payment_type).ok_or_else(|| {
                        AppError::internal(format!("Unknown stored payment type '{payment_type}'"))
                    })?,
                })
            })
            .collect()
    }

    /// Attended visits, most recent training first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn visits(&self) -> AppResult<Vec<VisitRow>> {
        let rows = sqlx::query(
            r"
            SELECT t.date_time,
                   c.surname || ' ' || c.name AS client_name,
                   mt.name AS training_name,
                   tr.surname || ' ' || tr.name AS trainer_name
            FROM attendance a
            JOIN clients c ON c.id = a.client_id
            JOIN trainings t ON t.id = a.training_id
            JOIN trainers tr ON tr.id = t.trainer_id
            JOIN membership_types mt ON mt.id = t.training_type_id
            WHERE a.status = 'attended'
            ORDER BY t.date_time DESC, a.id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to load visits", e))?;

        rows.iter()
            .map(|row| {
                let date_time: String = row.try_get("date_time")?;
                Ok(VisitRow {
                    training_time: parse_timestamp(&date_time)?,
                    client_name: row.try_get("client_name")?,
                    training_name: row.try_get("training_name")?,
                    trainer_name: row.try_get("trainer_name")?,
                })
            })
            .collect()
    }

    /// Every trainer with the number of trainings led, busiest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn trainer_load(&self) -> AppResult<Vec<TrainerLoadRow>> {
        let rows = sqlx::query(
            r"
            SELECT tr.surname || ' ' || tr.name AS trainer_name,
                   tr.specialization,
                   (SELECT COUNT(*) FROM trainings t WHERE t.trainer_id = tr.id) AS trainings,
                   (SELECT COUNT(*) FROM attendance a
                      JOIN trainings t ON t.id = a.training_id
                     WHERE t.trainer_id = tr.id AND a.status = 'attended') AS visits
            FROM trainers tr
            ORDER BY trainings DESC, tr.surname, tr.name
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to load trainer performance", e))?;

        rows.iter()
            .map(|row| {
                Ok(TrainerLoadRow {
                    trainer_name: row.try_get("trainer_name")?,
                    specialization: row.try_get("specialization")?,
                    trainings: row.try_get("trainings")?,
                    visits: row.try_get("visits")?,
                })
            })
            .collect()
    }

    /// Active memberships ending on or before `until`, soonest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn expiring(&self, until: NaiveDate) -> AppResult<Vec<ExpiringRow>> {
        let rows = sqlx::query(
            r"
            SELECT c.surname || ' ' || c.name AS client_name, c.phone,
                   mt.name AS type_name, m.end_date
            FROM memberships m
            JOIN clients c ON c.id = m.client_id
            JOIN membership_types mt ON mt.id = m.type_id
            WHERE m.status = 'active' AND m.end_date <= $1
            ORDER BY m.end_date, c.surname
            ",
        )
        .bind(format_date(until))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to load expiring memberships", e))?;

        rows.iter()
            .map(|row| {
                let end_date: String = row.try_get("end_date")?;
                Ok(ExpiringRow {
                    client_name: row.try_get("client_name")?,
                    client_phone: row.try_get("phone")?,
                    type_name: row.try_get("type_name")?,
                    end_date: parse_date(&end_date)?,
                })
            })
            .collect()
    }
}
