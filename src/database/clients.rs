// ABOUTME: Database operations for club clients
// ABOUTME: Deleting a client cascades to memberships, attendance, and payments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{count_from_db, format_date, parse_date, Database};
use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use fitclub_core::models::{Client, ClientRequest};
use fitclub_core::pagination::{Page, PageParams};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

impl Database {
    pub(super) async fn migrate_clients(&self) -> AppResult<()> {
        self.execute_ddl(
            "clients",
            r"
            CREATE TABLE IF NOT EXISTS clients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                surname TEXT NOT NULL,
                secondname TEXT NOT NULL DEFAULT '',
                phone TEXT NOT NULL UNIQUE,
                email TEXT,
                birth_date TEXT NOT NULL,
                registration_date TEXT NOT NULL
            )
            ",
        )
        .await?;
        self.execute_ddl(
            "clients_surname_index",
            "CREATE INDEX IF NOT EXISTS idx_clients_surname ON clients(surname)",
        )
        .await
    }
}

/// Client database operations
pub struct ClientsManager {
    pool: SqlitePool,
}

impl ClientsManager {
    /// Create a new clients manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a client; `registration_date` is fixed to `today`
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` for a duplicate phone number
    pub async fn create(&self, request: &ClientRequest, today: NaiveDate) -> AppResult<Client> {
        let result = sqlx::query(
            r"
            INSERT INTO clients (name, surname, secondname, phone, email, birth_date, registration_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(&request.name)
        .bind(&request.surname)
        .bind(&request.secondname)
        .bind(&request.phone)
        .bind(&request.email)
        .bind(format_date(request.birth_date))
        .bind(format_date(today))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to create client", e))?;

        self.get(result.last_insert_rowid())
            .await?
            .ok_or_else(|| AppError::internal("Client vanished after insert"))
    }

    /// Get a client by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, id: i64) -> AppResult<Option<Client>> {
        let row = sqlx::query(
            r"
            SELECT id, name, surname, secondname, phone, email, birth_date, registration_date
            FROM clients WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to get client", e))?;

        row.map(|r| row_to_client(&r)).transpose()
    }

    /// Check that a client exists
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to look up client", e))?;
        Ok(found.is_some())
    }

    /// List clients, optionally matching `search` against surname or phone
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list(&self, search: Option<&str>, params: &PageParams) -> AppResult<Page<Client>> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));

        let rows = sqlx::query(
            r"
            SELECT id, name, surname, secondname, phone, email, birth_date, registration_date
            FROM clients
            WHERE ($1 IS NULL OR surname LIKE $1 OR phone LIKE $1)
            ORDER BY surname, name, id
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(&pattern)
        .bind(i64::from(params.limit()))
        .bind(i64::from(params.offset()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to list clients", e))?;

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM clients WHERE ($1 IS NULL OR surname LIKE $1 OR phone LIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to count clients", e))?;

        let clients = rows.iter().map(row_to_client).collect::<AppResult<_>>()?;
        Ok(Page::new(clients, count_from_db(count), params))
    }

    /// Replace a client's fields; the registration date never changes
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` for a duplicate phone number
    pub async fn update(&self, id: i64, request: &ClientRequest) -> AppResult<Option<Client>> {
        let result = sqlx::query(
            r"
            UPDATE clients
            SET name = $1, surname = $2, secondname = $3, phone = $4, email = $5, birth_date = $6
            WHERE id = $7
            ",
        )
        .bind(&request.name)
        .bind(&request.surname)
        .bind(&request.secondname)
        .bind(&request.phone)
        .bind(&request.email)
        .bind(format_date(request.birth_date))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to update client", e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Delete a client together with their memberships, attendance, and payments
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx_delete("Failed to delete client", e))?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_client(row: &SqliteRow) -> AppResult<Client> {
    let birth_date: String = row.try_get("birth_date")?;
    let registration_date: String = row.try_get("registration_date")?;

    Ok(Client {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        surname: row.try_get("surname")?,
        secondname: row.try_get("secondname")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        birth_date: parse_date(&birth_date)?,
        registration_date: parse_date(&registration_date)?,
    })
}
