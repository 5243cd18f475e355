// ABOUTME: Database operations for staff accounts
// ABOUTME: Stores bcrypt hashes only; hashing happens before values reach this layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{count_from_db, format_timestamp, parse_timestamp, Database};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use fitclub_core::models::{User, UserRole};
use fitclub_core::pagination::{Page, PageParams};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

impl Database {
    pub(super) async fn migrate_users(&self) -> AppResult<()> {
        self.execute_ddl(
            "users",
            r"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email TEXT,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'admin'
                    CHECK (role IN ('admin', 'trainer', 'manager')),
                trainer_id INTEGER UNIQUE REFERENCES trainers(id) ON DELETE SET NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                last_login TEXT
            )
            ",
        )
        .await
    }
}

/// Stored account fields other than the password hash
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Login name
    pub username: String,
    /// Contact e-mail
    pub email: Option<String>,
    /// Access role
    pub role: UserRole,
    /// Linked trainer record
    pub trainer_id: Option<i64>,
    /// Active flag
    pub is_active: bool,
}

/// Staff account database operations
pub struct UsersManager {
    pool: SqlitePool,
}

impl UsersManager {
    /// Create a new users manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an account
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` for a taken username or trainer link
    pub async fn create(&self, user: &UserRecord, password_hash: &str) -> AppResult<User> {
        let result = sqlx::query(
            r"
            INSERT INTO users (username, email, password_hash, role, trainer_id, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(password_hash)
        .bind(user.role.as_str())
        .bind(user.trainer_id)
        .bind(user.is_active)
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to create user", e))?;

        self.get(result.last_insert_rowid())
            .await?
            .ok_or_else(|| AppError::internal("User vanished after insert"))
    }

    /// Get an account by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, username, email, password_hash, role, trainer_id, is_active, created_at, last_login
            FROM users WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to get user", e))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// Get an account by login name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, username, email, password_hash, role, trainer_id, is_active, created_at, last_login
            FROM users WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to get user by username", e))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// List accounts ordered by username
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list(&self, params: &PageParams) -> AppResult<Page<User>> {
        let rows = sqlx::query(
            r"
            SELECT id, username, email, password_hash, role, trainer_id, is_active, created_at, last_login
            FROM users
            ORDER BY username
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(i64::from(params.limit()))
        .bind(i64::from(params.offset()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to list users", e))?;

        let users = rows.iter().map(row_to_user).collect::<AppResult<_>>()?;
        Ok(Page::new(users, self.count().await?, params))
    }

    /// Number of accounts
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to count users", e))?;
        Ok(count_from_db(count))
    }

    /// Replace an account's profile; the password hash is replaced only when given
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` for a taken username or trainer link
    pub async fn update(
        &self,
        id: i64,
        user: &UserRecord,
        password_hash: Option<&str>,
    ) -> AppResult<Option<User>> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET username = $1, email = $2, role = $3, trainer_id = $4, is_active = $5,
                password_hash = COALESCE($6, password_hash)
            WHERE id = $7
            ",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(user.trainer_id)
        .bind(user.is_active)
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to update user", e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Replace the password hash of the named account
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn set_password_hash(&self, username: &str, password_hash: &str) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE username = $2")
            .bind(password_hash)
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to set password", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a successful login
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn touch_last_login(&self, id: i64, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login = $1 WHERE id = $2")
            .bind(format_timestamp(at))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to record login", e))?;
        Ok(())
    }

    /// Delete an account
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx_delete("Failed to delete user", e))?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let role: String = row.try_get("role")?;
    let created_at: String = row.try_get("created_at")?;
    let last_login: Option<String> = row.try_get("last_login")?;

    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        role: UserRole::parse(&role)
            .ok_or_else(|| AppError::internal(format!("Unknown stored role '{role}'")))?,
        trainer_id: row.try_get("trainer_id")?,
        is_active: row.try_get("is_active")?,
        created_at: parse_timestamp(&created_at)?,
        last_login: last_login.as_deref().map(parse_timestamp).transpose()?,
        password_hash: row.try_get("password_hash")?,
    })
}
