// ABOUTME: SQLite database management: connection pool, schema migrations, and record managers
// ABOUTME: Each club resource has its own manager type sharing the same pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

//! # Database Management
//!
//! The schema is created by idempotent migrations when the database is
//! opened. Foreign keys are enforced on every connection so the cascade rules
//! declared in the schema (client deletion removes memberships, attendance and
//! payments; a membership type in use cannot be deleted) hold regardless of
//! which manager performs the delete.

/// Attendance records and capacity-guarded registration
pub mod attendance;
/// Client records
pub mod clients;
/// Halls
pub mod halls;
/// Membership types (plans)
pub mod membership_types;
/// Client memberships and the expiry sweep
pub mod memberships;
/// Payments
pub mod payments;
/// Aggregate queries backing the PDF reports
pub mod reports;
/// Default accounts for an empty database
pub mod seed;
/// Trainers
pub mod trainers;
/// Trainings
pub mod trainings;
/// Staff accounts
pub mod users;

pub use attendance::AttendanceManager;
pub use clients::ClientsManager;
pub use halls::HallsManager;
pub use membership_types::MembershipTypesManager;
pub use memberships::MembershipsManager;
pub use payments::PaymentsManager;
pub use reports::ReportsRepository;
pub use trainers::TrainersManager;
pub use trainings::TrainingsManager;
pub use users::UsersManager;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use fitclub_core::errors::{AppError, AppResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Date format used for `DATE` columns
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database manager owning the connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the file cannot be created,
    /// or a migration fails
    pub async fn new(database_url: &str, max_connections: u32) -> AppResult<Self> {
        let is_memory = database_url.contains(":memory:");
        if !is_memory {
            ensure_parent_dir(database_url).await?;
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid DATABASE_URL '{database_url}': {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        let options = if is_memory {
            options
        } else {
            options.journal_mode(SqliteJournalMode::Wal)
        };

        // Every new in-memory connection is a fresh empty database, so keep
        // exactly one connection open for the life of the pool
        let pool_options = if is_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to open database", e))?;

        let db = Self { pool };
        db.migrate().await?;
        info!("Database ready at {}", database_url);
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        // Order matters: referenced tables first
        self.migrate_trainers().await?;
        self.migrate_users().await?;
        self.migrate_clients().await?;
        self.migrate_halls().await?;
        self.migrate_membership_types().await?;
        self.migrate_memberships().await?;
        self.migrate_trainings().await?;
        self.migrate_attendance().await?;
        self.migrate_payments().await?;
        debug!("Database migrations complete");
        Ok(())
    }

    /// Run a DDL statement, labelling failures with the migration name
    async fn execute_ddl(&self, name: &str, sql: &str) -> AppResult<()> {
        sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx(&format!("Migration '{name}' failed"), e))?;
        Ok(())
    }

    /// Check that the database answers queries
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is unusable
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Database ping failed", e))?;
        Ok(())
    }

    /// Staff account manager
    #[must_use]
    pub fn users(&self) -> UsersManager {
        UsersManager::new(self.pool.clone())
    }

    /// Client manager
    #[must_use]
    pub fn clients(&self) -> ClientsManager {
        ClientsManager::new(self.pool.clone())
    }

    /// Trainer manager
    #[must_use]
    pub fn trainers(&self) -> TrainersManager {
        TrainersManager::new(self.pool.clone())
    }

    /// Hall manager
    #[must_use]
    pub fn halls(&self) -> HallsManager {
        HallsManager::new(self.pool.clone())
    }

    /// Membership type manager
    #[must_use]
    pub fn membership_types(&self) -> MembershipTypesManager {
        MembershipTypesManager::new(self.pool.clone())
    }

    /// Membership manager
    #[must_use]
    pub fn memberships(&self) -> MembershipsManager {
        MembershipsManager::new(self.pool.clone())
    }

    /// Training manager
    #[must_use]
    pub fn trainings(&self) -> TrainingsManager {
        TrainingsManager::new(self.pool.clone())
    }

    /// Attendance manager
    #[must_use]
    pub fn attendance(&self) -> AttendanceManager {
        AttendanceManager::new(self.pool.clone())
    }

    /// Payment manager
    #[must_use]
    pub fn payments(&self) -> PaymentsManager {
        PaymentsManager::new(self.pool.clone())
    }

    /// Report queries
    #[must_use]
    pub fn reports(&self) -> ReportsRepository {
        ReportsRepository::new(self.pool.clone())
    }
}

/// Create the directory holding a file database
async fn ensure_parent_dir(database_url: &str) -> AppResult<()> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::config(format!(
                    "Cannot create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
    }
    Ok(())
}

/// Format a date for storage
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored date
///
/// # Errors
///
/// Returns an internal error for a malformed column value
pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| AppError::internal(format!("Invalid stored date '{value}': {e}")))
}

/// Format a timestamp for storage; fixed width so text ordering is time ordering
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a stored timestamp
///
/// # Errors
///
/// Returns an internal error for a malformed column value
pub fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid stored timestamp '{value}': {e}")))
}

/// Convert a stored non-negative count
#[must_use]
pub fn count_from_db(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_format_is_sortable() {
        let early = parse_timestamp("2025-01-02T09:00:00Z").unwrap();
        let late = parse_timestamp("2025-01-10T18:30:00+00:00").unwrap();
        assert!(format_timestamp(early) < format_timestamp(late));
        assert_eq!(format_timestamp(late), "2025-01-10T18:30:00Z");
    }

    #[test]
    fn test_date_round_trip() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(format_date(date), "2025-03-09");
        assert_eq!(parse_date("2025-03-09").unwrap(), date);
        assert!(parse_date("09.03.2025").is_err());
    }

    #[tokio::test]
    async fn test_memory_database_migrates_idempotently() {
        let db = Database::new("sqlite::memory:", 1).await.unwrap();
        db.migrate().await.unwrap();
        db.ping().await.unwrap();
    }
}
