// ABOUTME: Environment-based configuration for the FitClub server
// ABOUTME: Reads typed settings from environment variables with defaults and validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

//! Environment-only configuration
//!
//! Every setting has a default so the server starts with an empty
//! environment in development. Production deployments must at least provide
//! `JWT_SECRET`.

use anyhow::{Context, Result};
use fitclub_core::constants::{auth, defaults, limits, reports};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use tracing::{info, warn};

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Normal operation
    #[default]
    Info,
    /// Verbose
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        f.write_str(name)
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Live deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        };
        f.write_str(name)
    }
}

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// SQLite database file
    SQLite {
        /// Path of the database file
        path: PathBuf,
    },
    /// In-memory SQLite (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse `sqlite:<path>`, `sqlite://<path>`, `sqlite::memory:` or a bare path
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        let path_str = s
            .strip_prefix("sqlite://")
            .or_else(|| s.strip_prefix("sqlite:"))
            .unwrap_or(s);
        if path_str == ":memory:" {
            Self::Memory
        } else {
            Self::SQLite {
                path: PathBuf::from(path_str),
            }
        }
    }

    /// Convert to a sqlx connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::parse_url(defaults::DATABASE_URL)
    }
}

impl Display for DatabaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_connection_string())
    }
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
    /// Maximum pooled connections (forced to 1 for in-memory databases)
    pub max_connections: u32,
}

/// Authentication settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret; a random one is generated when absent
    #[serde(skip_serializing)]
    pub jwt_secret: Option<String>,
    /// Access token lifetime in minutes
    pub access_token_minutes: i64,
    /// Refresh token lifetime in hours
    pub refresh_token_hours: i64,
    /// Bcrypt cost factor
    pub bcrypt_cost: u32,
}

/// CORS settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated origins or `*`
    pub allowed_origins: String,
}

/// Club branding and business settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubConfig {
    /// Club name printed on reports
    pub name: String,
    /// Currency suffix for report amounts
    pub currency: String,
    /// Days ahead a membership counts as expiring
    pub expiring_window_days: i64,
    /// Create default accounts when the users table is empty
    pub seed_default_users: bool,
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Bind address
    pub host: String,
    /// Deployment environment
    pub environment: Environment,
    /// Log level
    pub log_level: LogLevel,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Club settings
    pub club: ClubConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: defaults::HTTP_PORT,
            host: defaults::HOST.to_owned(),
            environment: Environment::Development,
            log_level: LogLevel::Info,
            request_timeout_secs: limits::DEFAULT_REQUEST_TIMEOUT_SECS,
            database: DatabaseConfig {
                url: DatabaseUrl::default(),
                max_connections: 5,
            },
            auth: AuthConfig {
                jwt_secret: None,
                access_token_minutes: auth::DEFAULT_ACCESS_TOKEN_MINUTES,
                refresh_token_hours: auth::DEFAULT_REFRESH_TOKEN_HOURS,
                bcrypt_cost: auth::DEFAULT_BCRYPT_COST,
            },
            cors: CorsConfig {
                allowed_origins: "*".to_owned(),
            },
            club: ClubConfig {
                name: reports::DEFAULT_CLUB_NAME.to_owned(),
                currency: reports::DEFAULT_CURRENCY.to_owned(),
                expiring_window_days: reports::DEFAULT_EXPIRING_WINDOW_DAYS,
                seed_default_users: true,
            },
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but unparseable, or if the
    /// resulting configuration fails [`ServerConfig::validate`]
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        // Load .env file if it exists
        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {}", e);
        }

        let config = Self {
            http_port: env_var_or("HTTP_PORT", &defaults::HTTP_PORT.to_string())
                .parse()
                .context("Invalid HTTP_PORT value")?,
            host: env_var_or("HOST", defaults::HOST),
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
            log_level: LogLevel::from_str_or_default(&env_var_or("LOG_LEVEL", "info")),
            request_timeout_secs: env_var_or(
                "REQUEST_TIMEOUT_SECS",
                &limits::DEFAULT_REQUEST_TIMEOUT_SECS.to_string(),
            )
            .parse()
            .context("Invalid REQUEST_TIMEOUT_SECS value")?,
            database: DatabaseConfig {
                url: DatabaseUrl::parse_url(&env_var_or("DATABASE_URL", defaults::DATABASE_URL)),
                max_connections: env_var_or("DATABASE_MAX_CONNECTIONS", "5")
                    .parse()
                    .context("Invalid DATABASE_MAX_CONNECTIONS value")?,
            },
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
                access_token_minutes: env_var_or(
                    "JWT_ACCESS_EXPIRY_MINUTES",
                    &auth::DEFAULT_ACCESS_TOKEN_MINUTES.to_string(),
                )
                .parse()
                .context("Invalid JWT_ACCESS_EXPIRY_MINUTES value")?,
                refresh_token_hours: env_var_or(
                    "JWT_REFRESH_EXPIRY_HOURS",
                    &auth::DEFAULT_REFRESH_TOKEN_HOURS.to_string(),
                )
                .parse()
                .context("Invalid JWT_REFRESH_EXPIRY_HOURS value")?,
                bcrypt_cost: env_var_or("BCRYPT_COST", &auth::DEFAULT_BCRYPT_COST.to_string())
                    .parse()
                    .context("Invalid BCRYPT_COST value")?,
            },
            cors: CorsConfig {
                allowed_origins: env_var_or("CORS_ALLOWED_ORIGINS", "*"),
            },
            club: ClubConfig {
                name: env_var_or("CLUB_NAME", reports::DEFAULT_CLUB_NAME),
                currency: env_var_or("REPORT_CURRENCY", reports::DEFAULT_CURRENCY),
                expiring_window_days: env_var_or(
                    "EXPIRING_WINDOW_DAYS",
                    &reports::DEFAULT_EXPIRING_WINDOW_DAYS.to_string(),
                )
                .parse()
                .context("Invalid EXPIRING_WINDOW_DAYS value")?,
                seed_default_users: parse_bool(&env_var_or("SEED_DEFAULT_USERS", "true"))
                    .context("Invalid SEED_DEFAULT_USERS value")?,
            },
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> Result<()> {
        if !(auth::MIN_BCRYPT_COST..=auth::MAX_BCRYPT_COST).contains(&self.auth.bcrypt_cost) {
            return Err(anyhow::anyhow!(
                "BCRYPT_COST must be between {} and {}",
                auth::MIN_BCRYPT_COST,
                auth::MAX_BCRYPT_COST
            ));
        }
        if self.auth.access_token_minutes <= 0 || self.auth.refresh_token_hours <= 0 {
            return Err(anyhow::anyhow!("Token lifetimes must be positive"));
        }
        if self.club.expiring_window_days <= 0 {
            return Err(anyhow::anyhow!("EXPIRING_WINDOW_DAYS must be positive"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("REQUEST_TIMEOUT_SECS must be positive"));
        }
        if self.environment.is_production() {
            if self.auth.jwt_secret.is_none() {
                return Err(anyhow::anyhow!("JWT_SECRET is required in production"));
            }
            if self.cors.allowed_origins == "*" {
                warn!("CORS allows any origin in production");
            }
        }
        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "FitClub Server Configuration:\n\
             - Environment: {}\n\
             - Listen: {}:{}\n\
             - Log Level: {}\n\
             - Database: {}\n\
             - JWT Secret: {}\n\
             - Access Token: {} min, Refresh Token: {} h\n\
             - CORS Origins: {}\n\
             - Club: {} ({}), expiring window {} days\n\
             - Seed Default Users: {}",
            self.environment,
            self.host,
            self.http_port,
            self.log_level,
            if self.database.url.is_memory() {
                "SQLite (in-memory)".to_owned()
            } else {
                self.database.url.to_string()
            },
            if self.auth.jwt_secret.is_some() {
                "Configured"
            } else {
                "Generated (tokens do not survive restarts)"
            },
            self.auth.access_token_minutes,
            self.auth.refresh_token_hours,
            parse_origins(&self.cors.allowed_origins).join(", "),
            self.club.name,
            self.club.currency,
            self.club.expiring_window_days,
            self.club.seed_default_users,
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse a permissive boolean (`true/false`, `1/0`, `yes/no`)
fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(anyhow::anyhow!("'{other}' is not a boolean")),
    }
}

/// Parse comma-separated CORS origins
#[must_use]
pub fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_parsing() {
        assert_eq!(DatabaseUrl::parse_url("sqlite::memory:"), DatabaseUrl::Memory);
        assert_eq!(
            DatabaseUrl::parse_url("sqlite:./data/club.db"),
            DatabaseUrl::SQLite {
                path: PathBuf::from("./data/club.db")
            }
        );
        assert_eq!(
            DatabaseUrl::parse_url("sqlite:///var/lib/club.db").to_connection_string(),
            "sqlite:/var/lib/club.db"
        );
        assert_eq!(
            DatabaseUrl::parse_url("club.db").to_connection_string(),
            "sqlite:club.db"
        );
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert_eq!(
            parse_origins("https://a.example, https://b.example,"),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ServerConfig::default();
        assert!(config.validate().is_ok());

        config.auth.bcrypt_cost = 2;
        assert!(config.validate().is_err());
        config.auth.bcrypt_cost = 10;

        config.club.expiring_window_days = 0;
        assert!(config.validate().is_err());
        config.club.expiring_window_days = 7;

        config.environment = Environment::Production;
        assert!(config.validate().is_err());
        config.auth.jwt_secret = Some("prod-secret".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_summary_hides_secret() {
        let mut config = ServerConfig::default();
        config.auth.jwt_secret = Some("super-secret-value".into());
        let summary = config.summary();
        assert!(!summary.contains("super-secret-value"));
        assert!(summary.contains("Configured"));
    }

    #[test]
    fn test_environment_and_log_level_fallbacks() {
        assert_eq!(Environment::from_str_or_default("PROD"), Environment::Production);
        assert_eq!(Environment::from_str_or_default("staging"), Environment::Development);
        assert_eq!(LogLevel::from_str_or_default("DEBUG"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str_or_default("verbose"), LogLevel::Info);
    }
}
