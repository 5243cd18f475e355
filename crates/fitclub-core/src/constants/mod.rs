// ABOUTME: Application constants organized by domain
// ABOUTME: Token lifetimes, list limits, report defaults, and environment defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

//! Application-wide constants

/// Service identity
pub mod service_names {
    /// Service name used in logs and JWT audience
    pub const FITCLUB_SERVER: &str = "fitclub-server";
    /// JWT audience claim
    pub const JWT_AUDIENCE: &str = "fitclub-api";
}

/// Authentication limits and defaults
pub mod auth {
    /// Default access token lifetime in minutes
    pub const DEFAULT_ACCESS_TOKEN_MINUTES: i64 = 60;
    /// Default refresh token lifetime in hours (7 days)
    pub const DEFAULT_REFRESH_TOKEN_HOURS: i64 = 168;
    /// Default bcrypt cost
    pub const DEFAULT_BCRYPT_COST: u32 = 12;
    /// Lowest bcrypt cost accepted by the bcrypt crate
    pub const MIN_BCRYPT_COST: u32 = 4;
    /// Highest bcrypt cost accepted by the bcrypt crate
    pub const MAX_BCRYPT_COST: u32 = 31;
    /// Minimum password length for new accounts
    pub const MIN_PASSWORD_LENGTH: usize = 6;
    /// Length of a generated JWT secret in bytes
    pub const GENERATED_SECRET_BYTES: usize = 64;
}

/// List endpoint limits
pub mod limits {
    /// Page size used when the request does not specify one
    pub const DEFAULT_PAGE_SIZE: u32 = 50;
    /// Largest page size a client may request
    pub const MAX_PAGE_SIZE: u32 = 500;
    /// Maximum request body size in bytes
    pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;
    /// Default request timeout in seconds
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
    /// Maximum length of a payment description
    pub const MAX_PAYMENT_DESCRIPTION_LEN: usize = 200;
    /// Maximum length of a person or hall name
    pub const MAX_NAME_LEN: usize = 100;
    /// Maximum length of a phone number
    pub const MAX_PHONE_LEN: usize = 20;
}

/// Report defaults
pub mod reports {
    /// Days ahead a membership counts as "expiring"
    pub const DEFAULT_EXPIRING_WINDOW_DAYS: i64 = 7;
    /// Days left at or below which an expiring membership is highlighted
    pub const URGENT_DAYS_LEFT: i64 = 3;
    /// Club name printed in report headers and footers
    pub const DEFAULT_CLUB_NAME: &str = "Fitness Manager";
    /// Currency suffix for amounts in reports
    pub const DEFAULT_CURRENCY: &str = "RUB";
}

/// Environment variable defaults
pub mod defaults {
    /// Default HTTP port
    pub const HTTP_PORT: u16 = 8081;
    /// Default bind address
    pub const HOST: &str = "127.0.0.1";
    /// Default database location
    pub const DATABASE_URL: &str = "sqlite:./data/fitclub.db";
}
