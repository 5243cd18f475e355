// ABOUTME: Tests for on-disk database startup and environment-driven configuration
// ABOUTME: Uses temporary directories for SQLite files and serializes tests that touch env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use fitclub_core::constants::auth::MIN_BCRYPT_COST;
use fitclub_core::models::UserRole;
use fitclub_server::config::environment::{DatabaseUrl, ServerConfig};
use fitclub_server::database::{seed::seed_default_users, Database};
use serial_test::serial;
use std::env;

#[tokio::test]
async fn test_file_database_creates_directory_and_persists() -> anyhow::Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let url = DatabaseUrl::SQLite {
        path: temp_dir.path().join("data").join("club.db"),
    };

    let database = Database::new(&url.to_connection_string(), 2).await?;
    let seeded = seed_default_users(&database, MIN_BCRYPT_COST).await?;
    assert_eq!(seeded, 3);
    database.pool().close().await;

    assert!(temp_dir.path().join("data").join("club.db").exists());

    let reopened = Database::new(&url.to_connection_string(), 2).await?;
    assert_eq!(reopened.users().count().await?, 3);
    assert_eq!(seed_default_users(&reopened, MIN_BCRYPT_COST).await?, 0);

    let trainer = reopened.users().get_by_username("trainer").await?.unwrap();
    assert_eq!(trainer.role, UserRole::Trainer);
    assert!(trainer.trainer_id.is_some());
    Ok(())
}

const CONFIG_VARS: [&str; 5] = [
    "HTTP_PORT",
    "CLUB_NAME",
    "BCRYPT_COST",
    "SEED_DEFAULT_USERS",
    "ENVIRONMENT",
];

fn clear_config_vars() {
    for key in CONFIG_VARS {
        env::remove_var(key);
    }
    env::remove_var("JWT_SECRET");
}

#[test]
#[serial]
fn test_config_reads_environment() {
    clear_config_vars();
    env::set_var("HTTP_PORT", "9100");
    env::set_var("CLUB_NAME", "Iron Temple");
    env::set_var("BCRYPT_COST", "6");
    env::set_var("SEED_DEFAULT_USERS", "false");

    let config = ServerConfig::from_env().unwrap();
    clear_config_vars();

    assert_eq!(config.http_port, 9100);
    assert_eq!(config.club.name, "Iron Temple");
    assert_eq!(config.auth.bcrypt_cost, 6);
    assert!(!config.club.seed_default_users);
}

#[test]
#[serial]
fn test_config_rejects_invalid_values() {
    clear_config_vars();
    env::set_var("HTTP_PORT", "not-a-port");
    assert!(ServerConfig::from_env().is_err());
    clear_config_vars();

    env::set_var("ENVIRONMENT", "production");
    let result = ServerConfig::from_env();
    clear_config_vars();
    assert!(result.is_err());
}
