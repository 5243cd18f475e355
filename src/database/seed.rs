// ABOUTME: Creates the default trainer and staff accounts on an empty database
// ABOUTME: Runs only when no users exist, so real installations are never touched
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

//! Default account seeding
//!
//! A fresh installation needs someone to log in as. When the `users` table is
//! empty the server creates one account per role, the trainer account linked to
//! a demo trainer record. The passwords are public, so a warning is logged.

use super::users::UserRecord;
use super::Database;
use crate::auth::hash_password;
use crate::errors::AppResult;
use fitclub_core::models::{TrainerRequest, UserRole};
use tracing::{info, warn};

/// Default accounts: username, password, role
const DEFAULT_ACCOUNTS: [(&str, &str, UserRole); 3] = [
    ("admin", "admin123", UserRole::Admin),
    ("manager", "manager123", UserRole::Manager),
    ("trainer", "trainer123", UserRole::Trainer),
];

/// Seed default accounts if there are no users yet
///
/// Returns the number of accounts created.
///
/// # Errors
///
/// Returns an error if any insert or password hash fails
pub async fn seed_default_users(database: &Database, bcrypt_cost: u32) -> AppResult<usize> {
    let users = database.users();
    if users.count().await? > 0 {
        info!("Users already exist, skipping default account seeding");
        return Ok(0);
    }

    let trainer = database
        .trainers()
        .create(&TrainerRequest {
            name: "Ivan".into(),
            surname: "Ivanov".into(),
            secondname: String::new(),
            specialization: "Fitness".into(),
            phone: "+79990000000".into(),
        })
        .await?;

    for (username, password, role) in DEFAULT_ACCOUNTS {
        let trainer_id = (role == UserRole::Trainer).then_some(trainer.id);
        let password_hash = hash_password(password, bcrypt_cost).await?;
        users
            .create(
                &UserRecord {
                    username: username.to_owned(),
                    email: None,
                    role,
                    trainer_id,
                    is_active: true,
                },
                &password_hash,
            )
            .await?;
    }

    warn!(
        accounts = DEFAULT_ACCOUNTS.len(),
        "Seeded default accounts admin/admin123, manager/manager123, trainer/trainer123; change these passwords"
    );
    Ok(DEFAULT_ACCOUNTS.len())
}
