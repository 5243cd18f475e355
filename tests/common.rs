// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Builds in-memory server resources, staff accounts with tokens, and club record fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `fitclub_server`

use anyhow::Result;
use axum::Router;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use fitclub_core::constants::auth::MIN_BCRYPT_COST;
use fitclub_core::models::{
    Client, ClientRequest, Decimal, Hall, HallRequest, MembershipType, MembershipTypeRequest,
    Trainer, TrainerRequest, Training, TrainingRequest, TrainingStatus, User, UserRole,
};
use fitclub_server::{
    auth::hash_password,
    config::environment::ServerConfig,
    database::{users::UserRecord, Database},
    resources::ServerResources,
    server::ClubServer,
};
use std::sync::atomic::{AtomicU32, Ordering};
use tower_http::normalize_path::NormalizePath;
use std::sync::{Arc, Once};

static INIT_LOGGER: Once = Once::new();
static NEXT_SERIAL: AtomicU32 = AtomicU32::new(1);

/// Password given to every test account
pub const TEST_PASSWORD: &str = "password123";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Server resources over a fresh in-memory database
pub async fn create_test_server_resources() -> Result<Arc<ServerResources>> {
    init_test_logging();
    let database = Database::new("sqlite::memory:", 1).await?;

    let mut config = ServerConfig::default();
    config.auth.jwt_secret = Some("integration-test-secret-integration-test-secret".to_owned());
    config.auth.bcrypt_cost = MIN_BCRYPT_COST;
    config.club.name = "Test Club".to_owned();

    Ok(Arc::new(ServerResources::new(database, Arc::new(config))))
}

/// Create an active account with [`TEST_PASSWORD`]
pub async fn create_test_user(
    database: &Database,
    username: &str,
    role: UserRole,
    trainer_id: Option<i64>,
) -> Result<User> {
    let password_hash = hash_password(TEST_PASSWORD, MIN_BCRYPT_COST).await?;
    let user = database
        .users()
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
    Ok(user)
}

/// Access token for an account
pub fn token_for(resources: &ServerResources, user: &User) -> String {
    resources
        .auth_manager
        .generate_access_token(user)
        .unwrap()
        .token
}

/// A club with one account per role and the full router
pub struct TestClub {
    pub resources: Arc<ServerResources>,
    pub admin: String,
    pub manager: String,
    pub trainer: String,
    /// Trainer record linked to the trainer account
    pub trainer_id: i64,
}

impl TestClub {
    /// Full application with middleware and trailing-slash normalization
    pub fn app(&self) -> NormalizePath<Router> {
        ClubServer::new(Arc::clone(&self.resources)).app()
    }

    pub fn database(&self) -> &Database {
        &self.resources.database
    }
}

/// Set up a club with admin, manager, and trainer accounts
pub async fn setup_club() -> TestClub {
    let resources = create_test_server_resources().await.unwrap();
    let database = &resources.database;

    let trainer = create_trainer(database, "Petr").await;
    let admin = create_test_user(database, "admin", UserRole::Admin, None)
        .await
        .unwrap();
    let manager = create_test_user(database, "manager", UserRole::Manager, None)
        .await
        .unwrap();
    let trainer_user = create_test_user(database, "trainer", UserRole::Trainer, Some(trainer.id))
        .await
        .unwrap();

    TestClub {
        admin: token_for(&resources, &admin),
        manager: token_for(&resources, &manager),
        trainer: token_for(&resources, &trainer_user),
        trainer_id: trainer.id,
        resources,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// A moment `days` from now
pub fn in_days(days: i64) -> DateTime<Utc> {
    Utc::now() + Duration::days(days)
}

/// Distinct phone number for each fixture
pub fn next_phone() -> String {
    format!("+7 999 {:07}", NEXT_SERIAL.fetch_add(1, Ordering::Relaxed))
}

pub async fn create_trainer(database: &Database, name: &str) -> Trainer {
    database
        .trainers()
        .create(&TrainerRequest {
            name: name.to_owned(),
            surname: "Sidorov".to_owned(),
            secondname: String::new(),
            specialization: "Yoga".to_owned(),
            phone: next_phone(),
        })
        .await
        .unwrap()
}

pub async fn create_client(database: &Database, name: &str) -> Client {
    database
        .clients()
        .create(
            &ClientRequest {
                name: name.to_owned(),
                surname: "Smirnova".to_owned(),
                secondname: String::new(),
                phone: next_phone(),
                email: None,
                birth_date: date(1990, 5, 17),
            },
            today(),
        )
        .await
        .unwrap()
}

pub async fn create_hall(database: &Database, capacity: i64) -> Hall {
    database
        .halls()
        .create(&HallRequest {
            name: format!("Hall {}", NEXT_SERIAL.fetch_add(1, Ordering::Relaxed)),
            capacity,
            equipment: None,
        })
        .await
        .unwrap()
}

pub async fn create_membership_type(database: &Database, duration_days: i64) -> MembershipType {
    database
        .membership_types()
        .create(&MembershipTypeRequest {
            name: format!("{duration_days} days"),
            duration_days,
            price: Decimal::from(3000),
            description: None,
        })
        .await
        .unwrap()
}

/// A scheduled training next week with its own hall and membership type
pub async fn create_training(database: &Database, trainer_id: i64, max_clients: i64) -> Training {
    let hall = create_hall(database, max_clients.max(1) * 2).await;
    let kind = create_membership_type(database, 30).await;
    database
        .trainings()
        .create(&TrainingRequest {
            trainer_id,
            training_type_id: kind.id,
            hall_id: hall.id,
            date_time: in_days(7),
            max_clients,
            status: TrainingStatus::Scheduled,
        })
        .await
        .unwrap()
}
