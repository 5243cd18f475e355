// ABOUTME: Integration tests for trainings, client registration, and the capacity limit
// ABOUTME: A training never holds more attendance records than its max_clients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{
    create_client, create_hall, create_membership_type, create_trainer, create_training, in_days,
    setup_club, TestClub,
};
use fitclub_core::errors::ErrorCode;
use fitclub_core::models::{AttendanceRequest, AttendanceStatus, Training, TrainingStatus};
use fitclub_server::config::environment::DatabaseUrl;
use fitclub_server::database::Database;
use fitclub_server::routes::trainings::RegisterClientResponse;
use helpers::axum_test::{AxumTestRequest, AxumTestResponse};
use serde_json::{json, Value};

async fn register(club: &TestClub, training_id: i64, client_id: i64) -> AxumTestResponse {
    AxumTestRequest::post(&format!("/api/trainings/{training_id}/register_client"))
        .bearer(&club.manager)
        .json(&json!({"client_id": client_id}))
        .send(club.app())
        .await
}

#[tokio::test]
async fn test_create_training_through_api() {
    let club = setup_club().await;
    let hall = create_hall(club.database(), 12).await;
    let kind = create_membership_type(club.database(), 30).await;

    let training: Training = AxumTestRequest::post("/api/trainings")
        .bearer(&club.manager)
        .json(&json!({
            "trainer_id": club.trainer_id,
            "training_type_id": kind.id,
            "hall_id": hall.id,
            "date_time": in_days(3),
            "max_clients": 10
        }))
        .send(club.app())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    assert_eq!(training.status, TrainingStatus::Scheduled);
    assert_eq!(training.max_clients, 10);
    assert_eq!(training.trainer_name, "Sidorov");
}

#[tokio::test]
async fn test_max_clients_cannot_exceed_hall_capacity() {
    let club = setup_club().await;
    let hall = create_hall(club.database(), 4).await;
    let kind = create_membership_type(club.database(), 30).await;

    let response = AxumTestRequest::post("/api/trainings")
        .bearer(&club.manager)
        .json(&json!({
            "trainer_id": club.trainer_id,
            "training_type_id": kind.id,
            "hall_id": hall.id,
            "date_time": in_days(3),
            "max_clients": 5
        }))
        .send(club.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALUE_OUT_OF_RANGE");
}

#[tokio::test]
async fn test_training_references_must_exist() {
    let club = setup_club().await;
    let kind = create_membership_type(club.database(), 30).await;

    AxumTestRequest::post("/api/trainings")
        .bearer(&club.manager)
        .json(&json!({
            "trainer_id": club.trainer_id,
            "training_type_id": kind.id,
            "hall_id": 999,
            "date_time": in_days(3),
            "max_clients": 5
        }))
        .send(club.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_registration_stops_at_capacity() {
    let club = setup_club().await;
    let training = create_training(club.database(), club.trainer_id, 2).await;
    let first = create_client(club.database(), "Anna").await;
    let second = create_client(club.database(), "Maria").await;
    let third = create_client(club.database(), "Elena").await;

    let registered: RegisterClientResponse = register(&club, training.id, first.id)
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(registered.status, "Client registered");
    assert_eq!(registered.attendance.client_id, first.id);

    register(&club, training.id, second.id)
        .await
        .assert_status(StatusCode::CREATED);

    let response = register(&club, training.id, third.id)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "TRAINING_FULL");

    let count = club
        .database()
        .trainings()
        .registered_count(training.id)
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_cancelled_visits_still_hold_a_place() {
    let club = setup_club().await;
    let training = create_training(club.database(), club.trainer_id, 1).await;
    let first = create_client(club.database(), "Anna").await;
    let second = create_client(club.database(), "Maria").await;

    let registered: RegisterClientResponse = register(&club, training.id, first.id).await.json();
    AxumTestRequest::patch(&format!("/api/attendance/{}", registered.attendance.id))
        .bearer(&club.manager)
        .json(&json!({"status": "cancelled"}))
        .send(club.app())
        .await
        .assert_status(StatusCode::OK);

    register(&club, training.id, second.id)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::delete(&format!("/api/attendance/{}", registered.attendance.id))
        .bearer(&club.manager)
        .send(club.app())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    register(&club, training.id, second.id)
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let club = setup_club().await;
    let training = create_training(club.database(), club.trainer_id, 5).await;
    let client = create_client(club.database(), "Anna").await;

    register(&club, training.id, client.id)
        .await
        .assert_status(StatusCode::CREATED);
    let response = register(&club, training.id, client.id)
        .await
        .assert_status(StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "RESOURCE_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_registration_requires_scheduled_training_and_known_client() {
    let club = setup_club().await;
    let training = create_training(club.database(), club.trainer_id, 5).await;
    let client = create_client(club.database(), "Anna").await;

    register(&club, 9999, client.id)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    register(&club, training.id, 9999)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::patch(&format!("/api/trainings/{}", training.id))
        .bearer(&club.manager)
        .json(&json!({"status": "cancelled"}))
        .send(club.app())
        .await
        .assert_status(StatusCode::OK);

    let response = register(&club, training.id, client.id)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "TRAINING_CLOSED");
}

#[tokio::test]
async fn test_attendance_create_enforces_capacity() {
    let club = setup_club().await;
    let training = create_training(club.database(), club.trainer_id, 1).await;
    let first = create_client(club.database(), "Anna").await;
    let second = create_client(club.database(), "Maria").await;

    for (client_id, expected) in [(first.id, StatusCode::CREATED), (second.id, StatusCode::BAD_REQUEST)] {
        AxumTestRequest::post("/api/attendance")
            .bearer(&club.manager)
            .json(&json!({"client_id": client_id, "training_id": training.id}))
            .send(club.app())
            .await
            .assert_status(expected);
    }
}

#[tokio::test]
async fn test_max_clients_cannot_drop_below_registrations() {
    let club = setup_club().await;
    let training = create_training(club.database(), club.trainer_id, 3).await;
    for name in ["Anna", "Maria"] {
        let client = create_client(club.database(), name).await;
        register(&club, training.id, client.id)
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = AxumTestRequest::patch(&format!("/api/trainings/{}", training.id))
        .bearer(&club.manager)
        .json(&json!({"max_clients": 1}))
        .send(club.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALUE_OUT_OF_RANGE");

    AxumTestRequest::patch(&format!("/api/trainings/{}", training.id))
        .bearer(&club.manager)
        .json(&json!({"max_clients": 2}))
        .send(club.app())
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_hall_capacity_cannot_drop_below_scheduled_training() {
    let club = setup_club().await;
    let training = create_training(club.database(), club.trainer_id, 6).await;

    let response = AxumTestRequest::patch(&format!("/api/halls/{}", training.hall_id))
        .bearer(&club.manager)
        .json(&json!({"capacity": 5}))
        .send(club.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALUE_OUT_OF_RANGE");
}

#[tokio::test]
async fn test_list_trainings_filters_by_trainer_and_status() {
    let club = setup_club().await;
    let other_trainer = common::create_trainer(club.database(), "Boris").await;
    create_training(club.database(), club.trainer_id, 5).await;
    create_training(club.database(), other_trainer.id, 5).await;

    let page: Value = AxumTestRequest::get(&format!(
        "/api/trainings?trainer_id={}&status=scheduled",
        club.trainer_id
    ))
    .bearer(&club.trainer)
    .send(club.app())
    .await
    .assert_status(StatusCode::OK)
    .json();
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["trainer_id"], club.trainer_id);
}

#[tokio::test]
async fn test_deleting_training_removes_its_attendance() {
    let club = setup_club().await;
    let training = create_training(club.database(), club.trainer_id, 5).await;
    let client = create_client(club.database(), "Anna").await;
    let registered: RegisterClientResponse = register(&club, training.id, client.id).await.json();

    AxumTestRequest::delete(&format!("/api/trainings/{}", training.id))
        .bearer(&club.manager)
        .send(club.app())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert!(club
        .database()
        .attendance()
        .get(registered.attendance.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_trailing_slash_urls_reach_the_same_handlers() {
    let club = setup_club().await;
    let training = create_training(club.database(), club.trainer_id, 3).await;
    let client = create_client(club.database(), "Anna").await;

    let page: Value = AxumTestRequest::get("/api/clients/")
        .bearer(&club.manager)
        .send(club.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(page["count"], 1);

    let registered: RegisterClientResponse = AxumTestRequest::post(&format!(
        "/api/trainings/{}/register_client/",
        training.id
    ))
    .bearer(&club.manager)
    .json(&json!({"client_id": client.id}))
    .send(club.app())
    .await
    .assert_status(StatusCode::CREATED)
    .json();
    assert_eq!(registered.attendance.training_id, training.id);

    AxumTestRequest::get(&format!("/api/trainings/{}/", training.id))
        .bearer(&club.trainer)
        .send(club.app())
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_never_exceed_capacity() {
    let temp_dir = tempfile::tempdir().unwrap();
    let url = DatabaseUrl::SQLite {
        path: temp_dir.path().join("club.db"),
    };
    let database = Database::new(&url.to_connection_string(), 8).await.unwrap();

    let trainer = create_trainer(&database, "Petr").await;
    let training = create_training(&database, trainer.id, 3).await;
    let mut clients = Vec::new();
    for i in 0..20 {
        clients.push(create_client(&database, &format!("Client{i}")).await);
    }

    let handles: Vec<_> = clients
        .iter()
        .map(|client| {
            let database = database.clone();
            let request = AttendanceRequest {
                client_id: client.id,
                training_id: training.id,
                status: AttendanceStatus::Registered,
                is_present: false,
                check_in_time: None,
            };
            tokio::spawn(async move { database.attendance().register(&request).await })
        })
        .collect();

    let mut registered = 0;
    let mut full = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => registered += 1,
            Err(e) => {
                assert_eq!(e.code, ErrorCode::TrainingFull, "unexpected error: {e}");
                full += 1;
            }
        }
    }

    assert_eq!(registered, 3);
    assert_eq!(full, 17);
    let count = database
        .trainings()
        .registered_count(training.id)
        .await
        .unwrap();
    assert_eq!(count, 3);
}
