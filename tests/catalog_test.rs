// ABOUTME: Integration tests for trainer and hall records
// ABOUTME: Covers CRUD, validation, uniqueness, and cascading removal of trainings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{create_trainer, create_training, setup_club};
use fitclub_core::models::{Hall, Trainer};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

#[tokio::test]
async fn test_hall_crud_and_unique_name() {
    let club = setup_club().await;

    let hall: Hall = AxumTestRequest::post("/api/halls")
        .bearer(&club.manager)
        .json(&json!({"name": "Main hall", "capacity": 25, "equipment": "Mats, dumbbells"}))
        .send(club.app())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(hall.capacity, 25);

    let response = AxumTestRequest::post("/api/halls")
        .bearer(&club.manager)
        .json(&json!({"name": "Main hall", "capacity": 10}))
        .send(club.app())
        .await
        .assert_status(StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "RESOURCE_ALREADY_EXISTS");

    AxumTestRequest::post("/api/halls")
        .bearer(&club.manager)
        .json(&json!({"name": "Closet", "capacity": 0}))
        .send(club.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let patched: Hall = AxumTestRequest::patch(&format!("/api/halls/{}", hall.id))
        .bearer(&club.manager)
        .json(&json!({"equipment": null}))
        .send(club.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(patched.equipment, None);
    assert_eq!(patched.name, "Main hall");

    let page: Value = AxumTestRequest::get("/api/halls")
        .bearer(&club.trainer)
        .send(club.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(page["count"], 1);

    AxumTestRequest::delete(&format!("/api/halls/{}", hall.id))
        .bearer(&club.manager)
        .send(club.app())
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_trainer_update_and_validation() {
    let club = setup_club().await;

    let updated: Trainer = AxumTestRequest::patch(&format!("/api/trainers/{}", club.trainer_id))
        .bearer(&club.manager)
        .json(&json!({"specialization": "CrossFit"}))
        .send(club.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(updated.specialization, "CrossFit");
    assert_eq!(updated.name, "Petr");

    AxumTestRequest::post("/api/trainers")
        .bearer(&club.manager)
        .json(&json!({"name": "", "surname": "X", "specialization": "Yoga", "phone": "+7 900 555-44-33"}))
        .send(club.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::get("/api/trainers/31337")
        .bearer(&club.manager)
        .send(club.app())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_trainer_removes_trainings_and_unlinks_account() {
    let club = setup_club().await;
    let trainer = create_trainer(club.database(), "Boris").await;
    let training = create_training(club.database(), trainer.id, 4).await;

    AxumTestRequest::delete(&format!("/api/trainers/{}", trainer.id))
        .bearer(&club.manager)
        .send(club.app())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert!(club
        .database()
        .trainings()
        .get(training.id)
        .await
        .unwrap()
        .is_none());

    assert!(club.database().trainers().delete(club.trainer_id).await.unwrap());
    let account = club
        .database()
        .users()
        .get_by_username("trainer")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.trainer_id, None);
}
