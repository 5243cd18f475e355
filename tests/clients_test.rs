// ABOUTME: Integration tests for client records through the HTTP API
// ABOUTME: Covers CRUD, validation, search, paging, and cascading deletes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use chrono::Duration;
use common::{create_client, create_membership_type, create_training, setup_club, today};
use fitclub_core::models::{
    AttendanceRequest, AttendanceStatus, Client, Decimal, MembershipStatus, PaymentRequest,
    PaymentType,
};
use fitclub_server::database::memberships::MembershipRecord;
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

fn client_body() -> Value {
    json!({
        "name": "Irina",
        "surname": "Volkova",
        "phone": "+7 912 000-11-22",
        "email": "irina@example.com",
        "birth_date": "1994-02-11"
    })
}

#[tokio::test]
async fn test_client_crud_round() {
    let club = setup_club().await;

    let created: Client = AxumTestRequest::post("/api/clients")
        .bearer(&club.manager)
        .json(&client_body())
        .send(club.app())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(created.surname, "Volkova");
    assert_eq!(created.secondname, "");
    assert_eq!(created.registration_date, today());

    let fetched: Client = AxumTestRequest::get(&format!("/api/clients/{}", created.id))
        .bearer(&club.trainer)
        .send(club.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(fetched, created);

    let patched: Client = AxumTestRequest::patch(&format!("/api/clients/{}", created.id))
        .bearer(&club.manager)
        .json(&json!({"phone": "+7 912 999-99-99", "email": null}))
        .send(club.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(patched.phone, "+7 912 999-99-99");
    assert_eq!(patched.email, None);
    assert_eq!(patched.name, "Irina");
    assert_eq!(patched.registration_date, created.registration_date);

    let mut replacement = client_body();
    replacement["name"] = json!("Inna");
    let replaced: Client = AxumTestRequest::put(&format!("/api/clients/{}", created.id))
        .bearer(&club.manager)
        .json(&replacement)
        .send(club.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(replaced.name, "Inna");

    AxumTestRequest::delete(&format!("/api/clients/{}", created.id))
        .bearer(&club.manager)
        .send(club.app())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    AxumTestRequest::get(&format!("/api/clients/{}", created.id))
        .bearer(&club.manager)
        .send(club.app())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_client_validation() {
    let club = setup_club().await;

    let mut future_birth = client_body();
    future_birth["birth_date"] = json!((today() + Duration::days(1)).to_string());
    let response = AxumTestRequest::post("/api/clients")
        .bearer(&club.manager)
        .json(&future_birth)
        .send(club.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALUE_OUT_OF_RANGE");

    let mut bad_phone = client_body();
    bad_phone["phone"] = json!("call me");
    AxumTestRequest::post("/api/clients")
        .bearer(&club.manager)
        .json(&bad_phone)
        .send(club.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let mut blank_name = client_body();
    blank_name["name"] = json!("   ");
    AxumTestRequest::post("/api/clients")
        .bearer(&club.manager)
        .json(&blank_name)
        .send(club.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_client_operations_are_404() {
    let club = setup_club().await;

    AxumTestRequest::put("/api/clients/4242")
        .bearer(&club.manager)
        .json(&client_body())
        .send(club.app())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    AxumTestRequest::delete("/api/clients/4242")
        .bearer(&club.manager)
        .send(club.app())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_and_paging() {
    let club = setup_club().await;
    for name in ["Anna", "Alla", "Vera"] {
        create_client(club.database(), name).await;
    }
    AxumTestRequest::post("/api/clients")
        .bearer(&club.manager)
        .json(&client_body())
        .send(club.app())
        .await
        .assert_status(StatusCode::CREATED);

    let page: Value = AxumTestRequest::get("/api/clients?search=volk")
        .bearer(&club.manager)
        .send(club.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["name"], "Irina");

    let page: Value = AxumTestRequest::get("/api/clients?search=912")
        .bearer(&club.manager)
        .send(club.app())
        .await
        .json();
    assert_eq!(page["count"], 1);

    let page: Value = AxumTestRequest::get("/api/clients?limit=2&offset=2")
        .bearer(&club.manager)
        .send(club.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(page["count"], 4);
    assert_eq!(page["limit"], 2);
    assert_eq!(page["offset"], 2);
    assert_eq!(page["results"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_deleting_client_removes_dependent_records() {
    let club = setup_club().await;
    let database = club.database();
    let client = create_client(database, "Anna").await;
    let kind = create_membership_type(database, 30).await;
    let training = create_training(database, club.trainer_id, 3).await;

    let membership = database
        .memberships()
        .create(&MembershipRecord {
            client_id: client.id,
            type_id: kind.id,
            start_date: today(),
            end_date: today() + Duration::days(30),
            status: MembershipStatus::Active,
        })
        .await
        .unwrap();
    let payment = database
        .payments()
        .create(
            &PaymentRequest {
                client_id: client.id,
                membership_id: Some(membership.id),
                amount: Decimal::from(3000),
                payment_type: PaymentType::Card,
                description: None,
            },
            chrono::Utc::now(),
        )
        .await
        .unwrap();
    let visit = database
        .attendance()
        .register(&AttendanceRequest {
            client_id: client.id,
            training_id: training.id,
            status: AttendanceStatus::Registered,
            is_present: false,
            check_in_time: None,
        })
        .await
        .unwrap();

    assert!(database.clients().delete(client.id).await.unwrap());

    assert!(database.memberships().get(membership.id).await.unwrap().is_none());
    assert!(database.payments().get(payment.id).await.unwrap().is_none());
    assert!(database.attendance().get(visit.id).await.unwrap().is_none());
    assert_eq!(
        database.trainings().registered_count(training.id).await.unwrap(),
        0
    );
}
