// ABOUTME: Integration tests for membership types and client memberships
// ABOUTME: Covers end-date defaulting, expiry derivation, the expiry sweep, and delete protection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use chrono::Duration;
use common::{create_client, create_membership_type, date, setup_club, today};
use fitclub_core::models::{Decimal, Membership, MembershipStatus, MembershipType};
use fitclub_server::database::memberships::MembershipRecord;
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

#[tokio::test]
async fn test_membership_type_price_is_a_decimal_string() {
    let club = setup_club().await;

    let created: Value = AxumTestRequest::post("/api/membership-types")
        .bearer(&club.manager)
        .json(&json!({"name": "Monthly", "duration_days": 30, "price": "2500.50"}))
        .send(club.app())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(created["price"], "2500.50");

    let kind: MembershipType = AxumTestRequest::get(&format!("/api/membership-types/{}", created["id"]))
        .bearer(&club.trainer)
        .send(club.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(kind.price, Decimal::new(250_050, 2));

    AxumTestRequest::post("/api/membership-types")
        .bearer(&club.manager)
        .json(&json!({"name": "Broken", "duration_days": 0, "price": "100"}))
        .send(club.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_end_date_defaults_to_plan_duration() {
    let club = setup_club().await;
    let client = create_client(club.database(), "Anna").await;
    let kind = create_membership_type(club.database(), 30).await;
    let start = today();

    let membership: Membership = AxumTestRequest::post("/api/memberships")
        .bearer(&club.manager)
        .json(&json!({
            "client_id": client.id,
            "type_id": kind.id,
            "start_date": start
        }))
        .send(club.app())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    assert_eq!(membership.end_date, start + Duration::days(30));
    assert_eq!(membership.status, MembershipStatus::Active);
}

#[tokio::test]
async fn test_past_end_date_is_stored_as_expired() {
    let club = setup_club().await;
    let client = create_client(club.database(), "Anna").await;
    let kind = create_membership_type(club.database(), 30).await;

    let membership: Membership = AxumTestRequest::post("/api/memberships")
        .bearer(&club.manager)
        .json(&json!({
            "client_id": client.id,
            "type_id": kind.id,
            "start_date": date(2024, 1, 1),
            "status": "active"
        }))
        .send(club.app())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    assert_eq!(membership.end_date, date(2024, 1, 31));
    assert_eq!(membership.status, MembershipStatus::Expired);

    let reopened: Membership = AxumTestRequest::patch(&format!("/api/memberships/{}", membership.id))
        .bearer(&club.manager)
        .json(&json!({"status": "active"}))
        .send(club.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(reopened.status, MembershipStatus::Expired);

    let extended: Membership = AxumTestRequest::patch(&format!("/api/memberships/{}", membership.id))
        .bearer(&club.manager)
        .json(&json!({"end_date": today() + Duration::days(10), "status": "suspended"}))
        .send(club.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(extended.status, MembershipStatus::Suspended);
}

#[tokio::test]
async fn test_membership_rejects_bad_dates_and_references() {
    let club = setup_club().await;
    let client = create_client(club.database(), "Anna").await;
    let kind = create_membership_type(club.database(), 30).await;

    let response = AxumTestRequest::post("/api/memberships")
        .bearer(&club.manager)
        .json(&json!({
            "client_id": client.id,
            "type_id": kind.id,
            "start_date": date(2025, 6, 10),
            "end_date": date(2025, 6, 1)
        }))
        .send(club.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALUE_OUT_OF_RANGE");

    AxumTestRequest::post("/api/memberships")
        .bearer(&club.manager)
        .json(&json!({"client_id": client.id, "type_id": 777, "start_date": today()}))
        .send(club.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::post("/api/memberships")
        .bearer(&club.manager)
        .json(&json!({"client_id": 777, "type_id": kind.id, "start_date": today()}))
        .send(club.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_filters_by_client_and_status() {
    let club = setup_club().await;
    let anna = create_client(club.database(), "Anna").await;
    let vera = create_client(club.database(), "Vera").await;
    let kind = create_membership_type(club.database(), 30).await;

    for (client_id, start) in [
        (anna.id, today()),
        (anna.id, date(2023, 3, 1)),
        (vera.id, today()),
    ] {
        AxumTestRequest::post("/api/memberships")
            .bearer(&club.manager)
            .json(&json!({"client_id": client_id, "type_id": kind.id, "start_date": start}))
            .send(club.app())
            .await
            .assert_status(StatusCode::CREATED);
    }

    let page: Value = AxumTestRequest::get(&format!("/api/memberships?client_id={}", anna.id))
        .bearer(&club.manager)
        .send(club.app())
        .await
        .json();
    assert_eq!(page["count"], 2);

    let page: Value = AxumTestRequest::get("/api/memberships?status=active")
        .bearer(&club.manager)
        .send(club.app())
        .await
        .json();
    assert_eq!(page["count"], 2);
}

#[tokio::test]
async fn test_sweep_expires_lapsed_memberships() {
    let club = setup_club().await;
    let database = club.database();
    let client = create_client(database, "Anna").await;
    let kind = create_membership_type(database, 30).await;

    let lapsed = database
        .memberships()
        .create(&MembershipRecord {
            client_id: client.id,
            type_id: kind.id,
            start_date: date(2025, 1, 1),
            end_date: date(2025, 1, 31),
            status: MembershipStatus::Active,
        })
        .await
        .unwrap();
    let current = database
        .memberships()
        .create(&MembershipRecord {
            client_id: client.id,
            type_id: kind.id,
            start_date: date(2025, 1, 15),
            end_date: date(2025, 2, 14),
            status: MembershipStatus::Active,
        })
        .await
        .unwrap();

    let swept = database
        .memberships()
        .refresh_expired_memberships(date(2025, 2, 1))
        .await
        .unwrap();
    assert_eq!(swept, 1);

    let lapsed = database.memberships().get(lapsed.id).await.unwrap().unwrap();
    let current = database.memberships().get(current.id).await.unwrap().unwrap();
    assert_eq!(lapsed.status, MembershipStatus::Expired);
    assert_eq!(current.status, MembershipStatus::Active);

    let again = database
        .memberships()
        .refresh_expired_memberships(date(2025, 2, 1))
        .await
        .unwrap();
    assert_eq!(again, 0);
}

#[tokio::test]
async fn test_membership_type_in_use_cannot_be_deleted() {
    let club = setup_club().await;
    let client = create_client(club.database(), "Anna").await;
    let kind = create_membership_type(club.database(), 30).await;

    let membership: Membership = AxumTestRequest::post("/api/memberships")
        .bearer(&club.manager)
        .json(&json!({"client_id": client.id, "type_id": kind.id, "start_date": today()}))
        .send(club.app())
        .await
        .json();

    let response = AxumTestRequest::delete(&format!("/api/membership-types/{}", kind.id))
        .bearer(&club.manager)
        .send(club.app())
        .await
        .assert_status(StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "RESOURCE_LOCKED");

    AxumTestRequest::delete(&format!("/api/memberships/{}", membership.id))
        .bearer(&club.manager)
        .send(club.app())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    AxumTestRequest::delete(&format!("/api/membership-types/{}", kind.id))
        .bearer(&club.manager)
        .send(club.app())
        .await
        .assert_status(StatusCode::NO_CONTENT);
}
