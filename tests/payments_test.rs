// ABOUTME: Integration tests for payments through the HTTP API
// ABOUTME: Covers decimal amounts, membership ownership, and client and date filters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use chrono::Duration;
use common::{create_client, create_membership_type, setup_club, today, TestClub};
use fitclub_core::models::{Membership, Payment, PaymentType};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

async fn membership_for(club: &TestClub, client_id: i64) -> Membership {
    let kind = create_membership_type(club.database(), 30).await;
    AxumTestRequest::post("/api/memberships")
        .bearer(&club.manager)
        .json(&json!({"client_id": client_id, "type_id": kind.id, "start_date": today()}))
        .send(club.app())
        .await
        .assert_status(StatusCode::CREATED)
        .json()
}

#[tokio::test]
async fn test_record_payment_for_membership() {
    let club = setup_club().await;
    let client = create_client(club.database(), "Anna").await;
    let membership = membership_for(&club, client.id).await;

    let response = AxumTestRequest::post("/api/payments")
        .bearer(&club.manager)
        .json(&json!({
            "client_id": client.id,
            "membership_id": membership.id,
            "amount": "3000.00",
            "payment_type": "card",
            "description": "Monthly plan"
        }))
        .send(club.app())
        .await
        .assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["amount"], "3000.00");

    let payment: Payment = serde_json::from_value(body).unwrap();
    assert_eq!(payment.payment_type, PaymentType::Card);
    assert_eq!(payment.membership_id, Some(membership.id));
    assert_eq!(payment.payment_date.date_naive(), today());
}

#[tokio::test]
async fn test_payment_amount_must_be_positive() {
    let club = setup_club().await;
    let client = create_client(club.database(), "Anna").await;

    for amount in [json!("0"), json!("-10.00")] {
        let response = AxumTestRequest::post("/api/payments")
            .bearer(&club.manager)
            .json(&json!({"client_id": client.id, "amount": amount, "payment_type": "cash"}))
            .send(club.app())
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.error_code(), "VALUE_OUT_OF_RANGE");
    }

    let response = AxumTestRequest::post("/api/payments")
        .bearer(&club.manager)
        .json(&json!({"client_id": client.id, "amount": "10.005", "payment_type": "cash"}))
        .send(club.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALUE_OUT_OF_RANGE");

    let payment: Value = AxumTestRequest::post("/api/payments")
        .bearer(&club.manager)
        .json(&json!({"client_id": client.id, "amount": 1250.5, "payment_type": "cash"}))
        .send(club.app())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(payment["amount"], "1250.50");
}

#[tokio::test]
async fn test_payment_membership_must_belong_to_client() {
    let club = setup_club().await;
    let anna = create_client(club.database(), "Anna").await;
    let vera = create_client(club.database(), "Vera").await;
    let annas_membership = membership_for(&club, anna.id).await;

    AxumTestRequest::post("/api/payments")
        .bearer(&club.manager)
        .json(&json!({
            "client_id": vera.id,
            "membership_id": annas_membership.id,
            "amount": "1500",
            "payment_type": "transfer"
        }))
        .send(club.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::post("/api/payments")
        .bearer(&club.manager)
        .json(&json!({"client_id": 999, "amount": "1500", "payment_type": "cash"}))
        .send(club.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_payments_by_client_and_date() {
    let club = setup_club().await;
    let anna = create_client(club.database(), "Anna").await;
    let vera = create_client(club.database(), "Vera").await;

    for (client_id, amount) in [(anna.id, "1000"), (anna.id, "500"), (vera.id, "700")] {
        AxumTestRequest::post("/api/payments")
            .bearer(&club.manager)
            .json(&json!({"client_id": client_id, "amount": amount, "payment_type": "cash"}))
            .send(club.app())
            .await
            .assert_status(StatusCode::CREATED);
    }

    let page: Value = AxumTestRequest::get(&format!("/api/payments?client_id={}", anna.id))
        .bearer(&club.trainer)
        .send(club.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(page["count"], 2);

    let page: Value = AxumTestRequest::get(&format!("/api/payments?date_from={}", today()))
        .bearer(&club.manager)
        .send(club.app())
        .await
        .json();
    assert_eq!(page["count"], 3);

    let yesterday = today() - Duration::days(1);
    let page: Value = AxumTestRequest::get(&format!("/api/payments?date_to={yesterday}"))
        .bearer(&club.manager)
        .send(club.app())
        .await
        .json();
    assert_eq!(page["count"], 0);

    AxumTestRequest::get(&format!(
        "/api/payments?date_from={}&date_to={yesterday}",
        today()
    ))
    .bearer(&club.manager)
    .send(club.app())
    .await
    .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deleting_membership_keeps_payment() {
    let club = setup_club().await;
    let client = create_client(club.database(), "Anna").await;
    let membership = membership_for(&club, client.id).await;

    let payment: Payment = AxumTestRequest::post("/api/payments")
        .bearer(&club.manager)
        .json(&json!({
            "client_id": client.id,
            "membership_id": membership.id,
            "amount": "3000",
            "payment_type": "card"
        }))
        .send(club.app())
        .await
        .json();

    AxumTestRequest::delete(&format!("/api/memberships/{}", membership.id))
        .bearer(&club.manager)
        .send(club.app())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let kept: Payment = AxumTestRequest::get(&format!("/api/payments/{}", payment.id))
        .bearer(&club.manager)
        .send(club.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(kept.membership_id, None);
}
