// ABOUTME: Integration tests for token login, refresh, and current-user endpoints
// ABOUTME: Covers bad credentials, inactive accounts, and bearer header handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{create_test_user, setup_club, TEST_PASSWORD};
use fitclub_core::models::UserRole;
use fitclub_server::database::users::UserRecord;
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

#[tokio::test]
async fn test_login_issues_token_pair() {
    let club = setup_club().await;

    let response = AxumTestRequest::post("/api/auth/token")
        .json(&json!({"username": "manager", "password": TEST_PASSWORD}))
        .send(club.app())
        .await
        .assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert!(body["access"].as_str().unwrap().len() > 20);
    assert!(body["refresh"].as_str().unwrap().len() > 20);
    assert_eq!(body["user"]["username"], "manager");
    assert_eq!(body["user"]["role"], "manager");
    assert!(body["user"].get("password_hash").is_none());
    assert!(!body["user"]["last_login"].is_null());
}

#[tokio::test]
async fn test_login_rejects_wrong_password_and_unknown_user() {
    let club = setup_club().await;

    let response = AxumTestRequest::post("/api/auth/token")
        .json(&json!({"username": "manager", "password": "not-the-password"}))
        .send(club.app())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "AUTH_INVALID");

    AxumTestRequest::post("/api/auth/token")
        .json(&json!({"username": "nobody", "password": TEST_PASSWORD}))
        .send(club.app())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_inactive_account_cannot_log_in() {
    let club = setup_club().await;
    let user = create_test_user(club.database(), "retired", UserRole::Manager, None)
        .await
        .unwrap();
    club.database()
        .users()
        .update(
            user.id,
            &UserRecord {
                username: user.username.clone(),
                email: None,
                role: UserRole::Manager,
                trainer_id: None,
                is_active: false,
            },
            None,
        )
        .await
        .unwrap();

    AxumTestRequest::post("/api/auth/token")
        .json(&json!({"username": "retired", "password": TEST_PASSWORD}))
        .send(club.app())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_yields_usable_access_token() {
    let club = setup_club().await;

    let login: Value = AxumTestRequest::post("/api/auth/token")
        .json(&json!({"username": "admin", "password": TEST_PASSWORD}))
        .send(club.app())
        .await
        .json();
    let refresh = login["refresh"].as_str().unwrap();

    let refreshed: Value = AxumTestRequest::post("/api/auth/token/refresh")
        .json(&json!({"refresh": refresh}))
        .send(club.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let access = refreshed["access"].as_str().unwrap();

    let me: Value = AxumTestRequest::get("/api/auth/me")
        .bearer(access)
        .send(club.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(me["username"], "admin");
}

#[tokio::test]
async fn test_access_token_is_not_a_refresh_token() {
    let club = setup_club().await;

    AxumTestRequest::post("/api/auth/token/refresh")
        .json(&json!({"refresh": club.admin}))
        .send(club.app())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_and_malformed_authorization() {
    let club = setup_club().await;

    let response = AxumTestRequest::get("/api/clients")
        .send(club.app())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "AUTH_REQUIRED");

    let response = AxumTestRequest::get("/api/clients")
        .header("authorization", "Token abc")
        .send(club.app())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "AUTH_MALFORMED");

    AxumTestRequest::get("/api/clients")
        .bearer("not.a.jwt")
        .send(club.app())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deleted_account_token_is_rejected() {
    let club = setup_club().await;
    let user = create_test_user(club.database(), "temp", UserRole::Manager, None)
        .await
        .unwrap();
    let token = common::token_for(&club.resources, &user);
    assert!(club.database().users().delete(user.id).await.unwrap());

    AxumTestRequest::get("/api/clients")
        .bearer(&token)
        .send(club.app())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_endpoints_need_no_token() {
    let club = setup_club().await;

    let response = AxumTestRequest::get("/health")
        .send(club.app())
        .await
        .assert_status(StatusCode::OK);
    assert!(response.header("x-request-id").is_some());

    let ready: Value = AxumTestRequest::get("/ready")
        .send(club.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(ready["database"], "ok");
}
