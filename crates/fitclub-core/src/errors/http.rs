// ABOUTME: axum IntoResponse integration for AppError
// ABOUTME: Renders errors as JSON bodies with the status code derived from ErrorCode
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{AppError, ErrorResponse};
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use tracing::{error, warn};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.code.is_server_error() {
            error!(
                error.code = ?self.code,
                error.source = ?self.source,
                "Request failed: {}",
                self.message
            );
        } else {
            warn!(error.code = ?self.code, "Request rejected: {}", self.message);
        }

        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_status_matches_error_code() {
        let response = AppError::not_found("Client 7").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::new(ErrorCode::TrainingFull, "No places left").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
