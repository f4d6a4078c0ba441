// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TestBox

//! SDK error types.
//!
//! Token verification failure is deliberately *not* represented here: it
//! always collapses to a boolean `false` at the verifier boundary so that a
//! caller (or an attacker probing the webhook) cannot distinguish a bad
//! signature from a wrong audience or a mismatched trial id.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the SDK to the integrating application.
#[derive(Debug, Error)]
pub enum TestBoxError {
    /// An inbound payload failed its structural guard. `kind` names the
    /// request class whose validator rejected it.
    #[error("an invalid payload was provided to {kind}")]
    Validation {
        /// Name of the rejecting request class.
        kind: &'static str,
    },

    /// A fulfillment operation was attempted before `verify_token` succeeded.
    ///
    /// This is a contract violation by the integrating application, not a
    /// runtime condition; it is thrown loudly rather than swallowed.
    #[error("the bearer token of this request was not verified before fulfilling it")]
    AuthNotVerified,

    /// `Trial::set_password` was called before an admin user existed.
    #[error("an admin user must be set before a password can be attached to it")]
    AdminUserMissing,

    /// An outbound callback POST failed (connection error or non-2xx status).
    #[error("callback delivery failed: {0}")]
    Delivery(#[from] reqwest::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl TestBoxError {
    /// HTTP status this error maps to when surfaced from a webhook endpoint.
    pub fn status_code(&self) -> StatusCode {
        match self {
            TestBoxError::Validation { .. } => StatusCode::BAD_REQUEST,
            TestBoxError::AuthNotVerified => StatusCode::UNAUTHORIZED,
            TestBoxError::AdminUserMissing | TestBoxError::Delivery(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for TestBoxError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // 401 responses carry an empty body: the counterparty ignores any
        // detail, and detail would only serve as a forging oracle.
        if status == StatusCode::UNAUTHORIZED {
            return status.into_response();
        }
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
