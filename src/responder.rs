// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TestBox

//! Framework response shaping.
//!
//! Synchronous fulfillment needs to produce a framework-native HTTP response.
//! Rather than branching on a framework name, the fulfillment paths take a
//! [`Responder`] implementation: one per host framework, injected by the
//! integrating application. [`AxumResponder`] is the implementation shipped
//! with the SDK.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Shapes fulfillment outcomes into framework-native responses.
pub trait Responder {
    /// The framework's response type.
    type Response;

    /// A fulfilled-now response: HTTP 201 with the entity as a JSON body.
    ///
    /// 201 specifically: TestBox treats a 200 from the synchronous endpoint
    /// as "acknowledged, will fulfill later" and ignores its body.
    fn respond_success<T: Serialize>(&self, body: &T) -> Self::Response;

    /// An authentication-failure response: HTTP 401 with an empty body.
    fn respond_failure(&self) -> Self::Response;
}

/// [`Responder`] for axum handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AxumResponder;

impl Responder for AxumResponder {
    type Response = Response;

    fn respond_success<T: Serialize>(&self, body: &T) -> Response {
        (StatusCode::CREATED, Json(body)).into_response()
    }

    fn respond_failure(&self) -> Response {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn success_is_201_with_json_body() {
        let response = AxumResponder.respond_success(&json!({ "ok": true }));
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn failure_is_401_with_empty_body() {
        let response = AxumResponder.respond_failure();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }
}
