// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TestBox

//! Axum extractor for inbound webhooks.
//!
//! Use the [`Webhook`] extractor in handlers to receive a validated,
//! authenticated request:
//!
//! ```rust,ignore
//! async fn trial_webhook(
//!     Webhook(request): Webhook<TrialRequest>,
//! ) -> Result<Response, TestBoxError> {
//!     let mut trial = Trial::new();
//!     trial.set_email("admin@example.com");
//!     request.fulfill(&AxumResponder, &trial)
//! }
//! ```
//!
//! The extractor runs the full inbound pipeline: parse the JSON body, run the
//! structural guard for `T`, then verify the bearer token against the
//! envelope's trial id. Validation runs before any token work, so a malformed
//! payload is a 400 regardless of what the Authorization header carries; a
//! missing header or failed verification is a 401 with an empty body.

use axum::extract::{FromRef, FromRequest, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::client::TestBox;
use crate::error::TestBoxError;
use crate::requests::{AuthenticatedRequest, BulkUseCaseRequest, TrialRequest, UseCaseRequest};

/// A validated, authenticated inbound request.
pub struct Webhook<T>(pub T);

/// [`Webhook`] over a trial request.
pub type TrialWebhook = Webhook<TrialRequest>;
/// [`Webhook`] over a use-case request.
pub type UseCaseWebhook = Webhook<UseCaseRequest>;
/// [`Webhook`] over a bulk use-case request.
pub type BulkUseCaseWebhook = Webhook<BulkUseCaseRequest>;

/// Why the extractor rejected an inbound request.
#[derive(Debug)]
pub enum WebhookRejection {
    /// The body is not valid JSON.
    Malformed,
    /// The body failed its structural guard.
    Invalid(TestBoxError),
    /// The Authorization header is missing, not a bearer credential, or the
    /// token failed verification. Deliberately undifferentiated.
    Unauthorized,
}

impl IntoResponse for WebhookRejection {
    fn into_response(self) -> Response {
        match self {
            WebhookRejection::Malformed => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "request body is not valid JSON" })),
            )
                .into_response(),
            WebhookRejection::Invalid(err) => err.into_response(),
            // Empty body: no oracle for forging attempts.
            WebhookRejection::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

impl<S, T> FromRequest<S> for Webhook<T>
where
    S: Send + Sync,
    TestBox: FromRef<S>,
    T: AuthenticatedRequest + Send,
{
    type Rejection = WebhookRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let testbox = TestBox::from_ref(state);
        let token = bearer_token(req.headers());

        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|_| WebhookRejection::Malformed)?;

        // Structural validation first: a malformed payload is rejected before
        // any token is inspected.
        let mut request = T::from_value(&value).map_err(WebhookRejection::Invalid)?;

        let token = token.ok_or(WebhookRejection::Unauthorized)?;
        if !testbox.verify_token(&token, request.trial_id()).await {
            return Err(WebhookRejection::Unauthorized);
        }
        request.auth_mut().mark_verified(&token);

        Ok(Webhook(request))
    }
}
