// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TestBox

//! Bulk use-case requests: several demonstration URLs in one round trip.

use serde::Deserialize;
use serde_json::Value;

use super::{AuthState, AuthenticatedRequest, UseCaseUrls};
use crate::client::TestBox;
use crate::error::TestBoxError;
use crate::models::UseCaseType;
use crate::responder::Responder;
use crate::trial::Trial;
use crate::validators::is_bulk_use_case_request;

/// A request for demonstration URLs of several use cases at once.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkUseCaseRequest {
    /// Protocol version. Always the supported literal after validation.
    pub version: u64,
    /// The trial this request concerns.
    pub trial_id: String,
    /// The scenarios URLs are requested for.
    pub use_case_types: Vec<UseCaseType>,
    /// The trial the scenarios should be demonstrated in.
    pub trial_data: Trial,
    /// Callback URL for asynchronous success delivery.
    pub success_url: String,
    /// Callback URL for asynchronous failure reporting.
    pub failure_url: String,
    #[serde(skip)]
    auth: AuthState,
}

impl AuthenticatedRequest for BulkUseCaseRequest {
    const KIND: &'static str = "BulkUseCaseRequest";

    fn from_value(value: &Value) -> Result<Self, TestBoxError> {
        if !is_bulk_use_case_request(value) {
            return Err(TestBoxError::Validation { kind: Self::KIND });
        }
        serde_json::from_value(value.clone())
            .map_err(|_| TestBoxError::Validation { kind: Self::KIND })
    }

    fn trial_id(&self) -> &str {
        &self.trial_id
    }

    fn auth(&self) -> &AuthState {
        &self.auth
    }

    fn auth_mut(&mut self) -> &mut AuthState {
        &mut self.auth
    }
}

impl BulkUseCaseRequest {
    /// Fulfill synchronously: respond 201 with the `{use_case_type: url}`
    /// map as the JSON body.
    pub fn fulfill<R: Responder>(
        &self,
        responder: &R,
        urls: &UseCaseUrls,
    ) -> Result<R::Response, TestBoxError> {
        self.assert_authenticated()?;
        Ok(responder.respond_success(urls))
    }

    /// Fulfill asynchronously: POST the `{use_case_type: url}` map to
    /// `success_url` with the verified token as the bearer credential.
    pub async fn fulfill_async(
        &self,
        testbox: &TestBox,
        urls: &UseCaseUrls,
    ) -> Result<(), TestBoxError> {
        let token = self.assert_authenticated()?;
        testbox.post_callback(&self.success_url, token, urls).await
    }

    /// Report a failure: POST a caller-supplied diagnostic to `failure_url`.
    pub async fn report_failure_async(
        &self,
        testbox: &TestBox,
        diagnostic: &Value,
    ) -> Result<(), TestBoxError> {
        let token = self.assert_authenticated()?;
        testbox
            .post_callback(&self.failure_url, token, diagnostic)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;
    use crate::auth::testkeys;
    use crate::config::TestBoxConfig;
    use crate::responder::AxumResponder;

    fn request_value() -> Value {
        json!({
            "version": 1,
            "trial_id": "abc",
            "use_case_types": [
                "customer-support-ticket-tagging",
                "customer-support-canned-responses"
            ],
            "trial_data": {
                "admin_authentication": { "user": { "email": "admin@example.com" } },
                "trial_users": [{ "email": "user@example.com" }]
            },
            "success_url": "https://x/success/abc",
            "failure_url": "https://x/failure/abc"
        })
    }

    #[test]
    fn construction_parses_all_requested_types() {
        let request = BulkUseCaseRequest::from_value(&request_value()).unwrap();
        assert_eq!(
            request.use_case_types,
            vec![
                UseCaseType::CustomerSupportTicketTagging,
                UseCaseType::CustomerSupportCannedResponses
            ]
        );
    }

    #[test]
    fn unknown_requested_type_fails_validation() {
        let mut value = request_value();
        value
            .as_object_mut()
            .unwrap()
            .insert("use_case_types".to_string(), json!(["billing-export"]));
        assert!(matches!(
            BulkUseCaseRequest::from_value(&value),
            Err(TestBoxError::Validation {
                kind: "BulkUseCaseRequest"
            })
        ));
    }

    // Both fulfillment entry points reject an unverified request.
    #[tokio::test]
    async fn fulfillment_requires_verification() {
        let request = BulkUseCaseRequest::from_value(&request_value()).unwrap();
        let testbox = TestBox::new(TestBoxConfig::new("my-product").with_pinned_keys(
            HashMap::new(),
        ));
        let urls = UseCaseUrls::new();

        assert!(matches!(
            request.fulfill(&AxumResponder, &urls),
            Err(TestBoxError::AuthNotVerified)
        ));
        assert!(matches!(
            request.fulfill_async(&testbox, &urls).await,
            Err(TestBoxError::AuthNotVerified)
        ));
    }

    #[tokio::test]
    async fn verification_unlocks_sync_fulfillment() {
        let keypair = testkeys::generate();
        let mut keys = HashMap::new();
        keys.insert("kid-1".to_string(), keypair.public_pem.clone());
        let testbox = TestBox::new(TestBoxConfig::new("my-product").with_pinned_keys(keys));

        let mut request = BulkUseCaseRequest::from_value(&request_value()).unwrap();
        let token = testkeys::sign(
            &keypair.pkcs8,
            Some("kid-1"),
            &testkeys::claims("abc", "my-product"),
        );
        assert!(request.verify_token(&testbox, &token).await);

        let mut urls = UseCaseUrls::new();
        urls.insert(
            UseCaseType::CustomerSupportTicketTagging,
            "https://demo/tagging".to_string(),
        );
        urls.insert(
            UseCaseType::CustomerSupportCannedResponses,
            "https://demo/canned".to_string(),
        );
        let response = request.fulfill(&AxumResponder, &urls).unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::CREATED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            json!({
                "customer-support-ticket-tagging": "https://demo/tagging",
                "customer-support-canned-responses": "https://demo/canned"
            })
        );
    }

    #[test]
    fn url_map_serializes_flat_with_wire_names() {
        let mut urls = UseCaseUrls::new();
        urls.insert(
            UseCaseType::CustomerSupportTicketTagging,
            "https://demo/tagging".to_string(),
        );
        urls.insert(
            UseCaseType::CustomerSupportCannedResponses,
            "https://demo/canned".to_string(),
        );
        assert_eq!(
            serde_json::to_value(&urls).unwrap(),
            json!({
                "customer-support-ticket-tagging": "https://demo/tagging",
                "customer-support-canned-responses": "https://demo/canned"
            })
        );
    }
}
