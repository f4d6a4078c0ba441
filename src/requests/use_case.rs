// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TestBox

//! Use-case requests: TestBox asks for a demonstration URL of a named
//! scenario inside an existing trial.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::{AuthState, AuthenticatedRequest};
use crate::client::TestBox;
use crate::error::TestBoxError;
use crate::models::UseCaseType;
use crate::responder::Responder;
use crate::trial::Trial;
use crate::validators::is_use_case_request;

/// The fulfillment body for use-case requests: a flat `{use_case_type: url}`
/// map, single-entry for [`UseCaseRequest`], multi-entry for
/// [`BulkUseCaseRequest`](super::BulkUseCaseRequest).
pub type UseCaseUrls = BTreeMap<UseCaseType, String>;

/// A request for a single use-case demonstration URL.
#[derive(Debug, Clone, Deserialize)]
pub struct UseCaseRequest {
    /// Protocol version. Always the supported literal after validation.
    pub version: u64,
    /// The trial this request concerns.
    pub trial_id: String,
    /// The scenario a URL is requested for.
    pub use_case_type: UseCaseType,
    /// The trial the scenario should be demonstrated in.
    pub trial_data: Trial,
    /// Callback URL for asynchronous success delivery.
    pub success_url: String,
    /// Callback URL for asynchronous failure reporting.
    pub failure_url: String,
    #[serde(skip)]
    auth: AuthState,
}

impl AuthenticatedRequest for UseCaseRequest {
    const KIND: &'static str = "UseCaseRequest";

    fn from_value(value: &Value) -> Result<Self, TestBoxError> {
        if !is_use_case_request(value) {
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

impl UseCaseRequest {
    /// Fulfill synchronously: respond 201 with `{use_case_type: url}`.
    pub fn fulfill<R: Responder>(
        &self,
        responder: &R,
        url: impl Into<String>,
    ) -> Result<R::Response, TestBoxError> {
        self.assert_authenticated()?;
        Ok(responder.respond_success(&self.body(url)))
    }

    /// Fulfill asynchronously: POST `{use_case_type: url}` to `success_url`
    /// with the verified token as the bearer credential.
    pub async fn fulfill_async(
        &self,
        testbox: &TestBox,
        url: impl Into<String>,
    ) -> Result<(), TestBoxError> {
        let token = self.assert_authenticated()?;
        testbox
            .post_callback(&self.success_url, token, &self.body(url))
            .await
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

    fn body(&self, url: impl Into<String>) -> UseCaseUrls {
        let mut urls = UseCaseUrls::new();
        urls.insert(self.use_case_type, url.into());
        urls
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
            "use_case_type": "customer-support-ticket-tagging",
            "trial_data": {
                "admin_authentication": { "user": { "email": "admin@example.com" } },
                "trial_users": [{ "email": "user@example.com" }]
            },
            "success_url": "https://x/success/abc",
            "failure_url": "https://x/failure/abc"
        })
    }

    #[test]
    fn construction_parses_enum_and_embedded_trial() {
        let request = UseCaseRequest::from_value(&request_value()).unwrap();
        assert_eq!(
            request.use_case_type,
            UseCaseType::CustomerSupportTicketTagging
        );
        assert_eq!(
            request.trial_data.admin_authentication.as_ref().unwrap().user.email,
            "admin@example.com"
        );
    }

    #[test]
    fn unknown_use_case_type_fails_validation() {
        let mut value = request_value();
        value
            .as_object_mut()
            .unwrap()
            .insert("use_case_type".to_string(), json!("billing-export"));
        assert!(matches!(
            UseCaseRequest::from_value(&value),
            Err(TestBoxError::Validation {
                kind: "UseCaseRequest"
            })
        ));
    }

    // Both fulfillment entry points reject an unverified request.
    #[tokio::test]
    async fn fulfillment_requires_verification() {
        let request = UseCaseRequest::from_value(&request_value()).unwrap();
        let testbox = TestBox::new(TestBoxConfig::new("my-product").with_pinned_keys(
            HashMap::new(),
        ));

        assert!(matches!(
            request.fulfill(&AxumResponder, "https://demo/x"),
            Err(TestBoxError::AuthNotVerified)
        ));
        assert!(matches!(
            request.fulfill_async(&testbox, "https://demo/x").await,
            Err(TestBoxError::AuthNotVerified)
        ));
    }

    #[tokio::test]
    async fn verification_unlocks_sync_fulfillment() {
        let keypair = testkeys::generate();
        let mut keys = HashMap::new();
        keys.insert("kid-1".to_string(), keypair.public_pem.clone());
        let testbox = TestBox::new(TestBoxConfig::new("my-product").with_pinned_keys(keys));

        let mut request = UseCaseRequest::from_value(&request_value()).unwrap();
        let token = testkeys::sign(
            &keypair.pkcs8,
            Some("kid-1"),
            &testkeys::claims("abc", "my-product"),
        );
        assert!(request.verify_token(&testbox, &token).await);

        let response = request.fulfill(&AxumResponder, "https://demo/x").unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::CREATED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            json!({ "customer-support-ticket-tagging": "https://demo/x" })
        );
    }

    #[test]
    fn body_is_a_single_entry_map_keyed_by_wire_name() {
        let request = UseCaseRequest::from_value(&request_value()).unwrap();
        let body = serde_json::to_value(request.body("https://demo/x")).unwrap();
        assert_eq!(
            body,
            json!({ "customer-support-ticket-tagging": "https://demo/x" })
        );
    }
}
