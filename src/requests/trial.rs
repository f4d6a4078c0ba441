// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TestBox

//! Trial provisioning requests.

use serde::Deserialize;
use serde_json::Value;

use super::{AuthState, AuthenticatedRequest};
use crate::client::TestBox;
use crate::error::TestBoxError;
use crate::responder::Responder;
use crate::trial::Trial;
use crate::validators::is_trial_request;

/// A request to provision a new trial of the partner's product.
#[derive(Debug, Clone, Deserialize)]
pub struct TrialRequest {
    /// Protocol version. Always the supported literal after validation.
    pub version: u64,
    /// The trial this request concerns.
    pub trial_id: String,
    /// Callback URL for asynchronous success delivery.
    pub success_url: String,
    /// Callback URL for asynchronous failure reporting.
    pub failure_url: String,
    #[serde(skip)]
    auth: AuthState,
}

impl AuthenticatedRequest for TrialRequest {
    const KIND: &'static str = "TrialRequest";

    fn from_value(value: &Value) -> Result<Self, TestBoxError> {
        if !is_trial_request(value) {
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

impl TrialRequest {
    /// Fulfill synchronously: respond 201 with the trial as the JSON body.
    pub fn fulfill<R: Responder>(
        &self,
        responder: &R,
        trial: &Trial,
    ) -> Result<R::Response, TestBoxError> {
        self.assert_authenticated()?;
        Ok(responder.respond_success(trial))
    }

    /// Fulfill asynchronously: POST the trial to `success_url` with the
    /// verified token as the bearer credential.
    ///
    /// The caller is expected to have already acknowledged the inbound
    /// webhook (a plain 200) before awaiting this, since delivery may be
    /// slow.
    pub async fn fulfill_async(
        &self,
        testbox: &TestBox,
        trial: &Trial,
    ) -> Result<(), TestBoxError> {
        let token = self.assert_authenticated()?;
        testbox.post_callback(&self.success_url, token, trial).await
    }

    /// Report a provisioning failure: POST a caller-supplied diagnostic
    /// object to `failure_url`.
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
