// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TestBox

//! Inbound request kinds and their authentication state.
//!
//! Each request variant embeds an [`AuthState`] value rather than inheriting
//! from a base class. The shared behavior (verify a bearer token against the
//! request's trial id, assert authentication before fulfilling) lives on the
//! [`AuthenticatedRequest`] trait, whose default `verify_token` covers every
//! variant.
//!
//! Lifecycle: `from_value` runs the structural guard and constructs the
//! request unauthenticated; `verify_token` transitions it to authenticated on
//! success; every fulfillment path starts with `assert_authenticated`.
//! Authentication is monotonic: once established it is never revoked for the
//! lifetime of the request instance.

mod bulk;
mod trial;
mod use_case;

pub use bulk::BulkUseCaseRequest;
pub use trial::TrialRequest;
pub use use_case::{UseCaseRequest, UseCaseUrls};

use serde_json::Value;

use crate::client::TestBox;
use crate::error::TestBoxError;

/// Per-request authentication state.
///
/// Starts unauthenticated; [`mark_verified`](Self::mark_verified) records the
/// token that verified and is the only transition. The recorded token is
/// reused as the bearer credential on outbound callbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    token: Option<String>,
}

impl AuthState {
    /// Whether a token has been verified for this request.
    pub fn is_verified(&self) -> bool {
        self.token.is_some()
    }

    /// The verified bearer token, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub(crate) fn mark_verified(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    /// The verified token, or [`TestBoxError::AuthNotVerified`].
    pub(crate) fn assert_verified(&self) -> Result<&str, TestBoxError> {
        self.token.as_deref().ok_or(TestBoxError::AuthNotVerified)
    }
}

/// A request carrying the common envelope and an authentication state.
#[allow(async_fn_in_trait)]
pub trait AuthenticatedRequest {
    /// Request class name, used in validation errors.
    const KIND: &'static str;

    /// Run the structural guard and construct the request (unauthenticated).
    fn from_value(value: &Value) -> Result<Self, TestBoxError>
    where
        Self: Sized;

    /// The trial this request concerns.
    fn trial_id(&self) -> &str;

    /// The request's authentication state.
    fn auth(&self) -> &AuthState;

    /// Mutable access for the verification transition.
    fn auth_mut(&mut self) -> &mut AuthState;

    /// Verify a bearer token against this request's trial id.
    ///
    /// On success the token is recorded and the request becomes
    /// authenticated. Returns the boolean outcome either way; verification
    /// never errors.
    async fn verify_token(&mut self, testbox: &TestBox, token: &str) -> bool {
        let verified = testbox.verify_token(token, self.trial_id()).await;
        if verified {
            self.auth_mut().mark_verified(token);
        }
        verified
    }

    /// Fail with [`TestBoxError::AuthNotVerified`] unless a token has been
    /// verified; otherwise return that token.
    ///
    /// Every fulfillment path calls this first. No response or outbound call
    /// is ever constructed from an unauthenticated request.
    fn assert_authenticated(&self) -> Result<&str, TestBoxError> {
        self.auth().assert_verified()
    }
}
