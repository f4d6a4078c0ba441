// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TestBox

//! Domain entities shared by inbound payloads and outbound responses.
//!
//! These are the typed counterparts of the wire shapes checked by the
//! structural guards in [`crate::validators`]: a value is only deserialized
//! into one of these after its guard has accepted it.

use serde::{Deserialize, Serialize};

/// Free-form extension payload carried in `extras` fields.
pub type Dict = serde_json::Map<String, serde_json::Value>;

/// A login identity provisioned inside a trial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    /// Email address the user signs in with.
    pub email: String,
    /// Password, when the product uses password authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// TOTP seed, when the product enforces two-factor login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totp_token: Option<String>,
    /// Partner-specific extension fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<Dict>,
}

impl User {
    /// Create a user with the given email and no credentials.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }
}

/// The administrator credential bundle of a trial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminAuthentication {
    /// API token granting programmatic admin access.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// The admin login identity.
    pub user: User,
    /// Partner-specific extension fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<Dict>,
}

/// Secrets TestBox needs to impersonate trial users (e.g. for SSO).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecretContext {
    /// Shared secret for signing SSO JWTs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sso_jwt_secret: Option<String>,
    /// Partner-specific extension fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<Dict>,
}

/// Named demonstration scenarios a partner can return URLs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UseCaseType {
    /// Automatic tagging of customer support tickets.
    #[serde(rename = "customer-support-ticket-tagging")]
    CustomerSupportTicketTagging,
    /// Canned responses for customer support agents.
    #[serde(rename = "customer-support-canned-responses")]
    CustomerSupportCannedResponses,
}
