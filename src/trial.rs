// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TestBox

//! The trial entity a partner builds in response to a provisioning request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::TestBoxError,
    models::{AdminAuthentication, Dict, SecretContext, User},
    validators::{is_trial, TrialGuards},
};

/// An account/credential bundle representing a provisioned test instance of
/// the partner's product.
///
/// `Trial` is a mutable, chainable builder: each setter returns the same
/// instance so construction reads fluently, and each setter merges into the
/// relevant nested structure without discarding previously set sibling
/// fields.
///
/// ```
/// use testbox_sdk::{Trial, User};
///
/// let mut trial = Trial::new();
/// trial
///     .set_email("admin@example.com")
///     .set_password("hunter2")?
///     .set_subdomain("acme")
///     .add_user(User::new("agent@example.com"));
/// assert!(trial.validate());
/// # Ok::<(), testbox_sdk::TestBoxError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trial {
    /// Values interpolated into the trial's start URL (e.g. a subdomain).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_url_context: Option<Dict>,
    /// Secrets TestBox needs to impersonate trial users.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_context: Option<SecretContext>,
    /// The administrator credential bundle. Required for a valid trial.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_authentication: Option<AdminAuthentication>,
    /// Non-admin users provisioned inside the trial. At least one is required.
    pub trial_users: Vec<User>,
    /// When the trial was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Default for Trial {
    fn default() -> Self {
        Self {
            start_url_context: None,
            secret_context: None,
            admin_authentication: None,
            trial_users: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

impl Trial {
    /// Create an empty trial stamped with the current time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the admin user's email, creating the admin identity if absent.
    pub fn set_email(&mut self, email: impl Into<String>) -> &mut Self {
        match self.admin_authentication.as_mut() {
            Some(admin) => admin.user.email = email.into(),
            None => {
                self.admin_authentication = Some(AdminAuthentication {
                    user: User::new(email),
                    ..AdminAuthentication::default()
                });
            }
        }
        self
    }

    /// Attach a password to the admin user.
    ///
    /// The admin identity must exist before a credential can attach to it:
    /// call [`set_email`](Self::set_email) first.
    pub fn set_password(
        &mut self,
        password: impl Into<String>,
    ) -> Result<&mut Self, TestBoxError> {
        let admin = self
            .admin_authentication
            .as_mut()
            .ok_or(TestBoxError::AdminUserMissing)?;
        admin.user.password = Some(password.into());
        Ok(self)
    }

    /// Record the trial's subdomain in the start URL context.
    pub fn set_subdomain(&mut self, subdomain: impl Into<String>) -> &mut Self {
        self.start_url_context
            .get_or_insert_with(Dict::new)
            .insert("subdomain".to_string(), subdomain.into().into());
        self
    }

    /// Record the SSO JWT signing secret in the secret context.
    pub fn set_jwt_secret(&mut self, secret: impl Into<String>) -> &mut Self {
        self.secret_context
            .get_or_insert_with(SecretContext::default)
            .sso_jwt_secret = Some(secret.into());
        self
    }

    /// Attach an admin API token, creating the admin bundle if absent.
    pub fn set_api_key(&mut self, api_token: impl Into<String>) -> &mut Self {
        self.admin_authentication
            .get_or_insert_with(AdminAuthentication::default)
            .api_token = Some(api_token.into());
        self
    }

    /// Add a trial user.
    pub fn add_user(&mut self, user: User) -> &mut Self {
        self.trial_users.push(user);
        self
    }

    /// Check the trial against the same structural guards used for inbound
    /// payload validation, plus the requirement that at least one trial user
    /// is present.
    pub fn validate(&self) -> bool {
        self.validate_with(&TrialGuards::default())
    }

    /// [`validate`](Self::validate) with partner-specific extras guards.
    pub fn validate_with(&self, guards: &TrialGuards<'_>) -> bool {
        if self.trial_users.is_empty() {
            return false;
        }
        match serde_json::to_value(self) {
            Ok(value) => is_trial(&value, guards),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // validate() requires an admin bundle and at least one trial user.
    #[test]
    fn validate_requires_admin_and_trial_user() {
        let mut trial = Trial::new();
        assert!(!trial.validate());

        trial.set_email("admin@example.com");
        assert!(!trial.validate(), "no trial users yet");

        trial.add_user(User::new("user@example.com"));
        assert!(trial.validate());

        let mut no_admin = Trial::new();
        no_admin.add_user(User::new("user@example.com"));
        assert!(!no_admin.validate());
    }

    // Chained calls and sequential calls land on identical state.
    #[test]
    fn chained_and_sequential_calls_are_equivalent() {
        let mut chained = Trial::new();
        chained
            .set_email("admin@example.com")
            .set_password("hunter2")
            .unwrap()
            .set_subdomain("acme");

        let mut sequential = Trial::new();
        sequential.set_email("admin@example.com");
        sequential.set_password("hunter2").unwrap();
        sequential.set_subdomain("acme");

        assert_eq!(chained.admin_authentication, sequential.admin_authentication);
        assert_eq!(chained.start_url_context, sequential.start_url_context);
    }

    #[test]
    fn set_password_requires_admin_identity() {
        let mut trial = Trial::new();
        assert!(matches!(
            trial.set_password("hunter2"),
            Err(TestBoxError::AdminUserMissing)
        ));

        trial.set_email("admin@example.com");
        assert!(trial.set_password("hunter2").is_ok());
        assert_eq!(
            trial
                .admin_authentication
                .as_ref()
                .unwrap()
                .user
                .password
                .as_deref(),
            Some("hunter2")
        );
    }

    #[test]
    fn setters_merge_without_discarding_siblings() {
        let mut trial = Trial::new();
        trial.set_api_key("api-123").set_email("admin@example.com");

        let admin = trial.admin_authentication.as_ref().unwrap();
        assert_eq!(admin.api_token.as_deref(), Some("api-123"));
        assert_eq!(admin.user.email, "admin@example.com");

        trial.set_jwt_secret("sso-secret").set_subdomain("acme");
        assert_eq!(
            trial
                .secret_context
                .as_ref()
                .unwrap()
                .sso_jwt_secret
                .as_deref(),
            Some("sso-secret")
        );
        assert_eq!(
            trial.start_url_context.as_ref().unwrap()["subdomain"],
            serde_json::json!("acme")
        );
    }

    #[test]
    fn validate_honors_extras_guards() {
        let mut trial = Trial::new();
        trial
            .set_email("admin@example.com")
            .add_user(User::new("user@example.com"));
        trial.trial_users[0].extras = Some(Dict::new());

        let rejects_all = |_: &serde_json::Value| false;
        let guards = TrialGuards {
            user_extras: Some(&rejects_all),
            ..TrialGuards::default()
        };
        assert!(trial.validate());
        assert!(!trial.validate_with(&guards));
    }

    #[test]
    fn serialized_trial_passes_inbound_guard_round() {
        let mut trial = Trial::new();
        trial
            .set_email("admin@example.com")
            .set_api_key("api-123")
            .add_user(User::new("user@example.com"));

        let value = serde_json::to_value(&trial).unwrap();
        assert!(is_trial(&value, &TrialGuards::default()));
        // created_at serializes as an RFC 3339 string.
        assert!(value["created_at"].is_string());
    }
}
