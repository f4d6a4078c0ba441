// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TestBox

//! # TestBox Partner SDK
//!
//! Receive signed provisioning webhooks from TestBox, verify their
//! authenticity, build typed response payloads, and fulfill them either
//! synchronously (HTTP 201 within the request/response cycle) or
//! asynchronously (outbound callback POST).
//!
//! ## Quickstart
//!
//! ```rust,ignore
//! use axum::{routing::post, Router};
//! use testbox_sdk::{
//!     AxumResponder, TestBox, TestBoxConfig, TestBoxError, Trial, TrialWebhook, User, Webhook,
//! };
//!
//! async fn trial_webhook(
//!     Webhook(request): TrialWebhook,
//! ) -> Result<axum::response::Response, TestBoxError> {
//!     let mut trial = Trial::new();
//!     trial
//!         .set_email("admin@example.com")
//!         .set_password("generated-password")?
//!         .add_user(User::new("agent@example.com"));
//!     request.fulfill(&AxumResponder, &trial)
//! }
//!
//! let testbox = TestBox::new(TestBoxConfig::new("my-product"));
//! let app: Router = Router::new()
//!     .route("/webhooks/trial", post(trial_webhook))
//!     .with_state(testbox);
//! ```
//!
//! ## Security model
//!
//! Every inbound request carries a bearer JWT. Verification is fail-closed:
//! signature, expiry, audience (the configured product id), and trial-id
//! binding are all checked, and any failure collapses to "not authenticated"
//! with a 401 empty-body response. Fulfillment is structurally gated on
//! verification having succeeded; it is impossible to construct an outbound
//! callback or success response from an unauthenticated request.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod requests;
pub mod responder;
pub mod trial;
pub mod validators;

pub use auth::KeyProvider;
pub use client::TestBox;
pub use config::{KeySource, TestBoxConfig};
pub use error::TestBoxError;
pub use extract::{BulkUseCaseWebhook, TrialWebhook, UseCaseWebhook, Webhook, WebhookRejection};
pub use models::{AdminAuthentication, SecretContext, UseCaseType, User};
pub use requests::{
    AuthState, AuthenticatedRequest, BulkUseCaseRequest, TrialRequest, UseCaseRequest, UseCaseUrls,
};
pub use responder::{AxumResponder, Responder};
pub use trial::Trial;
pub use validators::TrialGuards;
