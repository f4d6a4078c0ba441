// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TestBox

//! The SDK entry point.
//!
//! A [`TestBox`] instance owns the configuration, the key provider, and the
//! HTTP client used for outbound callbacks. Construct one at startup and pass
//! it by reference (or clone it; cloning is cheap, the internals are shared)
//! wherever requests are verified or fulfilled. There is no process-wide
//! singleton.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::auth::{verifier, KeyProvider};
use crate::config::TestBoxConfig;
use crate::error::TestBoxError;

/// Timeout for outbound HTTP (key fetches and callback delivery).
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle over the configured SDK state.
#[derive(Clone)]
pub struct TestBox {
    config: Arc<TestBoxConfig>,
    keys: KeyProvider,
    client: reqwest::Client,
}

impl TestBox {
    /// Build an SDK handle from configuration.
    pub fn new(config: TestBoxConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        let keys = KeyProvider::new(&config.key_source, client.clone());
        Self {
            config: Arc::new(config),
            keys,
            client,
        }
    }

    /// The configuration this handle was built with.
    pub fn config(&self) -> &TestBoxConfig {
        &self.config
    }

    /// Verify a bearer token against a trial id, using the configured product
    /// id as the expected audience.
    ///
    /// Fail-closed: returns `false` for every failure mode, never an error.
    pub async fn verify_token(&self, token: &str, trial_id: &str) -> bool {
        verifier::verify_token(&self.keys, token, trial_id, &self.config.product_id).await
    }

    /// POST a JSON body to a callback URL with the bearer token attached.
    pub(crate) async fn post_callback<T: Serialize + ?Sized>(
        &self,
        url: &str,
        token: &str,
        body: &T,
    ) -> Result<(), TestBoxError> {
        self.client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
