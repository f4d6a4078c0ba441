// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TestBox

//! # SDK Configuration
//!
//! Configuration is built once at startup and injected into the [`TestBox`]
//! handle; there is no process-wide mutable config state.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `TBX_JWKS_URL` | JWKS endpoint for token verification | `https://assets.testbox.com/.well-known/jwks.json` |
//! | `TBX_KEY_DOMAIN` | Domain serving a `kid -> PEM` key map at its well-known path; selects key-map mode | Unset |
//!
//! [`TestBox`]: crate::TestBox

use std::collections::HashMap;
use std::env;

/// Environment variable overriding the JWKS endpoint URL.
pub const JWKS_URL_ENV: &str = "TBX_JWKS_URL";

/// Environment variable selecting key-map mode and naming its domain.
pub const KEY_DOMAIN_ENV: &str = "TBX_KEY_DOMAIN";

/// Default TestBox JWKS endpoint.
pub const DEFAULT_JWKS_URL: &str = "https://assets.testbox.com/.well-known/jwks.json";

/// Well-known path serving the `kid -> PEM` key map in key-map mode.
pub const KEY_MAP_PATH: &str = "/.well-known/testbox-keys.json";

/// Where verification keys come from.
#[derive(Debug, Clone)]
pub enum KeySource {
    /// A remote JWKS document, re-fetched on demand with a cache TTL.
    Jwks {
        /// JWKS endpoint URL.
        url: String,
    },
    /// A JSON object of `kid -> PEM` fetched once from a well-known path and
    /// cached for the process lifetime (no TTL; key rotation requires a
    /// process restart).
    KeyMap {
        /// Full URL of the key-map document.
        url: String,
    },
    /// An in-memory `kid -> PEM` map supplied at configuration time.
    /// Intended for tests and air-gapped deployments.
    Pinned(HashMap<String, String>),
}

/// SDK configuration, constructed once and passed by reference.
#[derive(Debug, Clone)]
pub struct TestBoxConfig {
    /// Product identifier; used as the expected JWT `aud` claim.
    pub product_id: String,
    /// Verification key source.
    pub key_source: KeySource,
}

impl TestBoxConfig {
    /// Create a configuration for the given product.
    ///
    /// Key-source selection honors the environment: `TBX_KEY_DOMAIN` selects
    /// key-map mode, otherwise JWKS mode with `TBX_JWKS_URL` (or the default
    /// endpoint).
    pub fn new(product_id: impl Into<String>) -> Self {
        let key_source = match env::var(KEY_DOMAIN_ENV) {
            Ok(domain) => KeySource::KeyMap {
                url: key_map_url(&domain),
            },
            Err(_) => KeySource::Jwks {
                url: env::var(JWKS_URL_ENV).unwrap_or_else(|_| DEFAULT_JWKS_URL.to_string()),
            },
        };
        Self {
            product_id: product_id.into(),
            key_source,
        }
    }

    /// Use JWKS mode with an explicit endpoint URL.
    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.key_source = KeySource::Jwks { url: url.into() };
        self
    }

    /// Use key-map mode, fetching `kid -> PEM` from the domain's well-known path.
    pub fn with_key_domain(mut self, domain: &str) -> Self {
        self.key_source = KeySource::KeyMap {
            url: key_map_url(domain),
        };
        self
    }

    /// Use key-map mode with an explicit document URL (local development).
    pub fn with_key_map_url(mut self, url: impl Into<String>) -> Self {
        self.key_source = KeySource::KeyMap { url: url.into() };
        self
    }

    /// Use a pinned in-memory `kid -> PEM` map.
    pub fn with_pinned_keys(mut self, keys: HashMap<String, String>) -> Self {
        self.key_source = KeySource::Pinned(keys);
        self
    }
}

fn key_map_url(domain: &str) -> String {
    format!("https://{domain}{KEY_MAP_PATH}")
}
