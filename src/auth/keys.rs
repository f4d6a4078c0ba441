// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TestBox

//! Verification key resolution.
//!
//! Three sources are supported (see [`KeySource`]):
//!
//! - **JWKS**: the key set document is re-fetched on demand and cached with a
//!   TTL.
//! - **Key map**: a `kid -> PEM` JSON object fetched once from a well-known
//!   path and cached for the remainder of the process lifetime. There is no
//!   TTL by design; rotating keys in this mode requires a process restart.
//! - **Pinned**: an in-memory `kid -> PEM` map, for tests and air-gapped
//!   deployments.
//!
//! Both remote caches are process-wide shared state behind `Arc<RwLock<..>>`.
//! Concurrent first-use fetches are not serialized: the worst case is a
//! duplicate fetch with last-write-wins, which is benign because the fetched
//! material is idempotent per key id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, EllipticCurve, Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey};
use tokio::sync::RwLock;

use super::error::AuthError;
use crate::config::KeySource;

/// JWKS cache TTL (5 minutes).
const JWKS_CACHE_TTL: Duration = Duration::from_secs(300);

struct JwksCacheEntry {
    jwks: JwkSet,
    fetched_at: Instant,
}

enum Source {
    Jwks {
        url: String,
        cache: RwLock<Option<JwksCacheEntry>>,
    },
    KeyMap {
        url: String,
        cache: RwLock<Option<HashMap<String, String>>>,
    },
    Pinned(HashMap<String, String>),
}

/// Resolves a token's `kid` to a verification key.
#[derive(Clone)]
pub struct KeyProvider {
    source: Arc<Source>,
    client: reqwest::Client,
}

impl KeyProvider {
    /// Build a provider for the configured key source, sharing the SDK's
    /// HTTP client.
    pub(crate) fn new(source: &KeySource, client: reqwest::Client) -> Self {
        let source = match source {
            KeySource::Jwks { url } => Source::Jwks {
                url: url.clone(),
                cache: RwLock::new(None),
            },
            KeySource::KeyMap { url } => Source::KeyMap {
                url: url.clone(),
                cache: RwLock::new(None),
            },
            KeySource::Pinned(keys) => Source::Pinned(keys.clone()),
        };
        Self {
            source: Arc::new(source),
            client,
        }
    }

    /// Resolve a key id to a decoding key and its verification algorithm.
    pub async fn resolve(&self, kid: &str) -> Result<(DecodingKey, Algorithm), AuthError> {
        match &*self.source {
            Source::Jwks { url, cache } => {
                let jwks = self.get_jwks(url, cache).await?;
                let jwk = jwks
                    .keys
                    .iter()
                    .find(|k| k.common.key_id.as_deref() == Some(kid))
                    .ok_or(AuthError::NoMatchingKey)?;
                jwk_to_decoding_key(jwk)
            }
            Source::KeyMap { url, cache } => {
                let pem = self.get_mapped_pem(url, cache, kid).await?;
                decoding_key_from_pem(&pem)
            }
            Source::Pinned(keys) => {
                let pem = keys.get(kid).ok_or(AuthError::NoMatchingKey)?;
                decoding_key_from_pem(pem)
            }
        }
    }

    /// Fetch the JWKS document, re-using the cache while it is fresh.
    async fn get_jwks(
        &self,
        url: &str,
        cache: &RwLock<Option<JwksCacheEntry>>,
    ) -> Result<JwkSet, AuthError> {
        {
            let cache = cache.read().await;
            if let Some(entry) = &*cache {
                if entry.fetched_at.elapsed() < JWKS_CACHE_TTL {
                    return Ok(entry.jwks.clone());
                }
            }
        }

        let jwks: JwkSet = self.fetch_json(url).await?;

        {
            let mut cache = cache.write().await;
            *cache = Some(JwksCacheEntry {
                jwks: jwks.clone(),
                fetched_at: Instant::now(),
            });
        }

        Ok(jwks)
    }

    /// Look up a PEM in the key map, fetching the map on first use.
    async fn get_mapped_pem(
        &self,
        url: &str,
        cache: &RwLock<Option<HashMap<String, String>>>,
        kid: &str,
    ) -> Result<String, AuthError> {
        {
            let cache = cache.read().await;
            if let Some(map) = &*cache {
                return map.get(kid).cloned().ok_or(AuthError::NoMatchingKey);
            }
        }

        let map: HashMap<String, String> = self.fetch_json(url).await?;
        let pem = map.get(kid).cloned();

        {
            let mut cache = cache.write().await;
            *cache = Some(map);
        }

        pem.ok_or(AuthError::NoMatchingKey)
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, AuthError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::warn!(error = %e, "key material fetch failed");
            AuthError::KeyFetch(e.to_string())
        })?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "key endpoint returned an error status");
            return Err(AuthError::KeyFetch(format!(
                "HTTP {} from key endpoint",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))
    }
}

/// Convert a JWK to a decoding key and algorithm.
pub(crate) fn jwk_to_decoding_key(jwk: &Jwk) -> Result<(DecodingKey, Algorithm), AuthError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => {
            let key = DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
                .map_err(|e| AuthError::InvalidKey(e.to_string()))?;
            let alg = jwk
                .common
                .key_algorithm
                .map(|a| match a {
                    KeyAlgorithm::RS256 => Algorithm::RS256,
                    KeyAlgorithm::RS384 => Algorithm::RS384,
                    KeyAlgorithm::RS512 => Algorithm::RS512,
                    _ => Algorithm::RS256,
                })
                .unwrap_or(Algorithm::RS256);
            Ok((key, alg))
        }
        AlgorithmParameters::EllipticCurve(ec) => {
            let key = DecodingKey::from_ec_components(&ec.x, &ec.y)
                .map_err(|e| AuthError::InvalidKey(e.to_string()))?;
            let alg = jwk
                .common
                .key_algorithm
                .map(|a| match a {
                    KeyAlgorithm::ES256 => Algorithm::ES256,
                    KeyAlgorithm::ES384 => Algorithm::ES384,
                    _ => Algorithm::ES256,
                })
                .unwrap_or(Algorithm::ES256);
            Ok((key, alg))
        }
        AlgorithmParameters::OctetKeyPair(okp) => {
            if okp.curve != EllipticCurve::Ed25519 {
                return Err(AuthError::InvalidKey(
                    "unsupported OKP curve in key set".to_string(),
                ));
            }
            let key = DecodingKey::from_ed_components(&okp.x)
                .map_err(|e| AuthError::InvalidKey(e.to_string()))?;
            Ok((key, Algorithm::EdDSA))
        }
        _ => Err(AuthError::InvalidKey(
            "unsupported key type in key set".to_string(),
        )),
    }
}

/// Turn a PEM-encoded public key into a decoding key, inferring the
/// verification algorithm from the key family.
pub(crate) fn decoding_key_from_pem(pem: &str) -> Result<(DecodingKey, Algorithm), AuthError> {
    let bytes = pem.as_bytes();
    if let Ok(key) = DecodingKey::from_rsa_pem(bytes) {
        return Ok((key, Algorithm::RS256));
    }
    if let Ok(key) = DecodingKey::from_ec_pem(bytes) {
        return Ok((key, Algorithm::ES256));
    }
    if let Ok(key) = DecodingKey::from_ed_pem(bytes) {
        return Ok((key, Algorithm::EdDSA));
    }
    Err(AuthError::InvalidKey(
        "PEM is not an RSA, EC, or Ed25519 public key".to_string(),
    ))
}
