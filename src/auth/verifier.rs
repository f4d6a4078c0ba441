// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TestBox

//! Bearer token verification.
//!
//! The verifier is fail-closed: every failure mode (malformed token, missing
//! or unresolvable key id, bad signature, expired token, wrong audience,
//! mismatched trial id) collapses to `false` at a single catch boundary in
//! [`verify_token`]. No error ever propagates to the caller, so a forger gets
//! no oracle for *why* a token was rejected. The detail is preserved in a
//! `debug` log line only.

use jsonwebtoken::{decode, decode_header, Validation};
use serde::Deserialize;

use super::{error::AuthError, keys::KeyProvider};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// The claims this SDK inspects beyond what the JWT library validates.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    /// Audience. Kept as a plain string: an array-valued `aud` fails
    /// deserialization, which is intended. Only exact scalar equality
    /// authenticates.
    #[serde(default)]
    aud: Option<String>,
    /// The trial this token was issued for.
    #[serde(default)]
    trial_id: Option<String>,
}

/// Verify a bearer token against the expected trial id and audience.
///
/// Returns `true` only when all of the following hold:
///
/// 1. the token header carries a `kid` that resolves to a known key,
/// 2. the signature verifies under that key and the token is unexpired,
/// 3. the `aud` claim equals `audience` exactly,
/// 4. the `trial_id` claim equals `expected_trial_id` exactly.
///
/// Check 4 binds "this token was issued for this exact trial": a validly
/// signed token from one trial cannot be replayed against another trial's
/// webhook.
pub(crate) async fn verify_token(
    keys: &KeyProvider,
    token: &str,
    expected_trial_id: &str,
    audience: &str,
) -> bool {
    // The single catch boundary for the fail-closed contract.
    match verify_inner(keys, token, expected_trial_id, audience).await {
        Ok(bound) => bound,
        Err(e) => {
            tracing::debug!(error = %e, "token verification failed");
            false
        }
    }
}

async fn verify_inner(
    keys: &KeyProvider,
    token: &str,
    expected_trial_id: &str,
    audience: &str,
) -> Result<bool, AuthError> {
    let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
    let kid = header.kid.ok_or(AuthError::MissingKeyId)?;

    let (decoding_key, algorithm) = keys.resolve(&kid).await?;

    let mut validation = Validation::new(algorithm);
    validation.leeway = CLOCK_SKEW_LEEWAY;
    // Audience is compared below by exact string equality; the library's
    // subset matching over array-valued `aud` claims is too permissive.
    validation.validate_aud = false;

    let token_data = decode::<TokenClaims>(token, &decoding_key, &validation)?;

    if token_data.claims.aud.as_deref() != Some(audience) {
        return Ok(false);
    }
    Ok(token_data.claims.trial_id.as_deref() == Some(expected_trial_id))
}
