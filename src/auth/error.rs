// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TestBox

//! Internal authentication errors.
//!
//! These never cross the SDK boundary: the verifier collapses all of them to
//! a boolean `false` so callers (and attackers) get no signal about why a
//! token was rejected. They exist so the collapse happens at one explicit
//! catch point, with the detail preserved for debug logging.

use thiserror::Error;

/// Reasons token verification can fail internally.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token could not be decoded at all.
    #[error("token is malformed")]
    MalformedToken,
    /// The token header carries no `kid`.
    #[error("token header has no key id")]
    MissingKeyId,
    /// The key document could not be fetched.
    #[error("failed to fetch key material: {0}")]
    KeyFetch(String),
    /// No key matching the token's `kid` exists.
    #[error("no key matches the token's key id")]
    NoMatchingKey,
    /// Key material was present but could not be turned into a decoding key.
    #[error("invalid key material: {0}")]
    InvalidKey(String),
    /// Signature, expiry, or audience validation failed.
    #[error("token validation failed: {0}")]
    TokenInvalid(#[from] jsonwebtoken::errors::Error),
}
