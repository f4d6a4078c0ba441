// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TestBox

//! Token authentication.
//!
//! [`KeyProvider`] resolves a token's `kid` header to verification key
//! material; [`verifier`] checks the signature and binds the token to a
//! specific trial and product. All failures collapse to `false` inside the
//! verifier; nothing in this module surfaces errors to SDK callers.

mod error;
mod keys;
pub(crate) mod verifier;

#[cfg(test)]
pub(crate) mod testkeys;

pub use keys::KeyProvider;
