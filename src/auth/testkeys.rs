// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TestBox

//! Ed25519 signing material for tests.
//!
//! Mirrors how TestBox issues tokens in production: an EdDSA keypair whose
//! public half is served either as a JWKS OKP entry or as a PEM in the
//! key-map document. The integration suite includes this file directly via
//! `#[path]` so both test layers share one copy.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use ed25519_dalek::SigningKey;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rand::rngs::OsRng;
use serde_json::{json, Value};

/// ASN.1 PKCS#8 v1 prefix for an Ed25519 private key (32-byte seed).
const ED25519_PKCS8_PREFIX: [u8; 16] = [
    0x30, 0x2e, // SEQUENCE, 46 bytes
    0x02, 0x01, 0x00, // INTEGER version 0
    0x30, 0x05, // SEQUENCE, 5 bytes (algorithm identifier)
    0x06, 0x03, 0x2b, 0x65, 0x70, // OID 1.3.101.112 (Ed25519)
    0x04, 0x22, // OCTET STRING, 34 bytes
    0x04, 0x20, // OCTET STRING, 32 bytes (the seed)
];

/// ASN.1 SPKI prefix for an Ed25519 public key.
const ED25519_SPKI_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];

pub(crate) struct TestKeypair {
    pub pkcs8: Vec<u8>,
    pub public: Vec<u8>,
    pub public_pem: String,
}

pub(crate) fn generate() -> TestKeypair {
    let signing_key = SigningKey::generate(&mut OsRng);
    let public = signing_key.verifying_key().to_bytes().to_vec();

    let mut pkcs8 = ED25519_PKCS8_PREFIX.to_vec();
    pkcs8.extend_from_slice(&signing_key.to_bytes());

    let mut spki = ED25519_SPKI_PREFIX.to_vec();
    spki.extend_from_slice(&public);
    let body = STANDARD.encode(&spki);
    let mut public_pem = String::from("-----BEGIN PUBLIC KEY-----\n");
    for chunk in body.as_bytes().chunks(64) {
        public_pem.push_str(std::str::from_utf8(chunk).unwrap());
        public_pem.push('\n');
    }
    public_pem.push_str("-----END PUBLIC KEY-----\n");

    TestKeypair {
        pkcs8,
        public,
        public_pem,
    }
}

/// Sign `claims` with the given private key, optionally stamping a `kid`.
pub(crate) fn sign(pkcs8: &[u8], kid: Option<&str>, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::EdDSA);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_ed_der(pkcs8);
    encode(&header, claims, &key).expect("token signing")
}

/// A claim set bound to a trial and audience, expiring an hour from now.
pub(crate) fn claims(trial_id: &str, audience: &str) -> Value {
    json!({
        "aud": audience,
        "trial_id": trial_id,
        "exp": chrono::Utc::now().timestamp() + 3600,
    })
}

/// A JWKS document exposing the keypair as an OKP entry under `kid`.
pub(crate) fn jwks_document(kid: &str, keypair: &TestKeypair) -> Value {
    json!({
        "keys": [{
            "kty": "OKP",
            "crv": "Ed25519",
            "x": URL_SAFE_NO_PAD.encode(&keypair.public),
            "kid": kid,
            "alg": "EdDSA",
        }]
    })
}
