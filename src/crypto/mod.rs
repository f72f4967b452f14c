// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Credential Cryptography
//!
//! The authorization secret a client presents does two jobs:
//!
//! - its SHA-256 digest becomes the **partition hash**, the only thing the
//!   storage layer ever sees of the credential
//! - its bytes (optionally run through HKDF) become the **cipher key** used
//!   to encrypt every stored tag and target value
//!
//! ## Envelope Format
//!
//! ```text
//! base64url( nonce || ciphertext )
//!
//! cfb: nonce = 16 bytes (AES block size), |ciphertext| == |plaintext|
//! gcm: nonce = 12 bytes, ciphertext carries a trailing 16-byte tag
//! ```
//!
//! ## Hazards
//!
//! - CFB carries no integrity tag. Opening an envelope with the wrong key
//!   returns garbage instead of an error. Use [`CipherMode::Gcm`] to fail
//!   closed.
//! - Random nonces make equal plaintexts encrypt differently, which breaks
//!   exact-match lookups. [`NonceMode::Synthetic`] derives the nonce from an
//!   HMAC of the plaintext so lookup fields encrypt identically every time.

pub mod codec;
pub mod key_material;

pub use codec::{
    decrypt, encrypt, encrypt_synthetic, CipherMode, EnvelopeCodec, NonceMode, CFB_NONCE_LEN,
    GCM_NONCE_LEN,
};
pub use key_material::{
    generate_secret, hash_secret, CipherKey, KeyDerivation, KeyMaterial, PartitionHash,
};

/// Errors raised by key handling and envelope encryption.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Key length is not one AES accepts (16, 24 or 32 bytes).
    #[error("cipher key must be 16, 24 or 32 bytes, got {len}")]
    CipherInit { len: usize },

    /// Envelope is not valid base64url or is shorter than its nonce.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Authenticated envelope failed verification (tampered or wrong key).
    #[error("envelope failed integrity check")]
    Integrity,
}

pub type CryptoResult<T> = Result<T, CryptoError>;
