// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Partition hash and cipher key derivation from a raw secret.

use std::fmt;

use base64ct::{Base64Url, Encoding};
use hkdf::Hkdf;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Salt for HKDF key derivation (domain separation)
const HKDF_SALT: &[u8] = b"keyed-tags-credential-v1";

/// Info string binding derived keys to envelope encryption
const HKDF_INFO: &[u8] = b"keyed-tags-envelope-key";

/// Number of random bytes in a generated secret.
pub const GENERATED_SECRET_LEN: usize = 32;

/// Hex SHA-256 digest of a secret, used only to scope storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartitionHash(String);

impl PartitionHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PartitionHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Bytes handed to the envelope cipher.
///
/// Never printed: `Debug` only reports the length.
#[derive(Clone, PartialEq, Eq)]
pub struct CipherKey(Vec<u8>);

impl CipherKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CipherKey([REDACTED; {}])", self.0.len())
    }
}

/// How the cipher key is obtained from the secret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyDerivation {
    /// Secret bytes are the key. Only 16, 24 or 32 byte secrets can encrypt.
    Raw,
    /// HKDF-SHA256 expands any secret into a 32-byte key.
    #[default]
    Hkdf,
}

impl KeyDerivation {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "raw" => Some(Self::Raw),
            "hkdf" => Some(Self::Hkdf),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Hkdf => "hkdf",
        }
    }
}

/// Everything derived from one presented secret.
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    partition: PartitionHash,
    cipher_key: CipherKey,
}

impl KeyMaterial {
    pub fn from_secret(secret: &str, derivation: KeyDerivation) -> Self {
        let cipher_key = match derivation {
            KeyDerivation::Raw => CipherKey(secret.as_bytes().to_vec()),
            KeyDerivation::Hkdf => CipherKey(derive_hkdf_key(secret.as_bytes()).to_vec()),
        };

        Self {
            partition: hash_secret(secret),
            cipher_key,
        }
    }

    pub fn partition_hash(&self) -> &PartitionHash {
        &self.partition
    }

    pub fn cipher_key(&self) -> &CipherKey {
        &self.cipher_key
    }
}

/// Hex-encoded SHA-256 of the secret bytes.
pub fn hash_secret(secret: &str) -> PartitionHash {
    let digest = Sha256::digest(secret.as_bytes());
    PartitionHash(hex::encode(digest))
}

fn derive_hkdf_key(secret: &[u8]) -> [u8; 32] {
    let hk = Hkdf::<Sha256>::new(Some(HKDF_SALT), secret);
    let mut okm = [0u8; 32];
    // 32 bytes is far below the 255 * HashLen HKDF output limit
    if hk.expand(HKDF_INFO, &mut okm).is_err() {
        unreachable!("HKDF expand rejected a 32-byte output");
    }
    okm
}

/// Fresh high-entropy secret: 32 random bytes, base64url encoded.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; GENERATED_SECRET_LEN];
    rand::rng().fill_bytes(&mut bytes);
    Base64Url::encode_string(&bytes)
}
