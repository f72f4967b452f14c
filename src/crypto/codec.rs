// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Envelope encryption for stored tag and target values.
//!
//! `encrypt` / `decrypt` are the confidentiality-only AES-CFB primitives.
//! [`EnvelopeCodec`] picks between CFB and AES-GCM and between random and
//! synthetic (plaintext-derived) nonces.

use aes::{Aes128, Aes192, Aes256};
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm, Nonce};
use base64ct::{Base64Url, Encoding};
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use super::{CipherKey, CryptoError, CryptoResult};

/// CFB IV width: one AES block.
pub const CFB_NONCE_LEN: usize = 16;

/// AES-GCM nonce width.
pub const GCM_NONCE_LEN: usize = 12;

/// Domain separator for plaintext-derived nonces.
const SYNTHETIC_NONCE_DOMAIN: &[u8] = b"keyed-tags-synthetic-nonce-v1";

type Aes192Gcm = AesGcm<Aes192, U12>;
type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Modes
// =============================================================================

/// Symmetric transform applied to envelope payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CipherMode {
    /// AES-CFB, no integrity tag. Readable by the legacy envelope format.
    #[default]
    Cfb,
    /// AES-GCM, fails closed on tamper or wrong key.
    Gcm,
}

impl CipherMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cfb" => Some(Self::Cfb),
            "gcm" => Some(Self::Gcm),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cfb => "cfb",
            Self::Gcm => "gcm",
        }
    }

    pub fn nonce_len(&self) -> usize {
        match self {
            Self::Cfb => CFB_NONCE_LEN,
            Self::Gcm => GCM_NONCE_LEN,
        }
    }
}

/// Where envelope nonces come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NonceMode {
    /// Fresh random nonce per call. Equal plaintexts never share an envelope.
    Random,
    /// Nonce = HMAC-SHA256(key, plaintext). Equal plaintexts share an
    /// envelope under the same key, which keeps exact-match lookups working.
    #[default]
    Synthetic,
}

impl NonceMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "random" => Some(Self::Random),
            "synthetic" => Some(Self::Synthetic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Synthetic => "synthetic",
        }
    }
}

// =============================================================================
// EnvelopeCodec
// =============================================================================

/// Cipher and nonce policy used by the request handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvelopeCodec {
    pub cipher: CipherMode,
    pub nonce: NonceMode,
}

impl EnvelopeCodec {
    pub fn new(cipher: CipherMode, nonce: NonceMode) -> Self {
        Self { cipher, nonce }
    }

    /// Encrypt one field into an envelope.
    pub fn seal(&self, plaintext: &[u8], key: &CipherKey) -> CryptoResult<String> {
        let key = key.as_bytes();
        check_key_len(key)?;

        let mut nonce = vec![0u8; self.cipher.nonce_len()];
        match self.nonce {
            NonceMode::Random => rand::rng().fill_bytes(&mut nonce),
            NonceMode::Synthetic => synthetic_nonce(key, plaintext, &mut nonce)?,
        }

        let body = match self.cipher {
            CipherMode::Cfb => {
                let mut buf = plaintext.to_vec();
                cfb_encrypt(key, &nonce, &mut buf)?;
                buf
            }
            CipherMode::Gcm => gcm_seal(key, &nonce, plaintext)?,
        };

        Ok(frame(&nonce, &body))
    }

    /// Decrypt one envelope back to plaintext bytes.
    pub fn open(&self, envelope: &str, key: &CipherKey) -> CryptoResult<Vec<u8>> {
        match self.cipher {
            CipherMode::Cfb => decrypt(envelope, key.as_bytes()),
            CipherMode::Gcm => {
                let key = key.as_bytes();
                check_key_len(key)?;
                let raw = unframe(envelope, GCM_NONCE_LEN)?;
                let (nonce, body) = raw.split_at(GCM_NONCE_LEN);
                gcm_open(key, nonce, body)
            }
        }
    }

    /// Decrypt an envelope that must hold UTF-8 text.
    pub fn open_text(&self, envelope: &str, key: &CipherKey) -> CryptoResult<String> {
        let bytes = self.open(envelope, key)?;
        String::from_utf8(bytes)
            .map_err(|_| CryptoError::MalformedEnvelope("plaintext is not valid UTF-8".into()))
    }
}

// =============================================================================
// CFB primitives
// =============================================================================

/// Encrypt with AES-CFB under a fresh random IV.
///
/// Fails with [`CryptoError::CipherInit`] unless `key` is 16, 24 or 32 bytes.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> CryptoResult<String> {
    check_key_len(key)?;

    let mut iv = [0u8; CFB_NONCE_LEN];
    rand::rng().fill_bytes(&mut iv);

    let mut buf = plaintext.to_vec();
    cfb_encrypt(key, &iv, &mut buf)?;
    Ok(frame(&iv, &buf))
}

/// Encrypt with AES-CFB under an IV derived from `HMAC(key, plaintext)`.
///
/// Same key and plaintext always produce the same envelope.
pub fn encrypt_synthetic(plaintext: &[u8], key: &[u8]) -> CryptoResult<String> {
    check_key_len(key)?;

    let mut iv = [0u8; CFB_NONCE_LEN];
    synthetic_nonce(key, plaintext, &mut iv)?;

    let mut buf = plaintext.to_vec();
    cfb_encrypt(key, &iv, &mut buf)?;
    Ok(frame(&iv, &buf))
}

/// Decrypt an AES-CFB envelope.
///
/// No integrity check: a foreign key or corrupted body yields garbage bytes.
pub fn decrypt(envelope: &str, key: &[u8]) -> CryptoResult<Vec<u8>> {
    check_key_len(key)?;

    let mut raw = unframe(envelope, CFB_NONCE_LEN)?;
    let mut body = raw.split_off(CFB_NONCE_LEN);
    cfb_decrypt(key, &raw, &mut body)?;
    Ok(body)
}

fn cfb_encrypt(key: &[u8], iv: &[u8], buf: &mut [u8]) -> CryptoResult<()> {
    let init = |_| CryptoError::CipherInit { len: key.len() };
    match key.len() {
        16 => cfb_mode::Encryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(init)?
            .encrypt(buf),
        24 => cfb_mode::Encryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(init)?
            .encrypt(buf),
        32 => cfb_mode::Encryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(init)?
            .encrypt(buf),
        len => return Err(CryptoError::CipherInit { len }),
    }
    Ok(())
}

fn cfb_decrypt(key: &[u8], iv: &[u8], buf: &mut [u8]) -> CryptoResult<()> {
    let init = |_| CryptoError::CipherInit { len: key.len() };
    match key.len() {
        16 => cfb_mode::Decryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(init)?
            .decrypt(buf),
        24 => cfb_mode::Decryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(init)?
            .decrypt(buf),
        32 => cfb_mode::Decryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(init)?
            .decrypt(buf),
        len => return Err(CryptoError::CipherInit { len }),
    }
    Ok(())
}

// =============================================================================
// GCM primitives
// =============================================================================

fn gcm_seal(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let nonce = Nonce::<U12>::from_slice(nonce);
    let init = |_| CryptoError::CipherInit { len: key.len() };
    let sealed = match key.len() {
        16 => Aes128Gcm::new_from_slice(key).map_err(init)?.encrypt(nonce, plaintext),
        24 => Aes192Gcm::new_from_slice(key).map_err(init)?.encrypt(nonce, plaintext),
        32 => Aes256Gcm::new_from_slice(key).map_err(init)?.encrypt(nonce, plaintext),
        len => return Err(CryptoError::CipherInit { len }),
    };
    sealed.map_err(|_| CryptoError::MalformedEnvelope("plaintext too large for AES-GCM".into()))
}

fn gcm_open(key: &[u8], nonce: &[u8], body: &[u8]) -> CryptoResult<Vec<u8>> {
    let nonce = Nonce::<U12>::from_slice(nonce);
    let init = |_| CryptoError::CipherInit { len: key.len() };
    let opened = match key.len() {
        16 => Aes128Gcm::new_from_slice(key).map_err(init)?.decrypt(nonce, body),
        24 => Aes192Gcm::new_from_slice(key).map_err(init)?.decrypt(nonce, body),
        32 => Aes256Gcm::new_from_slice(key).map_err(init)?.decrypt(nonce, body),
        len => return Err(CryptoError::CipherInit { len }),
    };
    opened.map_err(|_| CryptoError::Integrity)
}

// =============================================================================
// Helpers
// =============================================================================

fn check_key_len(key: &[u8]) -> CryptoResult<()> {
    match key.len() {
        16 | 24 | 32 => Ok(()),
        len => Err(CryptoError::CipherInit { len }),
    }
}

fn synthetic_nonce(key: &[u8], plaintext: &[u8], out: &mut [u8]) -> CryptoResult<()> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
        .map_err(|_| CryptoError::CipherInit { len: key.len() })?;
    mac.update(SYNTHETIC_NONCE_DOMAIN);
    mac.update(plaintext);
    let tag = mac.finalize().into_bytes();
    out.copy_from_slice(&tag[..out.len()]);
    Ok(())
}

fn frame(nonce: &[u8], body: &[u8]) -> String {
    let mut raw = Vec::with_capacity(nonce.len() + body.len());
    raw.extend_from_slice(nonce);
    raw.extend_from_slice(body);
    Base64Url::encode_string(&raw)
}

fn unframe(envelope: &str, nonce_len: usize) -> CryptoResult<Vec<u8>> {
    let raw = Base64Url::decode_vec(envelope)
        .map_err(|e| CryptoError::MalformedEnvelope(format!("invalid base64url: {e}")))?;
    if raw.len() < nonce_len {
        return Err(CryptoError::MalformedEnvelope(format!(
            "envelope is {} bytes, shorter than the {nonce_len}-byte nonce",
            raw.len()
        )));
    }
    Ok(raw)
}
