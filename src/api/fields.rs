// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Helpers shared by the tag and like handlers.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::{
    crypto::{CryptoError, KeyMaterial, NonceMode},
    error::ApiError,
    state::AppState,
    storage::{PartitionedStore, StoreResult},
};

/// Reject absent or empty request fields.
pub fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ApiError::invalid_input(format!("Missing {field}"))),
    }
}

/// Turn a client-supplied lookup value into the envelope it was stored as.
///
/// With synthetic nonces the plaintext re-encrypts to the stored envelope.
/// With random nonces the client must present the stored envelope itself; it
/// is checked to open under the caller's key before use.
pub fn lookup_envelope(
    state: &AppState,
    keys: &KeyMaterial,
    field: &str,
    value: String,
) -> Result<String, ApiError> {
    match state.codec.nonce {
        NonceMode::Synthetic => Ok(state.codec.seal(value.as_bytes(), keys.cipher_key())?),
        NonceMode::Random => match state.codec.open(&value, keys.cipher_key()) {
            Ok(_) => Ok(value),
            Err(err @ CryptoError::CipherInit { .. }) => Err(err.into()),
            Err(_) => Err(ApiError::invalid_input(format!(
                "{field} must be an envelope returned by /add-tag"
            ))),
        },
    }
}

/// Decrypt every envelope of a listing; one failure fails the request.
pub fn open_all(
    state: &AppState,
    keys: &KeyMaterial,
    field: &str,
    envelopes: Vec<String>,
) -> Result<Vec<String>, ApiError> {
    envelopes
        .iter()
        .map(|envelope| {
            state
                .codec
                .open_text(envelope, keys.cipher_key())
                .map_err(|err| ApiError::decryption(field, err))
        })
        .collect()
}

/// Run a blocking store operation off the async workers.
pub async fn with_store<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&dyn PartitionedStore) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    let joined = tokio::task::spawn_blocking(move || op(store.as_ref())).await;
    match joined {
        Ok(result) => result.map_err(ApiError::from),
        Err(err) => {
            tracing::error!(error = %err, "Storage task did not complete");
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                "Database error",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{CipherMode, EnvelopeCodec, KeyDerivation};

    #[test]
    fn required_rejects_missing_and_empty() {
        assert_eq!(required(Some("x".into()), "target").unwrap(), "x");

        let missing = required(None, "target").unwrap_err();
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
        assert_eq!(missing.message, "Missing target");

        let empty = required(Some(String::new()), "tag").unwrap_err();
        assert_eq!(empty.message, "Missing tag");
    }

    #[test]
    fn synthetic_lookup_matches_seal() {
        let state = AppState::in_memory().unwrap();
        let keys = KeyMaterial::from_secret("abc123", KeyDerivation::Hkdf);
        let stored = state.codec.seal(b"cat-photo.png", keys.cipher_key()).unwrap();
        let lookup = lookup_envelope(&state, &keys, "target", "cat-photo.png".into()).unwrap();
        assert_eq!(lookup, stored);
    }

    #[test]
    fn random_lookup_passes_envelopes_through() {
        let state = AppState::in_memory()
            .unwrap()
            .with_codec(EnvelopeCodec::new(CipherMode::Gcm, NonceMode::Random));
        let keys = KeyMaterial::from_secret("abc123", KeyDerivation::Hkdf);
        let stored = state.codec.seal(b"cat-photo.png", keys.cipher_key()).unwrap();

        let lookup = lookup_envelope(&state, &keys, "target", stored.clone()).unwrap();
        assert_eq!(lookup, stored);

        let err = lookup_envelope(&state, &keys, "target", "cat-photo.png".into()).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn with_store_maps_conflicts() {
        let state = AppState::in_memory().unwrap();
        with_store(&state, |store| store.insert_tag("p", "t", "g"))
            .await
            .unwrap();
        let err = with_store(&state, |store| store.insert_tag("p", "t", "g"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }
}
