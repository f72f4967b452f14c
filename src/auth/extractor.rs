// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the presented secret.
//!
//! Use the `Credential` extractor in handlers to require a secret:
//!
//! ```rust,ignore
//! async fn my_handler(Credential(keys): Credential) -> impl IntoResponse {
//!     // keys is KeyMaterial: partition hash + cipher key
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::CredentialError;
use crate::crypto::KeyMaterial;
use crate::state::AppState;

/// Key material derived from the request's `Authorization` header.
///
/// The entire header value is the secret; no scheme prefix is stripped.
/// Derivation follows the state's configured [`crate::crypto::KeyDerivation`].
pub struct Credential(pub KeyMaterial);

impl FromRequestParts<AppState> for Credential {
    type Rejection = CredentialError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let secret = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(CredentialError::MissingCredential)?
            .to_str()
            .map_err(|_| CredentialError::InvalidCredential)?;

        if secret.is_empty() {
            return Err(CredentialError::MissingCredential);
        }

        let keys = KeyMaterial::from_secret(secret, state.key_derivation);
        tracing::debug!(partition = %keys.partition_hash(), "Credential accepted");

        Ok(Credential(keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{hash_secret, KeyDerivation};
    use axum::http::{HeaderValue, Request};

    fn parts_with(header: Option<HeaderValue>) -> Parts {
        let mut builder = Request::builder().uri("/get-tags");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn requires_authorization_header() {
        let state = AppState::in_memory().unwrap();
        let mut parts = parts_with(None);

        let result = Credential::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(CredentialError::MissingCredential)));
    }

    #[tokio::test]
    async fn empty_header_counts_as_missing() {
        let state = AppState::in_memory().unwrap();
        let mut parts = parts_with(Some(HeaderValue::from_static("")));

        let result = Credential::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(CredentialError::MissingCredential)));
    }

    #[tokio::test]
    async fn opaque_bytes_are_rejected() {
        let state = AppState::in_memory().unwrap();
        let value = HeaderValue::from_bytes(&[0xC3, 0x28]).unwrap();
        let mut parts = parts_with(Some(value));

        let result = Credential::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(CredentialError::InvalidCredential)));
    }

    #[tokio::test]
    async fn whole_header_value_is_the_secret() {
        let state = AppState::in_memory()
            .unwrap()
            .with_key_derivation(KeyDerivation::Raw);
        let mut parts = parts_with(Some(HeaderValue::from_static("Bearer 0123456789")));

        let Credential(keys) = Credential::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(keys.partition_hash(), &hash_secret("Bearer 0123456789"));
        assert_eq!(keys.cipher_key().as_bytes(), b"Bearer 0123456789");
    }
}
