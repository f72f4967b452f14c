// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Secret generation endpoint.

use axum::Json;

use crate::crypto::generate_secret;

/// Issue a fresh random secret.
///
/// 32 random bytes, base64url encoded. Nothing is stored; the secret only
/// becomes meaningful once a client sends it as its `Authorization` header.
#[utoipa::path(
    get,
    path = "/new-key",
    tag = "Keys",
    responses(
        (status = 200, description = "A new base64url secret", body = String),
    )
)]
pub async fn new_key() -> Json<String> {
    Json(generate_secret())
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE, Engine};

    #[tokio::test]
    async fn new_key_is_32_random_bytes() {
        let Json(first) = new_key().await;
        let Json(second) = new_key().await;
        assert_ne!(first, second);
        assert_eq!(URL_SAFE.decode(&first).unwrap().len(), 32);
    }
}
