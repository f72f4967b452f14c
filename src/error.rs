// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::crypto::CryptoError;
use crate::storage::StoreError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    error_code: &'static str,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_input", message)
    }

    pub fn unsupported_method() -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "unsupported_method",
            "Invalid method",
        )
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", "No such endpoint")
    }

    /// A stored or presented envelope could not be turned back into text.
    pub fn decryption(field: &str, err: CryptoError) -> Self {
        match err {
            CryptoError::CipherInit { .. } => err.into(),
            other => {
                tracing::warn!(field, error = %other, "Envelope decryption failed");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "decryption_failed",
                    format!("Failed to decrypt {field}"),
                )
            }
        }
    }
}

impl From<CryptoError> for ApiError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::CipherInit { len } => {
                tracing::warn!(key_len = len, "Rejected cipher key length");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "cipher_init",
                    format!(
                        "Authorization key yields a {len}-byte cipher key; 16, 24 or 32 bytes are required"
                    ),
                )
            }
            other => Self::decryption("value", other),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_conflict() {
            return Self::new(StatusCode::CONFLICT, "conflict", err.to_string());
        }
        tracing::error!(error = %err, "Storage operation failed");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "storage_error",
            "Database error",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.code,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_code() {
        let bad = ApiError::invalid_input("Missing target");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.code, "invalid_input");
        assert_eq!(bad.message, "Missing target");

        let method = ApiError::unsupported_method();
        assert_eq!(method.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(method.code, "unsupported_method");
    }

    #[test]
    fn crypto_errors_map_to_codes() {
        let init: ApiError = CryptoError::CipherInit { len: 6 }.into();
        assert_eq!(init.code, "cipher_init");
        assert!(init.message.contains("6-byte"));

        let malformed = ApiError::decryption("tag", CryptoError::MalformedEnvelope("x".into()));
        assert_eq!(malformed.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(malformed.code, "decryption_failed");
        assert_eq!(malformed.message, "Failed to decrypt tag");

        let integrity = ApiError::decryption("target", CryptoError::Integrity);
        assert_eq!(integrity.code, "decryption_failed");

        // Key problems stay key problems even on the decrypt path
        let key = ApiError::decryption("tag", CryptoError::CipherInit { len: 3 });
        assert_eq!(key.code, "cipher_init");
    }

    #[test]
    fn store_errors_map_to_codes() {
        let conflict: ApiError = StoreError::Conflict.into();
        assert_eq!(conflict.status, StatusCode::CONFLICT);

        let io: ApiError = StoreError::Io(std::io::Error::other("disk gone")).into();
        assert_eq!(io.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(io.code, "storage_error");
        assert!(!io.message.contains("disk gone"));
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::invalid_input("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data","error_code":"invalid_input"}"#);
    }
}
