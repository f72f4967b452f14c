// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Credential extraction error type.
#[derive(Debug, PartialEq, Eq)]
pub enum CredentialError {
    /// No authorization header present, or present but empty
    MissingCredential,
    /// Header value is not visible ASCII / UTF-8
    InvalidCredential,
}

#[derive(Serialize)]
struct CredentialErrorBody {
    error: String,
    error_code: String,
}

impl CredentialError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            CredentialError::MissingCredential => "missing_credential",
            CredentialError::InvalidCredential => "invalid_credential",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl std::fmt::Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialError::MissingCredential => write!(f, "Missing Authorization header"),
            CredentialError::InvalidCredential => {
                write!(f, "Authorization header is not valid text")
            }
        }
    }
}

impl std::error::Error for CredentialError {}

impl IntoResponse for CredentialError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(CredentialErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
