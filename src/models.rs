// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. All types derive
//! `ToSchema` for OpenAPI documentation.
//!
//! Values named `target` or `tag` are plaintext on the way in and on the way
//! out of read endpoints. The only place envelopes surface is
//! [`AddTagResponse`], which reports what was stored.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// =============================================================================
// Requests
// =============================================================================

/// Body of `POST /add-tag`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AddTagRequest {
    /// Thing being tagged (file name, URL, ...).
    pub target: Option<String>,
    /// Label attached to the target.
    pub tag: Option<String>,
}

/// Body of `POST /like-target`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LikeTargetRequest {
    /// Target to like. Plaintext with synthetic nonces, otherwise an
    /// envelope returned by `/add-tag`.
    pub target: Option<String>,
}

/// `?target=` query parameter.
#[derive(Debug, Deserialize, IntoParams)]
pub struct TargetQuery {
    /// Target to look up.
    pub target: Option<String>,
}

/// `?tag=` query parameter.
#[derive(Debug, Deserialize, IntoParams)]
pub struct TagQuery {
    /// Tag to look up.
    pub tag: Option<String>,
}

// =============================================================================
// Responses
// =============================================================================

/// Envelopes written by `POST /add-tag`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AddTagResponse {
    /// Stored target envelope.
    pub target: String,
    /// Stored tag envelope.
    pub tag: String,
}

/// Decrypted tags of one target.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}

/// Decrypted targets carrying one tag.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TargetsResponse {
    pub targets: Vec<String>,
}

/// Like counter of one target.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LikeCountResponse {
    pub like_count: u64,
}
