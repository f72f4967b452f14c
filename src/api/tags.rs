// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tag endpoints.
//!
//! Targets and tags are encrypted before they reach storage and decrypted on
//! the way back out. Every call is scoped to the caller's partition.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};

use super::fields::{lookup_envelope, open_all, required, with_store};
use crate::{
    auth::Credential,
    error::ApiError,
    models::{AddTagRequest, AddTagResponse, TagQuery, TagsResponse, TargetQuery, TargetsResponse},
    state::AppState,
};

/// Attach a tag to a target.
///
/// Both values are sealed under the caller's key. Recording the same pair
/// twice is a conflict when nonces are synthetic; with random nonces every
/// call stores a new pair of envelopes.
#[utoipa::path(
    post,
    path = "/add-tag",
    request_body = AddTagRequest,
    tag = "Tags",
    security(("credential" = [])),
    responses(
        (status = 200, description = "Tag recorded", body = AddTagResponse),
        (status = 400, description = "Missing target or tag"),
        (status = 401, description = "Missing Authorization header"),
        (status = 409, description = "Tag already recorded for this target"),
    )
)]
pub async fn add_tag(
    State(state): State<AppState>,
    Credential(keys): Credential,
    payload: Result<Json<AddTagRequest>, JsonRejection>,
) -> Result<Json<AddTagResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::invalid_input(format!("Invalid JSON: {}", e.body_text())))?;
    let target = required(request.target, "target")?;
    let tag = required(request.tag, "tag")?;

    let target_envelope = state.codec.seal(target.as_bytes(), keys.cipher_key())?;
    let tag_envelope = state.codec.seal(tag.as_bytes(), keys.cipher_key())?;

    let partition = keys.partition_hash().to_string();
    let (stored_target, stored_tag) = (target_envelope.clone(), tag_envelope.clone());
    with_store(&state, move |store| {
        store.insert_tag(&partition, &stored_target, &stored_tag)
    })
    .await?;

    tracing::info!(partition = %keys.partition_hash(), "Tag added");

    Ok(Json(AddTagResponse {
        target: target_envelope,
        tag: tag_envelope,
    }))
}

/// List the tags attached to a target.
#[utoipa::path(
    get,
    path = "/get-tags",
    params(TargetQuery),
    tag = "Tags",
    security(("credential" = [])),
    responses(
        (status = 200, description = "Decrypted tags, empty if none", body = TagsResponse),
        (status = 400, description = "Missing target"),
        (status = 401, description = "Missing Authorization header"),
        (status = 500, description = "A stored tag failed to decrypt"),
    )
)]
pub async fn get_tags(
    State(state): State<AppState>,
    Credential(keys): Credential,
    Query(params): Query<TargetQuery>,
) -> Result<Json<TagsResponse>, ApiError> {
    let target = required(params.target, "target")?;
    let target_envelope = lookup_envelope(&state, &keys, "target", target)?;

    let partition = keys.partition_hash().to_string();
    let envelopes =
        with_store(&state, move |store| store.list_tags(&partition, &target_envelope)).await?;

    let tags = open_all(&state, &keys, "tag", envelopes)?;
    Ok(Json(TagsResponse { tags }))
}

/// List the targets carrying a tag.
#[utoipa::path(
    get,
    path = "/get-targets",
    params(TagQuery),
    tag = "Tags",
    security(("credential" = [])),
    responses(
        (status = 200, description = "Decrypted targets, empty if none", body = TargetsResponse),
        (status = 400, description = "Missing tag"),
        (status = 401, description = "Missing Authorization header"),
        (status = 500, description = "A stored target failed to decrypt"),
    )
)]
pub async fn get_targets(
    State(state): State<AppState>,
    Credential(keys): Credential,
    Query(params): Query<TagQuery>,
) -> Result<Json<TargetsResponse>, ApiError> {
    let tag = required(params.tag, "tag")?;
    let tag_envelope = lookup_envelope(&state, &keys, "tag", tag)?;

    let partition = keys.partition_hash().to_string();
    let envelopes =
        with_store(&state, move |store| store.list_targets(&partition, &tag_envelope)).await?;

    let targets = open_all(&state, &keys, "target", envelopes)?;
    Ok(Json(TargetsResponse { targets }))
}
