// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Like counter endpoints.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};

use super::fields::{lookup_envelope, required, with_store};
use crate::{
    auth::Credential,
    error::ApiError,
    models::{LikeCountResponse, LikeTargetRequest, TargetQuery},
    state::AppState,
};

/// Add one like to a target.
///
/// The counter is created at 1 on the first like. Concurrent likes of the
/// same target are all counted.
#[utoipa::path(
    post,
    path = "/like-target",
    request_body = LikeTargetRequest,
    tag = "Likes",
    security(("credential" = [])),
    responses(
        (status = 200, description = "Counter after the increment", body = LikeCountResponse),
        (status = 400, description = "Missing target"),
        (status = 401, description = "Missing Authorization header"),
    )
)]
pub async fn like_target(
    State(state): State<AppState>,
    Credential(keys): Credential,
    payload: Result<Json<LikeTargetRequest>, JsonRejection>,
) -> Result<Json<LikeCountResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::invalid_input(format!("Invalid JSON: {}", e.body_text())))?;
    let target = required(request.target, "target")?;
    let target_envelope = lookup_envelope(&state, &keys, "target", target)?;

    let partition = keys.partition_hash().to_string();
    let like_count =
        with_store(&state, move |store| store.increment_like(&partition, &target_envelope))
            .await?;

    Ok(Json(LikeCountResponse { like_count }))
}

/// Read a target's like counter. Never-liked targets report 0.
#[utoipa::path(
    get,
    path = "/get-likes",
    params(TargetQuery),
    tag = "Likes",
    security(("credential" = [])),
    responses(
        (status = 200, description = "Current counter", body = LikeCountResponse),
        (status = 400, description = "Missing target"),
        (status = 401, description = "Missing Authorization header"),
    )
)]
pub async fn get_likes(
    State(state): State<AppState>,
    Credential(keys): Credential,
    Query(params): Query<TargetQuery>,
) -> Result<Json<LikeCountResponse>, ApiError> {
    let target = required(params.target, "target")?;
    let target_envelope = lookup_envelope(&state, &keys, "target", target)?;

    let partition = keys.partition_hash().to_string();
    let like_count =
        with_store(&state, move |store| store.get_like_count(&partition, &target_envelope))
            .await?;

    Ok(Json(LikeCountResponse { like_count }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{KeyDerivation, KeyMaterial};

    fn keys(secret: &str) -> Credential {
        Credential(KeyMaterial::from_secret(secret, KeyDerivation::Hkdf))
    }

    fn like(target: &str) -> Result<Json<LikeTargetRequest>, JsonRejection> {
        Ok(Json(LikeTargetRequest {
            target: Some(target.into()),
        }))
    }

    fn query(target: &str) -> Query<TargetQuery> {
        Query(TargetQuery {
            target: Some(target.into()),
        })
    }

    #[tokio::test]
    async fn unknown_target_has_zero_likes() {
        let state = AppState::in_memory().unwrap();
        let Json(count) = get_likes(State(state), keys("abc123"), query("nothing"))
            .await
            .unwrap();
        assert_eq!(count.like_count, 0);
    }

    #[tokio::test]
    async fn three_likes_count_three() {
        let state = AppState::in_memory().unwrap();
        for expected in 1..=3 {
            let Json(count) = like_target(State(state.clone()), keys("abc123"), like("cat-photo.png"))
                .await
                .unwrap();
            assert_eq!(count.like_count, expected);
        }

        let Json(count) = get_likes(State(state), keys("abc123"), query("cat-photo.png"))
            .await
            .unwrap();
        assert_eq!(count.like_count, 3);
    }

    #[tokio::test]
    async fn likes_are_per_partition() {
        let state = AppState::in_memory().unwrap();
        like_target(State(state.clone()), keys("alice"), like("shared.png"))
            .await
            .unwrap();

        let Json(count) = get_likes(State(state), keys("bob"), query("shared.png"))
            .await
            .unwrap();
        assert_eq!(count.like_count, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_likes_are_all_counted() {
        let state = AppState::in_memory().unwrap();
        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let state = state.clone();
                tokio::spawn(async move {
                    like_target(State(state), keys("abc123"), like("hot.png"))
                        .await
                        .unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let Json(count) = get_likes(State(state), keys("abc123"), query("hot.png"))
            .await
            .unwrap();
        assert_eq!(count.like_count, 50);
    }

    #[tokio::test]
    async fn missing_target_is_rejected() {
        let state = AppState::in_memory().unwrap();
        let err = like_target(
            State(state),
            keys("abc123"),
            Ok(Json(LikeTargetRequest { target: None })),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, "invalid_input");
    }
}
