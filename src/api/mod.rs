// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ApiError,
    models::{
        AddTagRequest, AddTagResponse, LikeCountResponse, LikeTargetRequest, TagsResponse,
        TargetsResponse,
    },
    state::AppState,
};

pub mod fields;
pub mod health;
pub mod keys;
pub mod likes;
pub mod tags;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/add-tag",
            post(tags::add_tag).fallback(unsupported_method),
        )
        .route(
            "/get-tags",
            get(tags::get_tags).fallback(unsupported_method),
        )
        .route(
            "/get-targets",
            get(tags::get_targets).fallback(unsupported_method),
        )
        .route(
            "/like-target",
            post(likes::like_target).fallback(unsupported_method),
        )
        .route(
            "/get-likes",
            get(likes::get_likes).fallback(unsupported_method),
        )
        .route("/new-key", get(keys::new_key).fallback(unsupported_method))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
}

async fn unsupported_method() -> ApiError {
    ApiError::unsupported_method()
}

async fn not_found() -> ApiError {
    ApiError::not_found()
}

/// Declares the `Authorization` header carrying the raw secret.
struct CredentialScheme;

impl Modify for CredentialScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "credential",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("Authorization"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        tags::add_tag,
        tags::get_tags,
        tags::get_targets,
        likes::like_target,
        likes::get_likes,
        keys::new_key,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            AddTagRequest,
            AddTagResponse,
            LikeTargetRequest,
            LikeCountResponse,
            TagsResponse,
            TargetsResponse
        )
    ),
    modifiers(&CredentialScheme),
    tags(
        (name = "Tags", description = "Encrypted tags per target"),
        (name = "Likes", description = "Per-target like counters"),
        (name = "Keys", description = "Secret generation"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
