pub mod account;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::{Health, Message};

use crate::cors::{build_cors, enforce_allowed_origin, AllowedOrigins};
use crate::errors::JsonApiError;
use crate::openapi::ApiDoc;
use account::ServerState;

pub const ROOT_BANNER: &str = "Body & Breath ~ always present, yet often ignored";
pub const API_BANNER: &str = "Do you set intentions?";

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

#[utoipa::path(get, path = "/", tag = "health", responses((status = 200, description = "Service banner")))]
pub async fn root() -> Json<Message> {
    Json(Message::new(ROOT_BANNER))
}

#[utoipa::path(get, path = "/api/v1", tag = "health", responses((status = 200, description = "API banner")))]
pub async fn api_root() -> Json<Message> {
    Json(Message::new(API_BANNER))
}

async fn not_found() -> JsonApiError {
    JsonApiError::not_found()
}

/// Build the full application router: banners, account API, docs, and the
/// CORS / tracing layers around them.
pub fn build_router(state: ServerState, origins: AllowedOrigins) -> Router {
    let origins = Arc::new(origins);
    let cors = build_cors(&origins);

    let api = Router::new()
        .route("/api/v1", get(api_root).delete(account::delete_account))
        .route("/api/v1/login", post(account::login))
        .route("/api/v1/register", post(account::register));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(cors)
        .layer(middleware::from_fn_with_state(origins, enforce_allowed_origin))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
