use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use common::types::Message;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use service::auth::{
    domain::{LoginInput, RegisterInput},
    repository::UserRepository,
    service::{DELETED_MESSAGE, LOGIN_MESSAGE},
    errors::AuthError,
    AccountService,
};

use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct ServerState {
    pub accounts: Arc<AccountService<dyn UserRepository>>,
}

impl ServerState {
    pub fn new(accounts: AccountService<dyn UserRepository>) -> Self {
        Self { accounts: Arc::new(accounts) }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LoginOutput {
    pub username: String,
    pub user_id: Uuid,
    pub access_token: String,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct RegisterOutput {
    pub id: Uuid,
}

fn bad_body(rejection: JsonRejection) -> JsonApiError {
    JsonApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
}

#[utoipa::path(post, path = "/api/v1/login", tag = "account", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged in", body = LoginOutput), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> Result<Json<LoginOutput>, JsonApiError> {
    // an unreadable body fails like bad credentials
    let Json(input) = payload.map_err(|rejection| AuthError::Unauthorized(rejection.body_text()))?;
    let session = state.accounts.login(input).await?;
    Ok(Json(LoginOutput {
        username: session.user.username,
        user_id: session.user.id,
        access_token: session.access_token,
        message: LOGIN_MESSAGE.to_string(),
    }))
}

#[utoipa::path(post, path = "/api/v1/register", tag = "account", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered", body = RegisterOutput), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<RegisterInput>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterOutput>), JsonApiError> {
    let Json(input) = payload.map_err(bad_body)?;
    let user = state.accounts.register(input).await?;
    Ok((StatusCode::CREATED, Json(RegisterOutput { id: user.id })))
}

#[utoipa::path(delete, path = "/api/v1", tag = "account", responses((status = 204, description = "Account deleted"), (status = 401, description = "Unauthorized")), security(("bearer" = [])))]
pub async fn delete_account(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<Message>), JsonApiError> {
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    state.accounts.delete_account(authorization).await?;
    Ok((StatusCode::NO_CONTENT, Json(Message::new(DELETED_MESSAGE))))
}
