use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::auth::{ObtainTokenRequest, SignUpRequest, SignUpResponse, TokenResponse},
    error::AppResult,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/token", post(obtain_token))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "Confirmation code sent", body = ApiResponse<SignUpResponse>),
        (status = 400, description = "Invalid or conflicting username/email"),
    ),
    tag = "auth"
)]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> AppResult<Json<ApiResponse<SignUpResponse>>> {
    let resp = auth_service::sign_up(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/token",
    request_body = ObtainTokenRequest,
    responses(
        (status = 200, description = "Token issued", body = ApiResponse<TokenResponse>),
        (status = 400, description = "Wrong confirmation code"),
        (status = 404, description = "Unknown username"),
    ),
    tag = "auth"
)]
pub async fn obtain_token(
    State(state): State<AppState>,
    Json(payload): Json<ObtainTokenRequest>,
) -> AppResult<Json<ApiResponse<TokenResponse>>> {
    let resp = auth_service::obtain_token(&state, payload).await?;
    Ok(Json(resp))
}
